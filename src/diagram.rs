//! Assembly of drawable nodes and edges from a class model.

use std::collections::HashMap;

use log::{debug, warn};

use crate::classify::{ClassLabel, classify_class};
use crate::config::LayoutConfig;
use crate::error::Diagnostic;
use crate::ir::{ClassModel, RelationshipKind, Stereotype};
use crate::merge::{MergedEdge, merge_relationships};
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeStyle {
    Solid,
    Dashed,
}

impl StrokeStyle {
    pub fn for_kind(kind: RelationshipKind) -> Self {
        match kind {
            RelationshipKind::Dependency
            | RelationshipKind::Generalization
            | RelationshipKind::Realization => Self::Dashed,
            RelationshipKind::Association
            | RelationshipKind::Bidirectional
            | RelationshipKind::Aggregation
            | RelationshipKind::Composition => Self::Solid,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowFill {
    Filled,
    Hollow,
}

/// Arrow heads drawn at each end of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArrowEnds {
    pub source: Option<ArrowFill>,
    pub target: Option<ArrowFill>,
}

impl ArrowEnds {
    pub fn for_kind(kind: RelationshipKind) -> Self {
        match kind {
            RelationshipKind::Bidirectional => Self::default(),
            RelationshipKind::Association => Self {
                source: None,
                target: Some(ArrowFill::Filled),
            },
            RelationshipKind::Dependency
            | RelationshipKind::Generalization
            | RelationshipKind::Realization => Self {
                source: None,
                target: Some(ArrowFill::Hollow),
            },
            // The whole sits at the source end.
            RelationshipKind::Aggregation => Self {
                source: Some(ArrowFill::Hollow),
                target: None,
            },
            RelationshipKind::Composition => Self {
                source: Some(ArrowFill::Filled),
                target: None,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct DrawNode {
    pub id: String,
    pub stereotype: Stereotype,
    pub label: ClassLabel,
    pub width: f32,
    pub height: f32,
    pub fill: String,
}

#[derive(Debug, Clone)]
pub struct DrawEdge {
    pub source: usize,
    pub target: usize,
    pub kind: RelationshipKind,
    pub stroke: StrokeStyle,
    pub arrows: ArrowEnds,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Diagram {
    pub nodes: Vec<DrawNode>,
    pub edges: Vec<DrawEdge>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Box size for a label: `(width, height)`.
pub fn node_size(label: &ClassLabel, config: &LayoutConfig) -> (f32, f32) {
    let (lines, longest) = label.metrics();
    let height = lines as f32 * config.height_factor * config.unit;
    let width = longest as f32 * config.width_factor * config.unit;
    (width, height)
}

pub fn build_diagram(model: &ClassModel, config: &LayoutConfig, theme: &Theme) -> Diagram {
    let mut diagram = Diagram::default();
    let mut lookup: HashMap<&str, usize> = HashMap::new();

    for class in &model.classes {
        let classified = classify_class(class);
        let (width, height) = node_size(&classified.label, config);
        let index = diagram.nodes.len();
        if lookup.contains_key(class.name.as_str()) {
            warn!("class `{}` is declared more than once", class.name);
            diagram.diagnostics.push(Diagnostic::DuplicateClass {
                name: class.name.clone(),
            });
        } else {
            lookup.insert(class.name.as_str(), index);
        }
        debug!(
            "class `{}` -> {:?} ({width}x{height})",
            class.name, classified.stereotype
        );
        diagram.nodes.push(DrawNode {
            id: classified.name,
            stereotype: classified.stereotype,
            label: classified.label,
            width,
            height,
            fill: theme.class_fill.clone(),
        });
    }

    for merged in merge_relationships(&model.relationships) {
        match resolve_edge(&merged, &lookup) {
            Ok(edge) => diagram.edges.push(edge),
            Err(missing) => {
                warn!(
                    "dropping {:?} relationship {} -> {}: unknown class `{missing}`",
                    merged.kind, merged.source, merged.target
                );
                diagram.diagnostics.push(Diagnostic::UnresolvedEndpoint {
                    source: merged.source,
                    destination: merged.target,
                    missing,
                });
            }
        }
    }

    diagram
}

fn resolve_edge(merged: &MergedEdge, lookup: &HashMap<&str, usize>) -> Result<DrawEdge, String> {
    let source = lookup
        .get(merged.source.as_str())
        .copied()
        .ok_or_else(|| merged.source.clone())?;
    let target = lookup
        .get(merged.target.as_str())
        .copied()
        .ok_or_else(|| merged.target.clone())?;
    Ok(DrawEdge {
        source,
        target,
        kind: merged.kind,
        stroke: StrokeStyle::for_kind(merged.kind),
        arrows: ArrowEnds::for_kind(merged.kind),
        label: merged.label.clone(),
    })
}
