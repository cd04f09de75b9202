mod dagre;
mod layered;
mod ranking;
pub(crate) mod types;
pub use dagre::DagreEngine;
pub use layered::LayeredEngine;
pub use types::*;

use log::{debug, warn};

use crate::config::{LayoutConfig, LayoutEngineKind};
use crate::diagram::Diagram;

/// Turns sized nodes and directed edges into coordinates.
///
/// Implementations must return one [`NodeGeometry`] per requested node and
/// one bend list per requested edge, in request order. Bend lists exclude
/// the endpoints' centers and may be empty.
pub trait LayoutEngine {
    fn compute_layout(&self, request: &LayoutRequest) -> LayoutGeometry;
}

pub fn layout_engine(config: &LayoutConfig) -> Box<dyn LayoutEngine> {
    match config.engine {
        LayoutEngineKind::Dagre => Box::new(DagreEngine),
        LayoutEngineKind::Layered => Box::new(LayeredEngine),
    }
}

impl LayoutRequest {
    /// Inheritance edges point from child to parent; they are flipped so
    /// parents rank above their children.
    pub fn from_diagram(diagram: &Diagram, config: &LayoutConfig) -> Self {
        let nodes = diagram
            .nodes
            .iter()
            .map(|node| NodeSize {
                width: node.width,
                height: node.height,
            })
            .collect();
        let edges = diagram
            .edges
            .iter()
            .map(|edge| {
                if edge.kind.ranks_target_first() {
                    (edge.target, edge.source)
                } else {
                    (edge.source, edge.target)
                }
            })
            .collect();
        Self {
            nodes,
            edges,
            direction: config.direction,
            node_spacing: config.node_spacing,
            rank_spacing: config.rank_spacing,
            order_passes: config.order_passes,
        }
    }
}

/// Lays out `diagram` and returns bend points in source-to-target order for
/// every edge.
///
/// An engine that does not place every node is replaced by
/// [`LayeredEngine`] for this diagram.
pub fn compute_layout(
    diagram: &Diagram,
    config: &LayoutConfig,
    engine: &dyn LayoutEngine,
) -> LayoutGeometry {
    let request = LayoutRequest::from_diagram(diagram, config);
    let mut geometry = engine.compute_layout(&request);
    if geometry.nodes.len() != request.nodes.len() {
        warn!(
            "layout engine placed {} of {} classes, using the layered engine",
            geometry.nodes.len(),
            request.nodes.len()
        );
        geometry = LayeredEngine.compute_layout(&request);
    }
    geometry.edges.resize(diagram.edges.len(), Vec::new());
    for (bends, edge) in geometry.edges.iter_mut().zip(&diagram.edges) {
        if edge.kind.ranks_target_first() {
            bends.reverse();
        }
    }
    debug!(
        "layout: {} nodes, {} edges",
        geometry.nodes.len(),
        geometry.edges.len()
    );
    geometry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::build_diagram;
    use crate::ir::{ClassModel, ClassRecord, RelationshipKind, RelationshipRecord};
    use crate::theme::Theme;

    fn chain(kind: RelationshipKind) -> Diagram {
        let mut model = ClassModel::new();
        for name in ["A", "B", "C"] {
            model.classes.push(ClassRecord::new(name));
        }
        model
            .relationships
            .push(RelationshipRecord::new("A", "B", kind));
        model
            .relationships
            .push(RelationshipRecord::new("B", "C", kind));
        model
            .relationships
            .push(RelationshipRecord::new("A", "C", kind));
        build_diagram(&model, &LayoutConfig::default(), &Theme::classic())
    }

    #[test]
    fn generalization_ranks_parent_first() {
        let diagram = chain(RelationshipKind::Generalization);
        let request = LayoutRequest::from_diagram(&diagram, &LayoutConfig::default());
        for (edge, &(from, to)) in diagram.edges.iter().zip(&request.edges) {
            assert_eq!((from, to), (edge.target, edge.source));
        }
    }

    #[test]
    fn reversed_bends_run_from_source_to_target() {
        let config = LayoutConfig {
            engine: LayoutEngineKind::Layered,
            ..LayoutConfig::default()
        };
        let diagram = chain(RelationshipKind::Generalization);
        let geometry = compute_layout(&diagram, &config, layout_engine(&config).as_ref());
        // A inherits from B and C, B from C: C ranks highest, A lowest.
        assert!(geometry.nodes[2].center.y < geometry.nodes[1].center.y);
        assert!(geometry.nodes[1].center.y < geometry.nodes[0].center.y);
        let long = diagram
            .edges
            .iter()
            .position(|edge| (edge.source, edge.target) == (0, 2))
            .unwrap();
        assert_eq!(geometry.edges[long].len(), 1);
        assert_eq!(geometry.edges[long][0].y, geometry.nodes[1].center.y);
    }

    #[test]
    fn every_node_and_edge_gets_geometry() {
        let config = LayoutConfig::default();
        let diagram = chain(RelationshipKind::Association);
        let geometry = compute_layout(&diagram, &config, layout_engine(&config).as_ref());
        assert_eq!(geometry.nodes.len(), diagram.nodes.len());
        assert_eq!(geometry.edges.len(), diagram.edges.len());
    }

    struct FirstNodeOnly;

    impl LayoutEngine for FirstNodeOnly {
        fn compute_layout(&self, request: &LayoutRequest) -> LayoutGeometry {
            let geometry = LayeredEngine.compute_layout(request);
            LayoutGeometry {
                nodes: geometry.nodes.into_iter().take(1).collect(),
                edges: geometry.edges,
            }
        }
    }

    #[test]
    fn short_engine_output_falls_back_to_layered() {
        let config = LayoutConfig::default();
        let diagram = chain(RelationshipKind::Association);
        let geometry = compute_layout(&diagram, &config, &FirstNodeOnly);
        let expected = compute_layout(&diagram, &config, &LayeredEngine);
        assert_eq!(geometry.nodes.len(), diagram.nodes.len());
        assert_eq!(geometry, expected);
    }
}
