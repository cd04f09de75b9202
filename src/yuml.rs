//! yUML text export of a class model.
//!
//! Each class becomes one `[...]` line with `;`-terminated members and `|`
//! between panes; relationships follow, one per merged class pair.

use std::fmt::{self, Write as _};

use crate::classify::classify;
use crate::ir::{ClassModel, ClassRecord, RelationshipKind};
use crate::merge::{MergedEdge, merge_relationships};

/// Display adapter for one class in yUML notation.
pub struct YumlClass<'a>(pub &'a ClassRecord);

impl fmt::Display for YumlClass<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class = self.0;
        f.write_char('[')?;
        if let Some(marker) = classify(class).marker() {
            write!(f, "{marker};")?;
        }
        f.write_str(&class.name)?;

        if class.has_field() || class.has_method() {
            f.write_char('|')?;
        }
        for (visibility, field) in class.fields.iter() {
            write!(f, "{} {field};", visibility.prefix())?;
        }
        if class.has_method() {
            f.write_char('|')?;
            for (visibility, method) in class.methods.iter() {
                write!(f, "{} {};", visibility.prefix(), method.signature)?;
            }
        }
        f.write_char(']')
    }
}

/// Display adapter for one merged relationship in yUML notation.
pub struct YumlEdge<'a>(pub &'a MergedEdge);

impl fmt::Display for YumlEdge<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let edge = self.0;
        let (source, target) = (&edge.source, &edge.target);
        match edge.kind {
            RelationshipKind::Association => write!(f, "[{source}]->[{target}]"),
            RelationshipKind::Bidirectional => write!(f, "[{source}]<->[{target}]"),
            RelationshipKind::Aggregation => write!(f, "[{source}]+->[{target}]"),
            RelationshipKind::Composition => write!(f, "[{source}]++->[{target}]"),
            RelationshipKind::Dependency => write!(f, "[{source}]-.->[{target}]"),
            // Inheritance is written parent first.
            RelationshipKind::Generalization => write!(f, "[{target}]^-[{source}]"),
            RelationshipKind::Realization => write!(f, "[{target}]^-.-[{source}]"),
        }
    }
}

/// The whole model: classes in declaration order, then merged relationships.
pub fn model_to_yuml(model: &ClassModel) -> String {
    let mut out = String::new();
    for class in &model.classes {
        let _ = writeln!(out, "{}", YumlClass(class));
    }
    for edge in merge_relationships(&model.relationships) {
        let _ = writeln!(out, "{}", YumlEdge(&edge));
    }
    out
}
