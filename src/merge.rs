//! Collapse relationship records into one edge per class pair.

use std::collections::BTreeMap;

use log::debug;

use crate::ir::{RelationshipKind, RelationshipRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct MergedEdge {
    pub source: String,
    pub target: String,
    pub kind: RelationshipKind,
    pub label: Option<String>,
}

/// Rank of a kind in the dominance chain, `None` for kinds outside it.
pub fn precedence(kind: RelationshipKind) -> Option<u8> {
    match kind {
        RelationshipKind::Association => Some(0),
        RelationshipKind::Bidirectional => Some(1),
        RelationshipKind::Aggregation => Some(2),
        RelationshipKind::Composition => Some(3),
        RelationshipKind::Dependency
        | RelationshipKind::Generalization
        | RelationshipKind::Realization => None,
    }
}

/// True when `incoming` should replace `current` for the same pair.
pub fn dominates(incoming: RelationshipKind, current: RelationshipKind) -> bool {
    match (precedence(incoming), precedence(current)) {
        (Some(new_rank), Some(old_rank)) => new_rank > old_rank,
        _ => false,
    }
}

fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

pub fn merge_relationships(records: &[RelationshipRecord]) -> Vec<MergedEdge> {
    let mut merged: BTreeMap<(String, String), MergedEdge> = BTreeMap::new();

    for record in records {
        let key = pair_key(&record.source, &record.destination);
        match merged.get_mut(&key) {
            None => {
                merged.insert(
                    key,
                    MergedEdge {
                        source: record.source.clone(),
                        target: record.destination.clone(),
                        kind: record.kind,
                        label: record.label.clone(),
                    },
                );
            }
            Some(existing) => {
                if dominates(record.kind, existing.kind) {
                    debug!(
                        "{} -> {}: {:?} replaces {:?}",
                        record.source, record.destination, record.kind, existing.kind
                    );
                    existing.source = record.source.clone();
                    existing.target = record.destination.clone();
                    existing.kind = record.kind;
                    existing.label = record.label.clone();
                }
            }
        }
    }

    merged.into_values().collect()
}
