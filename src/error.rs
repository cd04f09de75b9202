use std::fmt;
use std::io;

use thiserror::Error;

/// Failures surfaced by the library entry points.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write SVG output: {0}")]
    Io(#[from] io::Error),
    #[error("invalid class model: {0}")]
    Model(String),
}

/// Non-fatal problems recorded while a diagram is built or drawn.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A relationship names a class that is not part of the model; the edge is dropped.
    UnresolvedEndpoint {
        source: String,
        destination: String,
        missing: String,
    },
    /// Two records share a class name; relationships bind to the first one.
    DuplicateClass { name: String },
    /// Nothing of the edge is left outside the node boxes.
    DegenerateEdge { source: String, target: String },
    /// A class related to itself; there is no route to draw.
    SelfLoop { class: String },
    /// An endpoint has no placed geometry.
    UnplacedEndpoint { source: String, target: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedEndpoint {
                source,
                destination,
                missing,
            } => write!(
                f,
                "dropped relationship {source} -> {destination}: unknown class `{missing}`"
            ),
            Self::DuplicateClass { name } => write!(f, "class `{name}` is declared more than once"),
            Self::DegenerateEdge { source, target } => write!(
                f,
                "could not draw edge {source} -> {target} since nodes are overlapping"
            ),
            Self::SelfLoop { class } => {
                write!(f, "skipped relationship of `{class}` with itself")
            }
            Self::UnplacedEndpoint { source, target } => write!(
                f,
                "could not draw edge {source} -> {target}: an endpoint was not laid out"
            ),
        }
    }
}
