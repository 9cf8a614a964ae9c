//! DOM error types.

use alloc::string::String;
use core::fmt;

use crate::node::NodeId;

/// Result type for DOM operations.
pub type DomResult<T> = Result<T, DomError>;

/// Errors raised while mutating a [`Document`](crate::Document).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// No live node with this ID.
    NodeNotFound(NodeId),
    /// `node` is not a child of `parent`.
    NotAChild { parent: NodeId, node: NodeId },
    /// The insertion would create a cycle or put a node under a text node.
    HierarchyRequest { parent: NodeId, node: NodeId },
    /// Property names must be non-empty and free of whitespace.
    InvalidPropertyName(String),
    /// Text nodes only carry content, not properties.
    TextNodeProperty { node: NodeId, name: String },
    /// The operation needs a different kind of node.
    WrongNodeType { node: NodeId, expected: &'static str },
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomError::NodeNotFound(id) => write!(f, "node {} does not exist", id),
            DomError::NotAChild { parent, node } => {
                write!(f, "node {} is not a child of {}", node, parent)
            }
            DomError::HierarchyRequest { parent, node } => {
                write!(f, "cannot insert node {} under {}", node, parent)
            }
            DomError::InvalidPropertyName(name) => {
                write!(f, "invalid property name {:?}", name)
            }
            DomError::TextNodeProperty { node, name } => {
                write!(f, "text node {} cannot carry property {:?}", node, name)
            }
            DomError::WrongNodeType { node, expected } => {
                write!(f, "node {} is not a {} node", node, expected)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DomError {}
