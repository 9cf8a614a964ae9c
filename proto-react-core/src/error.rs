//! Reconciler error types.

use alloc::string::String;
use core::fmt;

use proto_react_dom::{DomError, NodeId};

use crate::fiber::FiberId;

/// Result type for reconciler operations.
pub type Result<T> = core::result::Result<T, ReactError>;

/// Errors surfaced by the element builder, the renderer and the hooks
/// runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum ReactError {
    /// The element handed to the builder or renderer is malformed.
    InvalidElementShape(String),
    /// A hook ran without an active hook frame for its fiber.
    HookCalledOutsideRender,
    /// Hooks were called in a different order or number than in the
    /// previous render of the same component.
    HookOrderMismatch {
        component: String,
        fiber: FiberId,
        index: usize,
        expected: String,
        found: String,
    },
    /// The render target does not exist or cannot hold children.
    ContainerNotFound(NodeId),
    /// A prop value cannot be synced to the host for this key.
    UnsupportedPropType { key: String, reason: &'static str },
    /// A host mutation failed outside the per-fiber commit walk.
    Dom(DomError),
    /// A component returned an error from its render function.
    Component { component: String, message: String },
    /// A fiber ID no longer refers to a live fiber.
    FiberNotFound(FiberId),
}

impl ReactError {
    /// Create an element shape error.
    pub fn shape<S: Into<String>>(msg: S) -> Self {
        ReactError::InvalidElementShape(msg.into())
    }

    /// Create an error on behalf of a component.
    pub fn component<S: Into<String>, M: Into<String>>(component: S, message: M) -> Self {
        ReactError::Component {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Get error name.
    pub fn name(&self) -> &'static str {
        match self {
            ReactError::InvalidElementShape(_) => "InvalidElementShape",
            ReactError::HookCalledOutsideRender => "HookCalledOutsideRender",
            ReactError::HookOrderMismatch { .. } => "HookOrderMismatch",
            ReactError::ContainerNotFound(_) => "ContainerNotFound",
            ReactError::UnsupportedPropType { .. } => "UnsupportedPropType",
            ReactError::Dom(_) => "DomError",
            ReactError::Component { .. } => "ComponentError",
            ReactError::FiberNotFound(_) => "FiberNotFound",
        }
    }

    /// Hook discipline errors abort the render cycle.
    pub fn is_hook_error(&self) -> bool {
        matches!(
            self,
            ReactError::HookCalledOutsideRender | ReactError::HookOrderMismatch { .. }
        )
    }
}

impl fmt::Display for ReactError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReactError::InvalidElementShape(msg) => write!(f, "{}: {}", self.name(), msg),
            ReactError::HookCalledOutsideRender => {
                write!(f, "{}: hooks can only be called while a component renders", self.name())
            }
            ReactError::HookOrderMismatch {
                component,
                fiber,
                index,
                expected,
                found,
            } => write!(
                f,
                "{}: <{}> (fiber {}) hook #{} was {} in the previous render, now {}",
                self.name(),
                component,
                fiber,
                index,
                expected,
                found
            ),
            ReactError::ContainerNotFound(id) => {
                write!(f, "{}: no container node {}", self.name(), id)
            }
            ReactError::UnsupportedPropType { key, reason } => {
                write!(f, "{}: prop {:?} {}", self.name(), key, reason)
            }
            ReactError::Dom(err) => write!(f, "{}: {}", self.name(), err),
            ReactError::Component { component, message } => {
                write!(f, "{}: <{}> {}", self.name(), component, message)
            }
            ReactError::FiberNotFound(id) => write!(f, "{}: fiber {} is gone", self.name(), id),
        }
    }
}

impl From<DomError> for ReactError {
    fn from(err: DomError) -> Self {
        ReactError::Dom(err)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ReactError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReactError::Dom(err) => Some(err),
            _ => None,
        }
    }
}
