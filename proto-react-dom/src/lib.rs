//! proto-react DOM - live host tree for the reconciler
//!
//! An arena-backed document the reconciler commits into. It implements the
//! subset of the DOM a renderer needs: element and text nodes, property
//! assignment, child insertion/removal, event listeners with
//! capture/target/bubble dispatch, and a mutation journal that lets callers
//! observe exactly what a commit changed.

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod document;
pub mod error;
pub mod events;
pub mod mutation;
pub mod node;
pub mod traversal;

pub use document::Document;
pub use error::{DomError, DomResult};
pub use events::{Event, EventDispatcher, EventHandler, EventPhase, EventTarget, EventType};
pub use mutation::{MutationJournal, MutationRecord};
pub use node::{Node, NodeData, NodeId, NodeType, Property};
pub use traversal::{Ancestors, Subtree};

/// Prelude for common imports
pub mod prelude {
    pub use crate::{Document, Event, EventHandler, EventType, Node, NodeId, NodeType};
    pub use crate::{DomError, MutationRecord};
}
