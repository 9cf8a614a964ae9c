//! proto-react core - elements, fibers and the reconciler
//!
//! Rendering happens in two phases. The work loop walks the
//! work-in-progress fiber tree one unit at a time, invoking components and
//! matching their output against the committed tree by position; the host
//! decides how long each slice may run. Once every fiber has been visited,
//! the commit applies deletions, insertions and prop updates to the
//! document in one pass and swaps the trees.
//!
//! Hooks live in a separate crate and plug in through
//! [`LifecycleObserver`].

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod commit;
pub mod config;
pub mod element;
pub mod error;
pub mod fiber;
pub mod lifecycle;
pub mod props;
mod reconciler;
pub mod renderer;
pub mod scheduler;
pub mod scope;

pub use commit::CommitReport;
pub use config::SchedulerConfig;
pub use element::{create_element, Child, Component, Element, ElementKind};
pub use error::{ReactError, Result};
pub use fiber::{Fiber, FiberArena, FiberId, Operation};
pub use lifecycle::{Lifecycle, LifecycleObserver};
pub use props::{handler, PropValue, Props};
pub use renderer::Renderer;
pub use scheduler::{
    Clock, ClockDeadline, Deadline, ManualClock, StepOutcome, UnitBudget, Unbounded, WorkState,
};
#[cfg(feature = "std")]
pub use scheduler::SystemClock;
pub use scope::{RenderRequester, RenderScope};

/// Prelude for common imports
pub mod prelude {
    pub use crate::h;
    pub use crate::{handler, Component, Element, Props, ReactError, Renderer, Result};
    pub use crate::{Deadline, StepOutcome, UnitBudget, Unbounded};
    pub use proto_react_dom::{Document, Event, EventType, NodeId};
}
