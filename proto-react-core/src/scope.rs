//! Render scope
//!
//! The handle a component receives while it renders. It is the only way to
//! reach the fiber's hook storage, which keeps hooks tied to an explicit
//! render instead of ambient global state.

use alloc::rc::Rc;
use core::any::Any;
use core::cell::Cell;

use crate::element::Element;
use crate::fiber::{FiberArena, FiberId};

/// Shared flag used to ask the renderer for a new cycle from the last
/// committed tree. State setters hold a clone.
#[derive(Clone, Default)]
pub struct RenderRequester {
    flag: Rc<Cell<bool>>,
}

impl RenderRequester {
    /// Create a new requester with no pending request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a re-render. Repeated requests before the next step coalesce.
    pub fn request(&self) {
        self.flag.set(true);
    }

    /// Check if a request is pending.
    pub fn is_requested(&self) -> bool {
        self.flag.get()
    }

    /// Consume the pending request.
    pub fn take(&self) -> bool {
        self.flag.replace(false)
    }
}

impl core::fmt::Debug for RenderRequester {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RenderRequester")
            .field("requested", &self.flag.get())
            .finish()
    }
}

/// Access to the rendering fiber for the duration of one component call.
pub struct RenderScope<'a> {
    fiber: FiberId,
    element: &'a Element,
    fibers: &'a mut FiberArena,
    requester: &'a RenderRequester,
}

impl<'a> RenderScope<'a> {
    pub(crate) fn new(
        fiber: FiberId,
        element: &'a Element,
        fibers: &'a mut FiberArena,
        requester: &'a RenderRequester,
    ) -> Self {
        Self {
            fiber,
            element,
            fibers,
            requester,
        }
    }

    /// The fiber being rendered.
    pub fn fiber(&self) -> FiberId {
        self.fiber
    }

    /// The matching fiber of the last committed tree, if any.
    pub fn previous(&self) -> Option<FiberId> {
        self.fibers.get(self.fiber).and_then(|f| f.previous)
    }

    /// Name of the rendering component.
    pub fn component_name(&self) -> &str {
        self.element.kind().display_name()
    }

    /// Children passed to the component element.
    pub fn children(&self) -> &[Element] {
        self.element.children()
    }

    /// Requester handle for state setters.
    pub fn requester(&self) -> RenderRequester {
        self.requester.clone()
    }

    /// Read-only view of the fiber arena.
    pub fn fibers(&self) -> &FiberArena {
        self.fibers
    }

    /// Hook storage of the rendering fiber, if installed with type `T`.
    pub fn hooks<T: Any>(&self) -> Option<&T> {
        self.fibers
            .get(self.fiber)?
            .hooks
            .as_ref()?
            .downcast_ref::<T>()
    }

    /// Mutable hook storage of the rendering fiber.
    pub fn hooks_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.fibers
            .get_mut(self.fiber)?
            .hooks
            .as_mut()?
            .downcast_mut::<T>()
    }

    /// Hook storage of the previous fiber.
    pub fn previous_hooks<T: Any>(&self) -> Option<&T> {
        let previous = self.previous()?;
        self.fibers.get(previous)?.hooks.as_ref()?.downcast_ref::<T>()
    }
}
