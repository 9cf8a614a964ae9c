//! Renderer session.
//!
//! Owns the document, the fiber arena and the lifecycle state of one UI.

use alloc::boxed::Box;
use alloc::vec::Vec;

use proto_react_dom::{Document, DomResult, Event, NodeId};

use crate::config::SchedulerConfig;
use crate::element::Element;
use crate::error::{ReactError, Result};
use crate::fiber::{Fiber, FiberArena, FiberId, Operation};
use crate::lifecycle::{Lifecycle, LifecycleObserver};
use crate::reconciler::{dispose_tree, fiber, WorkContext};
use crate::scheduler::WorkState;
use crate::scope::RenderRequester;

/// A React-style renderer bound to one document.
pub struct Renderer {
    /// Host document.
    pub(crate) document: Document,
    /// Fiber storage for the committed and work-in-progress trees.
    pub(crate) fibers: FiberArena,
    /// Lifecycle state.
    pub(crate) lifecycle: Lifecycle,
    /// Installed observers, in installation order.
    pub(crate) observers: Vec<Box<dyn LifecycleObserver>>,
    /// Scheduler configuration.
    pub(crate) config: SchedulerConfig,
    /// Re-render flag shared with state setters.
    pub(crate) requester: RenderRequester,
    /// Cycle state.
    pub(crate) state: WorkState,
}

impl Renderer {
    /// Create a renderer with the default configuration.
    pub fn new(document: Document) -> Self {
        Self::with_config(document, SchedulerConfig::default())
    }

    /// Create a renderer with custom configuration.
    pub fn with_config(document: Document, config: SchedulerConfig) -> Self {
        Self {
            document,
            fibers: FiberArena::new(),
            lifecycle: Lifecycle::new(),
            observers: Vec::new(),
            config,
            requester: RenderRequester::new(),
            state: WorkState::Idle,
        }
    }

    /// Install a lifecycle observer.
    pub fn install(&mut self, observer: Box<dyn LifecycleObserver>) {
        self.observers.push(observer);
    }

    /// Render `element` into `container`.
    ///
    /// The element is wrapped in a root fiber anchored at the container and
    /// diffed against the last committed tree. Work starts on the next step.
    pub fn render(&mut self, element: Element, container: NodeId) -> Result<()> {
        match self.document.get(container) {
            Some(node) if !node.is_text() => {}
            _ => return Err(ReactError::ContainerNotFound(container)),
        }

        // the new tree diffs against the committed one, so queued state
        // actions replay in it and a pending re-render has nothing left to do
        if self.requester.take() {
            log::trace!("[Scheduler] pending re-render folded into render");
        }

        let root = Fiber::new(Element::root(element))
            .with_dom(Some(container))
            .with_previous(self.lifecycle.committed_root);
        let root = self.fibers.insert(root);
        log::debug!("[Scheduler] render requested into node {} as {}", container, root);
        self.request_cycle(root);
        Ok(())
    }

    /// Start a new cycle for a state change. The tree of an in-flight
    /// render is kept and traversed again; otherwise the committed tree is
    /// re-rendered as it is.
    pub(crate) fn rerender(&mut self, committed: FiberId) -> Result<()> {
        let base = self.lifecycle.wip_root.unwrap_or(committed);
        let current = fiber(&self.fibers, base)?;
        let root = Fiber::new(current.element.clone())
            .with_dom(current.dom)
            .with_previous(Some(committed));
        let root = self.fibers.insert(root);
        log::debug!("[Scheduler] state change, re-rendering {} as {}", base, root);
        self.request_cycle(root);
        Ok(())
    }

    fn request_cycle(&mut self, root: FiberId) {
        if let Some(abandoned) = self.lifecycle.request_render(root) {
            log::debug!("[Scheduler] {} replaced before commit", abandoned);
            dispose_tree(
                &mut self.document,
                &mut self.fibers,
                abandoned,
                self.config.dispose_abandoned_nodes,
            );
        }
        self.state = WorkState::Traversing;
    }

    pub(crate) fn work_context(&mut self) -> WorkContext<'_> {
        WorkContext {
            document: &mut self.document,
            fibers: &mut self.fibers,
            lifecycle: &mut self.lifecycle,
            observers: &mut self.observers,
            requester: &self.requester,
        }
    }

    /// Dispatch an event into the document. Re-renders requested by
    /// handlers run on the following steps.
    pub fn dispatch_event(&mut self, event: Event) -> DomResult<Event> {
        self.document.dispatch_event(event)
    }

    /// Host document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable host document.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Fiber arena.
    pub fn fibers(&self) -> &FiberArena {
        &self.fibers
    }

    /// Lifecycle state.
    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    /// Handle to request a re-render from outside a component.
    pub fn requester(&self) -> RenderRequester {
        self.requester.clone()
    }

    /// Scheduler configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Cycle state.
    pub fn state(&self) -> WorkState {
        self.state
    }

    /// Root of the committed tree.
    pub fn committed_root(&self) -> Option<FiberId> {
        self.lifecycle.committed_root
    }

    /// Root of the work-in-progress tree.
    pub fn wip_root(&self) -> Option<FiberId> {
        self.lifecycle.wip_root
    }

    /// Check if a cycle or a re-render request is pending.
    pub fn has_pending_work(&self) -> bool {
        self.lifecycle.has_work()
            || (self.requester.is_requested() && self.lifecycle.committed_root.is_some())
    }

    /// Pending operation of a fiber. Fibers waiting in the deletion list
    /// report [`Operation::Deletion`].
    pub fn operation(&self, id: FiberId) -> Option<Operation> {
        if self.lifecycle.is_pending_deletion(id) {
            return Some(Operation::Deletion);
        }
        self.fibers.get(id).and_then(|f| f.operation)
    }

    /// Take the document back, dropping all fibers.
    pub fn into_document(self) -> Document {
        self.document
    }
}
