//! Hooks runtime
//!
//! [`HooksRuntime`] is a lifecycle observer. It gives every component fiber
//! a fresh [`FiberHooks`] frame before the component runs, checks after the
//! call that the hooks lined up with the previous render, runs queued effects
//! once the tree is committed and runs cleanups when a fiber is unmounted.

use alloc::boxed::Box;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;
use core::cell::RefCell;

use proto_react_core::{
    FiberArena, FiberId, LifecycleObserver, ReactError, RenderScope, Renderer, Result,
};

/// Cleanup returned by an effect.
pub type Cleanup = Box<dyn FnOnce()>;

pub(crate) type EffectFn = Box<dyn FnOnce() -> Option<Cleanup>>;

/// Cleanup slot shared by every render of the same logical effect.
pub(crate) type CleanupCell = Rc<RefCell<Option<Cleanup>>>;

/// Hook kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    State,
    Effect,
}

impl HookKind {
    /// Hook function name.
    pub fn name(self) -> &'static str {
        match self {
            HookKind::State => "use_state",
            HookKind::Effect => "use_effect",
        }
    }
}

pub(crate) enum SlotData {
    /// `Rc<RefCell<StateCell<T>>>`, erased.
    State(Rc<dyn Any>),
    Effect {
        deps: Rc<dyn Any>,
        task: Option<EffectFn>,
        cleanup: CleanupCell,
    },
}

/// One hook call of one render.
pub(crate) struct HookSlot {
    /// Type name of the state value or dependency list.
    pub value_type: &'static str,
    pub data: SlotData,
}

impl HookSlot {
    pub fn kind(&self) -> HookKind {
        match self.data {
            SlotData::State(_) => HookKind::State,
            SlotData::Effect { .. } => HookKind::Effect,
        }
    }

    pub fn describe(&self) -> String {
        describe(self.kind(), self.value_type)
    }
}

pub(crate) fn describe(kind: HookKind, value_type: &str) -> String {
    format!("{}<{}>", kind.name(), value_type)
}

/// Hook storage of one component fiber for one render.
pub struct FiberHooks {
    pub(crate) component: String,
    pub(crate) slots: Vec<HookSlot>,
    /// Slots whose effect runs after the next commit.
    pub(crate) pending_effects: Vec<usize>,
}

impl FiberHooks {
    fn new(component: &str) -> Self {
        Self {
            component: component.into(),
            slots: Vec::new(),
            pending_effects: Vec::new(),
        }
    }

    /// Number of hooks called so far.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if no hook has been called.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Kinds of the hooks called, in call order.
    pub fn kinds(&self) -> Vec<HookKind> {
        self.slots.iter().map(HookSlot::kind).collect()
    }

    /// Number of effects waiting for the next commit.
    pub fn pending_effect_count(&self) -> usize {
        self.pending_effects.len()
    }
}

/// Current hook frame of the rendering component.
pub(crate) fn frame<'s>(scope: &'s mut RenderScope<'_>) -> Result<&'s mut FiberHooks> {
    scope
        .hooks_mut::<FiberHooks>()
        .ok_or(ReactError::HookCalledOutsideRender)
}

/// Slot the previous render stored at `index`.
pub(crate) fn previous_slot<'s>(scope: &'s RenderScope<'_>, index: usize) -> Option<&'s HookSlot> {
    scope
        .previous_hooks::<FiberHooks>()
        .and_then(|h| h.slots.get(index))
}

pub(crate) fn mismatch(
    scope: &RenderScope<'_>,
    index: usize,
    expected: String,
    found: String,
) -> ReactError {
    ReactError::HookOrderMismatch {
        component: scope.component_name().into(),
        fiber: scope.fiber(),
        index,
        expected,
        found,
    }
}

fn hooks_of(fibers: &FiberArena, fiber: FiberId) -> Option<&FiberHooks> {
    fibers.get(fiber)?.hooks.as_ref()?.downcast_ref::<FiberHooks>()
}

fn hooks_of_mut(fibers: &mut FiberArena, fiber: FiberId) -> Option<&mut FiberHooks> {
    fibers.get_mut(fiber)?.hooks.as_mut()?.downcast_mut::<FiberHooks>()
}

/// Lifecycle observer backing `use_state` and `use_effect`.
#[derive(Debug, Default)]
pub struct HooksRuntime {
    effects_run: usize,
    cleanups_run: usize,
}

impl HooksRuntime {
    /// Create a runtime.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a runtime into a renderer.
    pub fn install(renderer: &mut Renderer) {
        renderer.install(Box::new(Self::new()));
    }

    /// Effects run so far.
    pub fn effects_run(&self) -> usize {
        self.effects_run
    }

    /// Cleanups run so far.
    pub fn cleanups_run(&self) -> usize {
        self.cleanups_run
    }

    fn run_cleanup(&mut self, cleanup: &CleanupCell) {
        let taken = cleanup.borrow_mut().take();
        if let Some(f) = taken {
            f();
            self.cleanups_run += 1;
        }
    }
}

impl LifecycleObserver for HooksRuntime {
    fn on_before_work(&mut self, fibers: &mut FiberArena, fiber: FiberId) {
        if let Some(f) = fibers.get_mut(fiber) {
            if f.is_component() {
                let frame = FiberHooks::new(f.element.kind().display_name());
                f.hooks = Some(Box::new(frame));
            }
        }
    }

    fn on_after_work(&mut self, fibers: &mut FiberArena, fiber: FiberId) -> Result<()> {
        let previous = match fibers.get(fiber).and_then(|f| f.previous) {
            Some(p) => p,
            None => return Ok(()),
        };
        let (current, before) = match (hooks_of(fibers, fiber), hooks_of(fibers, previous)) {
            (Some(c), Some(b)) => (c, b),
            _ => return Ok(()),
        };
        if current.len() == before.len() {
            return Ok(());
        }

        let index = current.len().min(before.len());
        let expected = before
            .slots
            .get(index)
            .map(HookSlot::describe)
            .unwrap_or_else(|| "no hook".into());
        let found = current
            .slots
            .get(index)
            .map(HookSlot::describe)
            .unwrap_or_else(|| "no hook".into());
        Err(ReactError::HookOrderMismatch {
            component: current.component.clone(),
            fiber,
            index,
            expected,
            found,
        })
    }

    fn on_before_rendered(&mut self, fibers: &mut FiberArena, fiber: FiberId) {
        let jobs: Vec<(EffectFn, CleanupCell)> = match hooks_of_mut(fibers, fiber) {
            Some(hooks) => {
                let pending = core::mem::take(&mut hooks.pending_effects);
                pending
                    .into_iter()
                    .filter_map(|i| match hooks.slots.get_mut(i).map(|s| &mut s.data) {
                        Some(SlotData::Effect { task, cleanup, .. }) => {
                            task.take().map(|t| (t, cleanup.clone()))
                        }
                        _ => None,
                    })
                    .collect()
            }
            None => return,
        };
        if jobs.is_empty() {
            return;
        }
        log::trace!("[Hooks] running {} effects of fiber {}", jobs.len(), fiber);

        for (_, cleanup) in &jobs {
            self.run_cleanup(cleanup);
        }
        for (task, cleanup) in jobs {
            let next = task();
            *cleanup.borrow_mut() = next;
            self.effects_run += 1;
        }
    }

    fn on_before_unmount(&mut self, fibers: &mut FiberArena, fiber: FiberId) {
        let cleanups: Vec<CleanupCell> = match hooks_of(fibers, fiber) {
            Some(hooks) => hooks
                .slots
                .iter()
                .filter_map(|s| match &s.data {
                    SlotData::Effect { cleanup, .. } => Some(cleanup.clone()),
                    _ => None,
                })
                .collect(),
            None => return,
        };
        log::trace!("[Hooks] unmounting fiber {} ({} effects)", fiber, cleanups.len());
        for cleanup in &cleanups {
            self.run_cleanup(cleanup);
        }
        if let Some(f) = fibers.get_mut(fiber) {
            f.hooks = None;
        }
    }
}
