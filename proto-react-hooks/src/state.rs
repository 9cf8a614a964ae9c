//! `use_state`

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::any::type_name;
use core::cell::RefCell;
use core::fmt;

use proto_react_core::{RenderRequester, RenderScope, Result};

use crate::runtime::{describe, frame, mismatch, previous_slot, HookKind, HookSlot, SlotData};

enum Action<T> {
    Set(T),
    Update(Rc<dyn Fn(&T) -> T>),
}

impl<T: Clone> Action<T> {
    fn apply(&self, state: T) -> T {
        match self {
            Action::Set(value) => value.clone(),
            Action::Update(f) => f(&state),
        }
    }
}

/// State of one `use_state` slot: the value the render saw, plus the
/// actions enqueued since. The next render replays the queue.
struct StateCell<T> {
    state: T,
    queue: Vec<Action<T>>,
}

/// Setter returned by [`use_state`].
pub struct SetState<T> {
    cell: Rc<RefCell<StateCell<T>>>,
    requester: RenderRequester,
}

impl<T> Clone for SetState<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            requester: self.requester.clone(),
        }
    }
}

impl<T> SetState<T> {
    /// Replace the state on the next render.
    pub fn set(&self, value: T) {
        self.cell.borrow_mut().queue.push(Action::Set(value));
        self.requester.request();
    }

    /// Derive the next state from the previous one on the next render.
    pub fn update<F>(&self, f: F)
    where
        F: Fn(&T) -> T + 'static,
    {
        self.cell.borrow_mut().queue.push(Action::Update(Rc::new(f)));
        self.requester.request();
    }

    /// Number of actions waiting to be replayed.
    pub fn pending(&self) -> usize {
        self.cell.borrow().queue.len()
    }
}

impl<T> fmt::Debug for SetState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetState")
            .field("pending", &self.pending())
            .finish()
    }
}

/// Local component state.
///
/// The first render stores `initial`. Later renders start from the previous
/// render's value and replay every action enqueued on its setter, in order.
/// The previous queue is left intact, so a render that gets replaced before
/// it commits loses nothing.
pub fn use_state<T>(scope: &mut RenderScope<'_>, initial: T) -> Result<(T, SetState<T>)>
where
    T: Clone + 'static,
{
    let index = frame(scope)?.slots.len();
    let found = describe(HookKind::State, type_name::<T>());

    let previous: Option<Rc<RefCell<StateCell<T>>>> = match previous_slot(scope, index) {
        None => None,
        Some(slot) => {
            let cell = match &slot.data {
                SlotData::State(cell) => cell.clone().downcast::<RefCell<StateCell<T>>>().ok(),
                _ => None,
            };
            match cell {
                Some(cell) => Some(cell),
                None => return Err(mismatch(scope, index, slot.describe(), found)),
            }
        }
    };

    let state = match &previous {
        Some(cell) => {
            let cell = cell.borrow();
            cell.queue
                .iter()
                .fold(cell.state.clone(), |state, action| action.apply(state))
        }
        None => initial,
    };

    let cell = Rc::new(RefCell::new(StateCell {
        state: state.clone(),
        queue: Vec::new(),
    }));
    let setter = SetState {
        cell: cell.clone(),
        requester: scope.requester(),
    };
    frame(scope)?.slots.push(HookSlot {
        value_type: type_name::<T>(),
        data: SlotData::State(cell),
    });

    Ok((state, setter))
}
