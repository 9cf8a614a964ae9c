//! `use_effect`

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::any::{type_name, Any};
use core::cell::RefCell;

use proto_react_core::{RenderScope, Result};

use crate::runtime::{describe, frame, mismatch, previous_slot, Cleanup, HookKind, HookSlot, SlotData};

/// Run `effect` after commit when `deps` changed since the previous render.
///
/// Dependencies are any `PartialEq` value: a tuple, an array or a `Vec`.
/// `()` never changes, so the effect runs once after mount. A dependency
/// list of a different type than last time counts as changed. The previous
/// cleanup, if any, runs right before the effect does; the last one runs
/// when the component unmounts.
pub fn use_effect<D, F>(scope: &mut RenderScope<'_>, deps: D, effect: F) -> Result<()>
where
    D: PartialEq + 'static,
    F: FnOnce() -> Option<Cleanup> + 'static,
{
    let index = frame(scope)?.slots.len();

    let (changed, cleanup) = match previous_slot(scope, index) {
        None => (true, Rc::new(RefCell::new(None))),
        Some(slot) => match &slot.data {
            SlotData::Effect {
                deps: previous,
                cleanup,
                ..
            } => {
                let same = previous
                    .downcast_ref::<D>()
                    .map(|p| *p == deps)
                    .unwrap_or(false);
                (!same, cleanup.clone())
            }
            SlotData::State(_) => {
                let found = describe(HookKind::Effect, type_name::<D>());
                return Err(mismatch(scope, index, slot.describe(), found));
            }
        },
    };

    let task: Option<Box<dyn FnOnce() -> Option<Cleanup>>> = if changed {
        Some(Box::new(effect))
    } else {
        None
    };
    let deps: Rc<dyn Any> = Rc::new(deps);

    let hooks = frame(scope)?;
    hooks.slots.push(HookSlot {
        value_type: type_name::<D>(),
        data: SlotData::Effect {
            deps,
            task,
            cleanup,
        },
    });
    if changed {
        hooks.pending_effects.push(index);
    }
    Ok(())
}
