//! proto-react hooks - state and effects for function components
//!
//! Hooks are plain functions taking the component's
//! [`RenderScope`](proto_react_core::RenderScope). Install a
//! [`HooksRuntime`] into the renderer once, then call hooks from component
//! bodies in the same order on every render.

#![no_std]

extern crate alloc;

pub mod effect;
pub mod runtime;
pub mod state;

pub use effect::use_effect;
pub use runtime::{Cleanup, FiberHooks, HookKind, HooksRuntime};
pub use state::{use_state, SetState};
