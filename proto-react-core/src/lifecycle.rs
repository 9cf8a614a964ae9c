//! Render lifecycle state
//!
//! One [`Lifecycle`] per renderer tracks the work-in-progress tree, the last
//! committed tree, the traversal pointer and the pending deletions.
//! [`LifecycleObserver`] is the extension point the hooks runtime plugs into.

use alloc::vec::Vec;
use core::mem;

use proto_react_dom::DomError;

use crate::error::Result;
use crate::fiber::{FiberArena, FiberId};

/// Per-renderer lifecycle state.
#[derive(Debug, Default)]
pub struct Lifecycle {
    /// Root of the tree being built.
    pub wip_root: Option<FiberId>,
    /// Root of the tree currently reflected in the DOM.
    pub committed_root: Option<FiberId>,
    /// Next fiber to process.
    pub next_unit_of_work: Option<FiberId>,
    /// Committed fibers to remove on the next commit.
    pub deletions: Vec<FiberId>,
    /// DOM failures hit while materializing nodes, reported at commit.
    pub dom_errors: Vec<DomError>,
}

impl Lifecycle {
    /// Create an idle lifecycle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `root` as the new work-in-progress tree.
    ///
    /// Pending deletions are reset and traversal restarts at the new root.
    /// Returns the abandoned work-in-progress root, if one was replaced, so
    /// the caller can dispose of it.
    pub fn request_render(&mut self, root: FiberId) -> Option<FiberId> {
        let abandoned = self.wip_root.replace(root);
        self.deletions.clear();
        self.dom_errors.clear();
        self.next_unit_of_work = Some(root);
        abandoned
    }

    /// Drop the work-in-progress tree without committing it.
    pub fn abort(&mut self) -> Option<FiberId> {
        self.deletions.clear();
        self.dom_errors.clear();
        self.next_unit_of_work = None;
        self.wip_root.take()
    }

    /// Make the work-in-progress tree the committed one. Returns the
    /// superseded committed root.
    pub fn swap_roots(&mut self) -> Option<FiberId> {
        let wip = self.wip_root.take();
        mem::replace(&mut self.committed_root, wip)
    }

    /// Check if `fiber` is queued for deletion.
    pub fn is_pending_deletion(&self, fiber: FiberId) -> bool {
        self.deletions.contains(&fiber)
    }

    /// Check if a render cycle is in flight.
    pub fn has_work(&self) -> bool {
        self.wip_root.is_some()
    }
}

/// Callbacks around units of work and commits.
///
/// Every method has an empty default, so observers implement only what
/// they need.
pub trait LifecycleObserver {
    /// Before a fiber is processed.
    fn on_before_work(&mut self, _fibers: &mut FiberArena, _fiber: FiberId) {}

    /// After a component fiber has been invoked. An error aborts the cycle.
    fn on_after_work(&mut self, _fibers: &mut FiberArena, _fiber: FiberId) -> Result<()> {
        Ok(())
    }

    /// For each component fiber of a freshly committed tree, after the DOM
    /// has been updated.
    fn on_before_rendered(&mut self, _fibers: &mut FiberArena, _fiber: FiberId) {}

    /// For each fiber of a subtree being removed, before its DOM nodes go.
    fn on_before_unmount(&mut self, _fibers: &mut FiberArena, _fiber: FiberId) {}
}
