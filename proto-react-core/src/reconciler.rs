//! Reconciler
//!
//! Processes one fiber at a time: components are invoked, host fibers get
//! their DOM node, and the resulting child elements are matched against the
//! previous tree's children by position.

use alloc::boxed::Box;
use alloc::vec::Vec;

use proto_react_dom::{Document, NodeId};

use crate::element::{Element, ElementKind};
use crate::error::{ReactError, Result};
use crate::fiber::{Fiber, FiberArena, FiberId, Operation};
use crate::lifecycle::{Lifecycle, LifecycleObserver};
use crate::props::{apply_props, Props};
use crate::scope::{RenderRequester, RenderScope};

/// Split borrows of the renderer handed to the work loop and the commit.
pub(crate) struct WorkContext<'a> {
    pub document: &'a mut Document,
    pub fibers: &'a mut FiberArena,
    pub lifecycle: &'a mut Lifecycle,
    pub observers: &'a mut [Box<dyn LifecycleObserver>],
    pub requester: &'a RenderRequester,
}

/// Process one fiber and return the next one to work on.
pub(crate) fn perform_unit_of_work(cx: &mut WorkContext<'_>, id: FiberId) -> Result<Option<FiberId>> {
    for observer in cx.observers.iter_mut() {
        observer.on_before_work(cx.fibers, id);
    }

    let element = fiber(cx.fibers, id)?.element.clone();
    log::trace!("[Reconciler] work on {} <{}>", id, element.kind().display_name());

    match element.kind() {
        ElementKind::Component(component) => {
            let child = {
                let mut scope = RenderScope::new(id, &element, cx.fibers, cx.requester);
                component.render(&mut scope, element.props())?
            };
            for observer in cx.observers.iter_mut() {
                observer.on_after_work(cx.fibers, id)?;
            }
            reconcile_children(cx, id, core::slice::from_ref(&child))?;
        }
        ElementKind::Root => {
            reconcile_children(cx, id, element.children())?;
        }
        ElementKind::Text(_) | ElementKind::Host(_) => {
            if fiber(cx.fibers, id)?.dom.is_none() {
                let node = create_dom_node(cx, &element);
                fiber_mut(cx.fibers, id)?.dom = Some(node);
            }
            reconcile_children(cx, id, element.children())?;
        }
    }

    Ok(next_unit(cx.fibers, id))
}

/// Materialize the DOM node of a host or text element. Initial prop
/// failures are kept for the commit report.
fn create_dom_node(cx: &mut WorkContext<'_>, element: &Element) -> NodeId {
    match element.kind() {
        ElementKind::Text(content) => cx.document.create_text(content.clone()),
        _ => {
            let tag = element.kind().display_name();
            let node = cx.document.create_element(tag);
            for err in apply_props(cx.document, node, &Props::new(), element.props()) {
                log::warn!("[Reconciler] initial prop on <{}> failed: {}", tag, err);
                cx.lifecycle.dom_errors.push(err);
            }
            node
        }
    }
}

/// Match `elements` against the previous children of `parent` by position.
///
/// Same-typed pairs become `Update` fibers reusing the old DOM node, new
/// elements without a match become `Creation` fibers, and unmatched old
/// fibers are queued for deletion. The committed tree is left untouched.
pub(crate) fn reconcile_children(
    cx: &mut WorkContext<'_>,
    parent: FiberId,
    elements: &[Element],
) -> Result<()> {
    let mut old_child = fiber(cx.fibers, parent)?
        .previous
        .and_then(|p| cx.fibers.get(p))
        .and_then(|p| p.child);
    let mut prev_sibling: Option<FiberId> = None;
    let mut index = 0;

    while index < elements.len() || old_child.is_some() {
        let element = elements.get(index);

        let (old_dom, old_sibling, same_type) = match old_child.and_then(|o| cx.fibers.get(o)) {
            Some(old) => (
                old.dom,
                old.sibling,
                element.map(|e| e.same_type(&old.element)).unwrap_or(false),
            ),
            None => (None, None, false),
        };

        let new_fiber = match element {
            Some(element) if same_type => Some(
                cx.fibers.insert(
                    Fiber::new(element.clone())
                        .with_parent(parent)
                        .with_dom(old_dom)
                        .with_previous(old_child)
                        .with_operation(Operation::Update),
                ),
            ),
            Some(element) => Some(
                cx.fibers.insert(
                    Fiber::new(element.clone())
                        .with_parent(parent)
                        .with_operation(Operation::Creation),
                ),
            ),
            None => None,
        };

        if !same_type {
            if let Some(old) = old_child {
                log::trace!("[Reconciler] {} queued for deletion", old);
                cx.lifecycle.deletions.push(old);
            }
        }

        if let Some(new_id) = new_fiber {
            match prev_sibling {
                None => fiber_mut(cx.fibers, parent)?.child = Some(new_id),
                Some(prev) => fiber_mut(cx.fibers, prev)?.sibling = Some(new_id),
            }
            prev_sibling = Some(new_id);
        }

        old_child = old_sibling;
        index += 1;
    }

    Ok(())
}

/// Pre-order successor: first child, else the nearest sibling walking up
/// through the parents.
pub(crate) fn next_unit(fibers: &FiberArena, id: FiberId) -> Option<FiberId> {
    let fiber = fibers.get(id)?;
    if fiber.child.is_some() {
        return fiber.child;
    }
    let mut current = Some(fiber);
    while let Some(f) = current {
        if f.sibling.is_some() {
            return f.sibling;
        }
        current = f.parent.and_then(|p| fibers.get(p));
    }
    None
}

/// Free an abandoned work-in-progress tree.
///
/// DOM nodes created for it were never attached, so they are released
/// along with the fibers when `release_nodes` is set. Reused nodes belong to
/// the committed tree and stay.
pub(crate) fn dispose_tree(
    document: &mut Document,
    fibers: &mut FiberArena,
    root: FiberId,
    release_nodes: bool,
) -> usize {
    let ids = fibers.subtree(root);
    let mut released = 0;
    if release_nodes {
        for &id in &ids {
            let node = match fibers.get(id) {
                Some(f) if f.operation == Some(Operation::Creation) => f.dom,
                _ => None,
            };
            if let Some(node) = node {
                if document.contains(node) && document.release_node(node).is_ok() {
                    released += 1;
                }
            }
        }
    }
    let freed = fibers.free_subtree(root);
    log::debug!(
        "[Reconciler] disposed {} abandoned fibers, released {} nodes",
        freed,
        released
    );
    freed
}

pub(crate) fn fiber(fibers: &FiberArena, id: FiberId) -> Result<&Fiber> {
    fibers.get(id).ok_or(ReactError::FiberNotFound(id))
}

pub(crate) fn fiber_mut(fibers: &mut FiberArena, id: FiberId) -> Result<&mut Fiber> {
    fibers.get_mut(id).ok_or(ReactError::FiberNotFound(id))
}

/// Fibers of `root`'s tree in pre-order, excluding `root` itself.
pub(crate) fn descendants(fibers: &FiberArena, root: FiberId) -> Vec<FiberId> {
    let mut ids = fibers.subtree(root);
    if !ids.is_empty() {
        ids.remove(0);
    }
    ids
}
