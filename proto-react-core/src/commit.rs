//! Commit phase
//!
//! Applies a finished work-in-progress tree to the document in one go:
//! deletions first, then insertions and prop updates in tree order, then the
//! root swap and post-commit observers.

use alloc::vec::Vec;

use proto_react_dom::DomError;

use crate::element::ElementKind;
use crate::error::Result;
use crate::fiber::{FiberId, Operation};
use crate::props::apply_props;
use crate::reconciler::{descendants, fiber, WorkContext};

/// Summary of one commit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitReport {
    /// Root of the committed tree.
    pub root: Option<FiberId>,
    /// Fibers whose DOM node was inserted.
    pub created: usize,
    /// Fibers whose DOM node was diffed.
    pub updated: usize,
    /// Deleted subtrees.
    pub deleted: usize,
    /// DOM failures, in the order they happened.
    pub errors: Vec<DomError>,
}

impl CommitReport {
    /// Check if every DOM mutation succeeded.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    fn record(&mut self, fiber: FiberId, result: core::result::Result<(), DomError>) {
        if let Err(err) = result {
            log::warn!("[Commit] fiber {}: {}", fiber, err);
            self.errors.push(err);
        }
    }
}

/// Commit the work-in-progress tree. Callers check that traversal is done.
pub(crate) fn commit_root(cx: &mut WorkContext<'_>) -> Result<CommitReport> {
    let mut report = CommitReport::default();
    let root = match cx.lifecycle.wip_root {
        Some(root) => root,
        None => return Ok(report),
    };
    report.root = Some(root);
    report.errors.append(&mut cx.lifecycle.dom_errors);

    let deletions = core::mem::take(&mut cx.lifecycle.deletions);
    for id in deletions {
        commit_deletion(cx, id, &mut report);
    }

    for id in descendants(cx.fibers, root) {
        commit_work(cx, id, &mut report)?;
    }

    let superseded = cx.lifecycle.swap_roots();
    if let Some(old_root) = superseded {
        let freed = cx.fibers.free_subtree(old_root);
        log::trace!("[Commit] freed {} fibers of the previous tree", freed);
    }

    let tree = cx.fibers.subtree(root);
    for &id in &tree {
        if let Some(f) = cx.fibers.get_mut(id) {
            f.previous = None;
        }
    }

    for &id in &tree {
        let is_component = cx.fibers.get(id).map(|f| f.is_component()).unwrap_or(false);
        if is_component {
            for observer in cx.observers.iter_mut() {
                observer.on_before_rendered(cx.fibers, id);
            }
        }
    }

    log::debug!(
        "[Commit] root {}: {} created, {} updated, {} deleted, {} errors",
        root,
        report.created,
        report.updated,
        report.deleted,
        report.errors.len()
    );
    Ok(report)
}

fn commit_work(cx: &mut WorkContext<'_>, id: FiberId, report: &mut CommitReport) -> Result<()> {
    let f = fiber(cx.fibers, id)?;
    let (operation, dom, element, previous) = (f.operation, f.dom, f.element.clone(), f.previous);
    let node = match dom {
        Some(node) => node,
        // component fibers have nothing to apply
        None => return Ok(()),
    };

    match operation {
        Some(Operation::Creation) => {
            let parent = match cx.fibers.host_parent(id) {
                Some(parent) => parent,
                None => return Ok(()),
            };
            let anchor = cx.fibers.host_anchor(id);
            log::trace!("[Commit] insert {} into {} before {:?}", node, parent, anchor);
            report.record(id, cx.document.insert_before(parent, node, anchor));
            report.created += 1;
        }
        Some(Operation::Update) => {
            let prev_element = match previous.and_then(|p| cx.fibers.get(p)) {
                Some(p) => p.element.clone(),
                None => return Ok(()),
            };
            match element.kind() {
                ElementKind::Text(content) => {
                    if prev_element.text_content() != Some(content.as_str()) {
                        report.record(id, cx.document.set_text(node, content));
                    }
                }
                _ => {
                    for err in apply_props(cx.document, node, prev_element.props(), element.props()) {
                        report.record(id, Err(err));
                    }
                }
            }
            report.updated += 1;
        }
        _ => {}
    }
    Ok(())
}

/// Unmount a committed subtree and drop its DOM nodes.
fn commit_deletion(cx: &mut WorkContext<'_>, id: FiberId, report: &mut CommitReport) {
    for fiber in cx.fibers.subtree(id) {
        for observer in cx.observers.iter_mut() {
            observer.on_before_unmount(cx.fibers, fiber);
        }
    }

    for node in cx.fibers.host_roots(id) {
        if !cx.document.contains(node) {
            continue;
        }
        log::trace!("[Commit] remove node {} of fiber {}", node, id);
        report.record(id, cx.document.release_node(node));
    }
    report.deleted += 1;
}
