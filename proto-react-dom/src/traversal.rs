//! Tree walks
//!
//! Subtree and ancestor walks over the sibling links. Release uses the
//! subtree walk, event dispatch the ancestor path, and insertion checks
//! for cycles with [`Document::is_descendant_of`].

use alloc::vec;
use alloc::vec::Vec;

use crate::document::Document;
use crate::node::NodeId;

/// Pre-order walk over a subtree, root first.
pub struct Subtree<'a> {
    document: &'a Document,
    pending: Vec<NodeId>,
}

impl<'a> Subtree<'a> {
    pub(crate) fn new(document: &'a Document, root: NodeId) -> Self {
        let pending = if document.contains(root) { vec![root] } else { Vec::new() };
        Subtree { document, pending }
    }
}

impl Iterator for Subtree<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.pending.pop()?;
        // push right to left so the first child pops next
        let mut child = self.document.get(id).and_then(|n| n.last_child);
        while let Some(c) = child {
            self.pending.push(c);
            child = self.document.get(c).and_then(|n| n.prev_sibling);
        }
        Some(id)
    }
}

/// Walk from a node's parent up to the document root.
pub struct Ancestors<'a> {
    document: &'a Document,
    current: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.current?;
        self.current = self.document.get(id).and_then(|n| n.parent);
        Some(id)
    }
}

impl Document {
    /// Walk `root` and everything below it in document order.
    pub fn subtree(&self, root: NodeId) -> Subtree<'_> {
        Subtree::new(self, root)
    }

    /// Walk the parents of `node_id`, nearest first.
    pub fn ancestor_iter(&self, node_id: NodeId) -> Ancestors<'_> {
        Ancestors {
            document: self,
            current: self.get(node_id).and_then(|n| n.parent),
        }
    }

    /// Nodes below `root`, in document order.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        self.subtree(root).skip(1).collect()
    }

    /// Parents of `node_id`, nearest first.
    pub fn ancestors(&self, node_id: NodeId) -> Vec<NodeId> {
        self.ancestor_iter(node_id).collect()
    }

    /// Check if `ancestor_id` sits above `node_id`.
    pub fn is_descendant_of(&self, node_id: NodeId, ancestor_id: NodeId) -> bool {
        self.ancestor_iter(node_id).any(|id| id == ancestor_id)
    }
}
