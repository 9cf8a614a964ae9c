//! Mutation journal
//!
//! When enabled, every structural or property change applied to a
//! [`Document`] is appended to its journal. The reconciler's tests drain it
//! to prove that a render produced exactly the expected set of host
//! mutations. Journaling is off unless the document was built with
//! [`Document::with_journal`].
//!
//! [`Document`]: crate::Document
//! [`Document::with_journal`]: crate::Document::with_journal

use alloc::string::String;
use alloc::vec::Vec;

use crate::node::NodeId;

/// A single host mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationRecord {
    /// A node was inserted under `parent`, before `before` (or appended).
    Insert {
        parent: NodeId,
        node: NodeId,
        before: Option<NodeId>,
    },
    /// A node was detached from `parent`.
    Remove { parent: NodeId, node: NodeId },
    /// A property was assigned.
    SetProperty {
        node: NodeId,
        name: String,
        value: String,
    },
    /// A property was cleared.
    RemoveProperty { node: NodeId, name: String },
    /// Text node content changed.
    SetText { node: NodeId, content: String },
    /// A listener was registered.
    AddListener { node: NodeId, event: String },
    /// A listener was unregistered.
    RemoveListener { node: NodeId, event: String },
    /// A detached node was released back to the document.
    Release { node: NodeId },
}

impl MutationRecord {
    /// Node the mutation applies to.
    pub fn node(&self) -> NodeId {
        match self {
            MutationRecord::Insert { node, .. }
            | MutationRecord::Remove { node, .. }
            | MutationRecord::SetProperty { node, .. }
            | MutationRecord::RemoveProperty { node, .. }
            | MutationRecord::SetText { node, .. }
            | MutationRecord::AddListener { node, .. }
            | MutationRecord::RemoveListener { node, .. }
            | MutationRecord::Release { node } => *node,
        }
    }
}

/// Append-only log of mutations, drained by observers.
#[derive(Debug, Default)]
pub struct MutationJournal {
    records: Vec<MutationRecord>,
    enabled: bool,
}

impl MutationJournal {
    /// Create a disabled journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if mutations are being recorded.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record a mutation.
    pub fn push(&mut self, record: MutationRecord) {
        if self.enabled {
            self.records.push(record);
        }
    }

    /// Stop or resume recording.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Take every record collected so far.
    pub fn take(&mut self) -> Vec<MutationRecord> {
        core::mem::take(&mut self.records)
    }

    /// Records collected so far.
    pub fn records(&self) -> &[MutationRecord] {
        &self.records
    }

    /// Number of pending records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing has been recorded since the last `take`.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
