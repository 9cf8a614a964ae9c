//! Fiber tree
//!
//! Fibers are the unit of reconciliation work. They live in an arena and
//! link to each other by [`FiberId`]: `parent`, first `child` and next
//! `sibling` inside one tree, and `previous` into the last committed tree.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;
use hashbrown::HashMap;

use proto_react_dom::NodeId;

use crate::element::Element;

/// Fiber identifier. Allocated monotonically and never reused, so a stale
/// ID misses instead of aliasing a newer fiber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FiberId(u64);

impl FiberId {
    /// Wrap a raw ID.
    pub const fn new(raw: u64) -> Self {
        FiberId(raw)
    }

    /// Raw ID value.
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FiberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Pending host effect of a fiber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// The fiber's DOM node must be inserted.
    Creation,
    /// The fiber reuses a DOM node whose props must be diffed.
    Update,
    /// The fiber's DOM subtree must be removed. Committed fibers are never
    /// retagged; this is reported for fibers in the pending deletion list.
    Deletion,
}

/// A unit of reconciliation work.
pub struct Fiber {
    /// Fiber ID.
    pub id: FiberId,
    /// Element this fiber renders.
    pub element: Element,
    /// Host node, for text, host and root fibers.
    pub dom: Option<NodeId>,
    pub parent: Option<FiberId>,
    /// First child.
    pub child: Option<FiberId>,
    /// Next sibling.
    pub sibling: Option<FiberId>,
    /// Matching fiber of the last committed tree. Read-only; cleared once
    /// this fiber's tree is committed.
    pub previous: Option<FiberId>,
    pub operation: Option<Operation>,
    /// Opaque storage owned by the hooks runtime.
    pub hooks: Option<Box<dyn Any>>,
}

impl Fiber {
    /// Create a detached fiber. The arena assigns the ID on insert.
    pub fn new(element: Element) -> Self {
        Self {
            id: FiberId(0),
            element,
            dom: None,
            parent: None,
            child: None,
            sibling: None,
            previous: None,
            operation: None,
            hooks: None,
        }
    }

    /// Builder: set the parent.
    pub fn with_parent(mut self, parent: FiberId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Builder: set the host node.
    pub fn with_dom(mut self, dom: Option<NodeId>) -> Self {
        self.dom = dom;
        self
    }

    /// Builder: set the previous fiber.
    pub fn with_previous(mut self, previous: Option<FiberId>) -> Self {
        self.previous = previous;
        self
    }

    /// Builder: set the operation.
    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = Some(operation);
        self
    }

    /// Check if this fiber renders a function component.
    pub fn is_component(&self) -> bool {
        self.element.kind().is_component()
    }
}

impl fmt::Debug for Fiber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fiber")
            .field("id", &self.id)
            .field("kind", &self.element.kind().display_name())
            .field("dom", &self.dom)
            .field("parent", &self.parent)
            .field("child", &self.child)
            .field("sibling", &self.sibling)
            .field("previous", &self.previous)
            .field("operation", &self.operation)
            .field("hooks", &self.hooks.is_some())
            .finish()
    }
}

/// Fiber storage.
pub struct FiberArena {
    fibers: HashMap<FiberId, Fiber>,
    next_id: u64,
}

impl FiberArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self {
            fibers: HashMap::new(),
            next_id: 1,
        }
    }

    /// Store a fiber under a fresh ID.
    pub fn insert(&mut self, mut fiber: Fiber) -> FiberId {
        let id = FiberId(self.next_id);
        self.next_id += 1;
        fiber.id = id;
        self.fibers.insert(id, fiber);
        id
    }

    /// Get a fiber.
    pub fn get(&self, id: FiberId) -> Option<&Fiber> {
        self.fibers.get(&id)
    }

    /// Get a mutable fiber.
    pub fn get_mut(&mut self, id: FiberId) -> Option<&mut Fiber> {
        self.fibers.get_mut(&id)
    }

    /// Check if a fiber is live.
    pub fn contains(&self, id: FiberId) -> bool {
        self.fibers.contains_key(&id)
    }

    /// Remove a single fiber.
    pub fn remove(&mut self, id: FiberId) -> Option<Fiber> {
        self.fibers.remove(&id)
    }

    /// Number of live fibers.
    pub fn len(&self) -> usize {
        self.fibers.len()
    }

    /// Check if the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.fibers.is_empty()
    }

    /// Children of a fiber, in sibling order.
    pub fn children(&self, id: FiberId) -> Vec<FiberId> {
        let mut children = Vec::new();
        let mut child = self.get(id).and_then(|f| f.child);
        while let Some(c) = child {
            children.push(c);
            child = self.get(c).and_then(|f| f.sibling);
        }
        children
    }

    /// The fiber and all its descendants in pre-order. Siblings of `root`
    /// are not included.
    pub fn subtree(&self, root: FiberId) -> Vec<FiberId> {
        let mut out = Vec::new();
        if !self.contains(root) {
            return out;
        }
        let mut stack = alloc::vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            let mut children = self.children(id);
            children.reverse();
            stack.extend(children);
        }
        out
    }

    /// Free a fiber and its descendants. Returns the number of fibers freed.
    pub fn free_subtree(&mut self, root: FiberId) -> usize {
        let ids = self.subtree(root);
        for id in &ids {
            self.fibers.remove(id);
        }
        ids.len()
    }

    /// DOM node of the nearest ancestor that owns one.
    pub fn host_parent(&self, id: FiberId) -> Option<NodeId> {
        let mut current = self.get(id)?.parent;
        while let Some(pid) = current {
            let parent = self.get(pid)?;
            if parent.dom.is_some() {
                return parent.dom;
            }
            current = parent.parent;
        }
        None
    }

    /// Topmost DOM nodes of a subtree: the fiber's own node, or the nearest
    /// node of each child branch when the fiber has none.
    pub fn host_roots(&self, id: FiberId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = alloc::vec![id];
        while let Some(current) = stack.pop() {
            let fiber = match self.get(current) {
                Some(f) => f,
                None => continue,
            };
            if let Some(dom) = fiber.dom {
                out.push(dom);
                continue;
            }
            let mut children = self.children(current);
            children.reverse();
            stack.extend(children);
        }
        out
    }

    /// Already placed DOM node that a newly created fiber's node must be
    /// inserted before.
    ///
    /// Walks following siblings (climbing through parents without a DOM
    /// node), skips subtrees that are themselves being created and descends
    /// into component fibers until a DOM node is found.
    pub fn host_anchor(&self, id: FiberId) -> Option<NodeId> {
        let mut node = id;
        'siblings: loop {
            loop {
                let fiber = self.get(node)?;
                if let Some(sibling) = fiber.sibling {
                    node = sibling;
                    break;
                }
                let parent = self.get(fiber.parent?)?;
                if parent.dom.is_some() {
                    return None;
                }
                node = parent.id;
            }

            loop {
                let fiber = self.get(node)?;
                if fiber.operation == Some(Operation::Creation) {
                    continue 'siblings;
                }
                if fiber.dom.is_some() {
                    return fiber.dom;
                }
                match fiber.child {
                    Some(child) => node = child,
                    None => continue 'siblings,
                }
            }
        }
    }

    /// Iterate over all live fibers in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &Fiber> {
        self.fibers.values()
    }
}

impl Default for FiberArena {
    fn default() -> Self {
        Self::new()
    }
}
