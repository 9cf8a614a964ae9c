//! DOM Document - Document node and tree management

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use hashbrown::HashMap;

use crate::error::{DomError, DomResult};
use crate::events::{Event, EventDispatcher, EventHandler, ListenerOptions};
use crate::mutation::{MutationJournal, MutationRecord};
use crate::node::{Node, NodeData, NodeId, Property};

/// Bits of a [`NodeId`] holding the arena slot. The rest hold the slot's
/// generation.
const SLOT_BITS: u32 = usize::BITS / 2;
const SLOT_MASK: usize = (1 << SLOT_BITS) - 1;

fn slot_of(id: NodeId) -> usize {
    id & SLOT_MASK
}

fn generation_of(id: NodeId) -> usize {
    id >> SLOT_BITS
}

/// One arena cell. The generation advances every time the cell is freed.
struct Slot {
    generation: usize,
    node: Option<Node>,
}

/// A DOM document.
///
/// Nodes live in an arena indexed by [`NodeId`]. Released slots are reused
/// under a new generation, so a stale ID misses instead of reaching the
/// node that took its place.
pub struct Document {
    /// All nodes in the document.
    nodes: Vec<Slot>,
    /// Released slots, reused last-in first-out.
    free: Vec<usize>,
    /// ID to node mapping.
    id_map: HashMap<String, NodeId>,
    /// Event listeners.
    events: EventDispatcher,
    /// Record of applied mutations.
    journal: MutationJournal,
}

impl Document {
    /// Create a new empty document. Mutations are not journaled.
    pub fn new() -> Self {
        let mut doc = Document {
            nodes: Vec::new(),
            free: Vec::new(),
            id_map: HashMap::new(),
            events: EventDispatcher::new(),
            journal: MutationJournal::new(),
        };

        // Create document node
        doc.allocate(Node::new_document);
        doc
    }

    /// Create a document that journals every mutation until drained.
    pub fn with_journal() -> Self {
        let mut doc = Self::new();
        doc.journal.set_enabled(true);
        doc
    }

    /// ID of the document node.
    pub fn root(&self) -> NodeId {
        0
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes
            .get(slot_of(id))
            .filter(|slot| slot.generation == generation_of(id))
            .and_then(|slot| slot.node.as_ref())
    }

    /// Get a mutable node by ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes
            .get_mut(slot_of(id))
            .filter(|slot| slot.generation == generation_of(id))
            .and_then(|slot| slot.node.as_mut())
    }

    /// Check if a live node has this ID.
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> DomResult<&mut Node> {
        self.get_mut(id).ok_or(DomError::NodeNotFound(id))
    }

    /// Place a node in a free slot, or grow the arena.
    fn allocate(&mut self, build: impl FnOnce(NodeId) -> Node) -> NodeId {
        if let Some(index) = self.free.pop() {
            if let Some(slot) = self.nodes.get_mut(index) {
                let id = (slot.generation << SLOT_BITS) | index;
                slot.node = Some(build(id));
                return id;
            }
        }
        let id = self.nodes.len();
        self.nodes.push(Slot {
            generation: 0,
            node: Some(build(id)),
        });
        id
    }

    /// Empty a slot and retire its current generation.
    fn free_slot(&mut self, id: NodeId) -> Option<Node> {
        let slot = self
            .nodes
            .get_mut(slot_of(id))
            .filter(|slot| slot.generation == generation_of(id))?;
        let node = slot.node.take()?;
        slot.generation = (slot.generation + 1) & SLOT_MASK;
        self.free.push(slot_of(id));
        Some(node)
    }

    /// Create a new, detached element.
    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        self.allocate(|id| Node::new_element(id, tag_name))
    }

    /// Create a new, detached text node.
    pub fn create_text(&mut self, content: String) -> NodeId {
        self.allocate(|id| Node::new_text(id, content))
    }

    /// Append a child to a parent, detaching it from any previous parent.
    pub fn append_child(&mut self, parent_id: NodeId, child_id: NodeId) -> DomResult<()> {
        self.insert_before(parent_id, child_id, None)
    }

    /// Insert a child before another child (or append when `ref_child_id`
    /// is `None`).
    pub fn insert_before(
        &mut self,
        parent_id: NodeId,
        new_child_id: NodeId,
        ref_child_id: Option<NodeId>,
    ) -> DomResult<()> {
        self.check_insertion(parent_id, new_child_id)?;
        if let Some(ref_id) = ref_child_id {
            if self.node(ref_id)?.parent != Some(parent_id) {
                return Err(DomError::NotAChild {
                    parent: parent_id,
                    node: ref_id,
                });
            }
            if ref_id == new_child_id {
                return Ok(());
            }
        }

        self.unlink(new_child_id);

        let prev_id = match ref_child_id {
            Some(ref_id) => self.node(ref_id)?.prev_sibling,
            None => self.node(parent_id)?.last_child,
        };

        {
            let new_child = self.node_mut(new_child_id)?;
            new_child.parent = Some(parent_id);
            new_child.prev_sibling = prev_id;
            new_child.next_sibling = ref_child_id;
        }

        match ref_child_id {
            Some(ref_id) => self.node_mut(ref_id)?.prev_sibling = Some(new_child_id),
            None => self.node_mut(parent_id)?.last_child = Some(new_child_id),
        }

        match prev_id {
            Some(prev_id) => self.node_mut(prev_id)?.next_sibling = Some(new_child_id),
            // new child is first child
            None => self.node_mut(parent_id)?.first_child = Some(new_child_id),
        }

        self.journal.push(MutationRecord::Insert {
            parent: parent_id,
            node: new_child_id,
            before: ref_child_id,
        });
        Ok(())
    }

    fn check_insertion(&self, parent_id: NodeId, child_id: NodeId) -> DomResult<()> {
        let parent = self.node(parent_id)?;
        let child = self.node(child_id)?;
        if parent.is_text()
            || child.is_document()
            || parent_id == child_id
            || self.is_descendant_of(parent_id, child_id)
        {
            return Err(DomError::HierarchyRequest {
                parent: parent_id,
                node: child_id,
            });
        }
        Ok(())
    }

    /// Remove a child from its parent.
    pub fn remove_child(&mut self, parent_id: NodeId, child_id: NodeId) -> DomResult<()> {
        if self.node(child_id)?.parent != Some(parent_id) {
            return Err(DomError::NotAChild {
                parent: parent_id,
                node: child_id,
            });
        }
        self.unlink(child_id);
        self.journal.push(MutationRecord::Remove {
            parent: parent_id,
            node: child_id,
        });
        Ok(())
    }

    /// Detach a node from its parent without journaling.
    fn unlink(&mut self, child_id: NodeId) {
        let (parent_id, prev_id, next_id) = match self.get(child_id) {
            Some(c) => (c.parent, c.prev_sibling, c.next_sibling),
            None => return,
        };

        // Update previous sibling
        if let Some(prev_id) = prev_id {
            if let Some(prev) = self.get_mut(prev_id) {
                prev.next_sibling = next_id;
            }
        } else if let Some(parent_id) = parent_id {
            // child was first child
            if let Some(parent) = self.get_mut(parent_id) {
                parent.first_child = next_id;
            }
        }

        // Update next sibling
        if let Some(next_id) = next_id {
            if let Some(next) = self.get_mut(next_id) {
                next.prev_sibling = prev_id;
            }
        } else if let Some(parent_id) = parent_id {
            // child was last child
            if let Some(parent) = self.get_mut(parent_id) {
                parent.last_child = prev_id;
            }
        }

        // Clear child's links
        if let Some(child) = self.get_mut(child_id) {
            child.parent = None;
            child.prev_sibling = None;
            child.next_sibling = None;
        }
    }

    /// Release a node and its whole subtree: detach it, drop its listeners
    /// and free the arena slots.
    pub fn release_node(&mut self, node_id: NodeId) -> DomResult<()> {
        if let Some(parent) = self.node(node_id)?.parent {
            self.remove_child(parent, node_id)?;
        }

        let mut subtree = self.descendants(node_id);
        subtree.push(node_id);
        for id in subtree {
            self.events.remove_node(id);
            if let Some(node) = self.free_slot(id) {
                if let Some(key) = node.get_property("id") {
                    if self.id_map.get(key) == Some(&id) {
                        self.id_map.remove(key);
                    }
                }
            }
            self.journal.push(MutationRecord::Release { node: id });
        }
        Ok(())
    }

    /// Assign a property on an element. `nodeValue` on a text node updates
    /// its content.
    pub fn set_property(&mut self, node_id: NodeId, name: &str, value: &str) -> DomResult<()> {
        validate_property_name(name)?;
        if self.node(node_id)?.is_text() {
            if name == "nodeValue" {
                return self.set_text(node_id, value);
            }
            return Err(DomError::TextNodeProperty {
                node: node_id,
                name: name.into(),
            });
        }

        match &mut self.node_mut(node_id)?.data {
            NodeData::Element { properties, .. } => {
                if let Some(prop) = properties.iter_mut().find(|p| p.name == name) {
                    prop.value = value.into();
                } else {
                    properties.push(Property::new(name, value));
                }
            }
            _ => return Err(DomError::WrongNodeType { node: node_id, expected: "element" }),
        }

        if name == "id" {
            self.id_map.retain(|_, v| *v != node_id);
            self.id_map.insert(value.into(), node_id);
        }

        self.journal.push(MutationRecord::SetProperty {
            node: node_id,
            name: name.into(),
            value: value.into(),
        });
        Ok(())
    }

    /// Clear a property. Clearing an absent property is not an error.
    pub fn remove_property(&mut self, node_id: NodeId, name: &str) -> DomResult<()> {
        validate_property_name(name)?;
        match &mut self.node_mut(node_id)?.data {
            NodeData::Element { properties, .. } => properties.retain(|p| p.name != name),
            NodeData::Text { .. } => {
                return Err(DomError::TextNodeProperty {
                    node: node_id,
                    name: name.into(),
                })
            }
            NodeData::Document => {
                return Err(DomError::WrongNodeType { node: node_id, expected: "element" })
            }
        }

        if name == "id" {
            self.id_map.retain(|_, v| *v != node_id);
        }

        self.journal.push(MutationRecord::RemoveProperty {
            node: node_id,
            name: name.into(),
        });
        Ok(())
    }

    /// Replace the content of a text node.
    pub fn set_text(&mut self, node_id: NodeId, content: &str) -> DomResult<()> {
        match &mut self.node_mut(node_id)?.data {
            NodeData::Text { content: current } => *current = content.into(),
            _ => return Err(DomError::WrongNodeType { node: node_id, expected: "text" }),
        }
        self.journal.push(MutationRecord::SetText {
            node: node_id,
            content: content.into(),
        });
        Ok(())
    }

    /// Register a bubbling listener on a node.
    pub fn add_event_listener(
        &mut self,
        node_id: NodeId,
        event: &str,
        handler: EventHandler,
    ) -> DomResult<()> {
        self.node(node_id)?;
        let added = self
            .events
            .get_target(node_id)
            .add_event_listener(event, handler, ListenerOptions::default());
        if added {
            self.journal.push(MutationRecord::AddListener {
                node: node_id,
                event: event.into(),
            });
        }
        Ok(())
    }

    /// Unregister the listener registered with `handler`.
    pub fn remove_event_listener(
        &mut self,
        node_id: NodeId,
        event: &str,
        handler: &EventHandler,
    ) -> DomResult<()> {
        self.node(node_id)?;
        if self.events.get_target(node_id).remove_handler(event, handler) {
            self.journal.push(MutationRecord::RemoveListener {
                node: node_id,
                event: event.into(),
            });
        }
        Ok(())
    }

    /// Number of listeners registered on a node.
    pub fn listener_count(&self, node_id: NodeId) -> usize {
        self.events
            .target(node_id)
            .map(|t| t.listener_count())
            .unwrap_or(0)
    }

    /// Dispatch an event at its target, propagating along the ancestor path.
    pub fn dispatch_event(&mut self, event: Event) -> DomResult<Event> {
        self.node(event.target)?;
        let mut path = alloc::vec![event.target];
        path.extend(self.ancestors(event.target));
        Ok(self.events.dispatch(event, &path))
    }

    /// Get children of a node.
    pub fn children(&self, parent_id: NodeId) -> Vec<NodeId> {
        let mut children = Vec::new();
        let mut child_id = self.get(parent_id).and_then(|p| p.first_child);

        while let Some(id) = child_id {
            children.push(id);
            child_id = self.get(id).and_then(|n| n.next_sibling);
        }

        children
    }

    /// Get elements by tag name.
    pub fn get_elements_by_tag_name(&self, tag_name: &str) -> Vec<NodeId> {
        self.iter()
            .filter(|n| {
                n.tag_name()
                    .map(|t| t.eq_ignore_ascii_case(tag_name))
                    .unwrap_or(false)
            })
            .map(|n| n.id)
            .collect()
    }

    /// Get element by ID.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.id_map.get(id).copied()
    }

    /// Get a property value.
    pub fn get_property(&self, node_id: NodeId, name: &str) -> Option<&str> {
        self.get(node_id).and_then(|n| n.get_property(name))
    }

    /// Get text content of a node (recursive).
    pub fn text_content(&self, node_id: NodeId) -> String {
        let node = match self.get(node_id) {
            Some(n) => n,
            None => return String::new(),
        };

        match &node.data {
            NodeData::Text { content } => content.clone(),
            _ => {
                let mut result = String::new();
                for child_id in self.children(node_id) {
                    result.push_str(&self.text_content(child_id));
                }
                result
            }
        }
    }

    /// Serialize a subtree as markup. Properties are printed as attributes
    /// in assignment order.
    pub fn to_html(&self, node_id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node_id, &mut out);
        out
    }

    fn write_html(&self, node_id: NodeId, out: &mut String) {
        let node = match self.get(node_id) {
            Some(n) => n,
            None => return,
        };
        match &node.data {
            NodeData::Text { content } => out.push_str(content),
            NodeData::Document => {
                for child in self.children(node_id) {
                    self.write_html(child, out);
                }
            }
            NodeData::Element { tag, properties } => {
                out.push('<');
                out.push_str(tag);
                for prop in properties {
                    out.push(' ');
                    out.push_str(&prop.name);
                    out.push_str("=\"");
                    out.push_str(&prop.value);
                    out.push('"');
                }
                out.push('>');
                for child in self.children(node_id) {
                    self.write_html(child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    /// Take every mutation recorded since the last call.
    pub fn take_mutations(&mut self) -> Vec<MutationRecord> {
        self.journal.take()
    }

    /// Mutation journal.
    pub fn journal(&self) -> &MutationJournal {
        &self.journal
    }

    /// Mutable access to the mutation journal.
    pub fn journal_mut(&mut self) -> &mut MutationJournal {
        &mut self.journal
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Number of arena slots, live or free.
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    /// Check if document is empty (only document node).
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Iterate over all live nodes.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter_map(|slot| slot.node.as_ref())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_property_name(name: &str) -> DomResult<()> {
    if name.is_empty() || name.chars().any(|c| c.is_whitespace() || c == '"' || c == '=') {
        return Err(DomError::InvalidPropertyName(name.to_string()));
    }
    Ok(())
}
