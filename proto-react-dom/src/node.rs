//! Host nodes
//!
//! Nodes live in the document's arena and link to each other by ID. The
//! sibling links make insertion before a reference node O(1).

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// Index of a node in its document's arena.
pub type NodeId = usize;

/// Kind of a node, as reported by [`Node::node_type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Element,
    Text,
    Document,
}

/// A node and its position in the tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub data: NodeData,
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub prev_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
}

/// Payload of a node.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// The single root of a document.
    Document,
    /// A tagged element. Properties keep their assignment order.
    Element { tag: String, properties: Vec<Property> },
    /// A run of text.
    Text { content: String },
}

/// A property synced onto an element.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub value: String,
}

impl Property {
    pub fn new(name: &str, value: &str) -> Self {
        Property {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl Node {
    fn with_data(id: NodeId, data: NodeData) -> Self {
        Node {
            id,
            data,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
        }
    }

    pub fn new_document(id: NodeId) -> Self {
        Self::with_data(id, NodeData::Document)
    }

    pub fn new_element(id: NodeId, tag: &str) -> Self {
        Self::with_data(
            id,
            NodeData::Element {
                tag: tag.into(),
                properties: Vec::new(),
            },
        )
    }

    pub fn new_text(id: NodeId, content: String) -> Self {
        Self::with_data(id, NodeData::Text { content })
    }

    /// Kind derived from the payload.
    pub fn node_type(&self) -> NodeType {
        match self.data {
            NodeData::Document => NodeType::Document,
            NodeData::Element { .. } => NodeType::Element,
            NodeData::Text { .. } => NodeType::Text,
        }
    }

    pub fn is_element(&self) -> bool {
        self.node_type() == NodeType::Element
    }

    pub fn is_text(&self) -> bool {
        self.node_type() == NodeType::Text
    }

    pub fn is_document(&self) -> bool {
        self.node_type() == NodeType::Document
    }

    /// Tag of an element.
    pub fn tag_name(&self) -> Option<&str> {
        match &self.data {
            NodeData::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    /// Content of a text node.
    pub fn text_content(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text { content } => Some(content),
            _ => None,
        }
    }

    /// Synced properties of an element; empty for other kinds.
    pub fn properties(&self) -> &[Property] {
        match &self.data {
            NodeData::Element { properties, .. } => properties,
            _ => &[],
        }
    }

    pub fn get_property(&self, name: &str) -> Option<&str> {
        self.properties()
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    /// Check if the node hangs under a parent.
    pub fn is_attached(&self) -> bool {
        self.parent.is_some()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            NodeData::Document => write!(f, "#document"),
            NodeData::Element { tag, .. } => write!(f, "<{}> #{}", tag, self.id),
            NodeData::Text { content } => {
                let mut chars = content.chars();
                let head: String = chars.by_ref().take(16).collect();
                let more = if chars.next().is_some() { "..." } else { "" };
                write!(f, "{:?}{} #{}", head, more, self.id)
            }
        }
    }
}
