//! Element properties
//!
//! Props are an ordered name → value mapping. Keys starting with `on` are
//! event listeners, everything else except `children` is a host property.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use proto_react_dom::{Document, DomError, Event, EventHandler, NodeId};

/// A single prop value.
#[derive(Clone)]
pub enum PropValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Event listener, compared by identity.
    Handler(EventHandler),
}

impl PropValue {
    /// Check if this value is an event handler.
    pub fn is_handler(&self) -> bool {
        matches!(self, PropValue::Handler(_))
    }

    /// Get the handler, if this value is one.
    pub fn as_handler(&self) -> Option<&EventHandler> {
        match self {
            PropValue::Handler(h) => Some(h),
            _ => None,
        }
    }

    /// Get the string, if this value is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Host representation of a primitive value. Handlers have none.
    pub fn to_dom_string(&self) -> Option<String> {
        match self {
            PropValue::Str(s) => Some(s.clone()),
            PropValue::Int(n) => Some(n.to_string()),
            PropValue::Float(x) => Some(x.to_string()),
            PropValue::Bool(b) => Some(b.to_string()),
            PropValue::Handler(_) => None,
        }
    }
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PropValue::Str(a), PropValue::Str(b)) => a == b,
            (PropValue::Int(a), PropValue::Int(b)) => a == b,
            (PropValue::Float(a), PropValue::Float(b)) => a == b,
            (PropValue::Bool(a), PropValue::Bool(b)) => a == b,
            (PropValue::Handler(a), PropValue::Handler(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Str(s) => write!(f, "{:?}", s),
            PropValue::Int(n) => write!(f, "{}", n),
            PropValue::Float(x) => write!(f, "{}", x),
            PropValue::Bool(b) => write!(f, "{}", b),
            PropValue::Handler(h) => write!(f, "Handler({:p})", Rc::as_ptr(h)),
        }
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::Str(s.into())
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        PropValue::Str(s)
    }
}

impl From<i32> for PropValue {
    fn from(n: i32) -> Self {
        PropValue::Int(n as i64)
    }
}

impl From<i64> for PropValue {
    fn from(n: i64) -> Self {
        PropValue::Int(n)
    }
}

impl From<u32> for PropValue {
    fn from(n: u32) -> Self {
        PropValue::Int(n as i64)
    }
}

impl From<f64> for PropValue {
    fn from(x: f64) -> Self {
        PropValue::Float(x)
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        PropValue::Bool(b)
    }
}

impl From<EventHandler> for PropValue {
    fn from(h: EventHandler) -> Self {
        PropValue::Handler(h)
    }
}

/// Wrap a closure as an [`EventHandler`].
pub fn handler<F>(f: F) -> EventHandler
where
    F: Fn(&mut Event) + 'static,
{
    Rc::new(f)
}

/// Check if a prop key names an event listener.
pub fn is_event(key: &str) -> bool {
    key.starts_with("on")
}

/// Check if a prop key is synced as a host property.
pub fn is_attribute(key: &str) -> bool {
    key != "children" && !is_event(key)
}

/// Listener name for an event prop: `onClick` → `click`.
pub fn event_name(key: &str) -> String {
    key.get(2..).unwrap_or("").to_ascii_lowercase()
}

/// Ordered prop mapping.
#[derive(Clone, Default, PartialEq)]
pub struct Props {
    entries: BTreeMap<String, PropValue>,
}

impl Props {
    /// Create empty props.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set a prop.
    pub fn with<K: Into<String>, V: Into<PropValue>>(mut self, key: K, value: V) -> Self {
        self.insert(key, value);
        self
    }

    /// Builder: register a listener for `event` (`"click"` → `onClick`).
    pub fn on(mut self, event: &str, handler: EventHandler) -> Self {
        let mut key = String::from("on");
        let mut chars = event.chars();
        if let Some(first) = chars.next() {
            key.extend(first.to_uppercase());
            key.push_str(chars.as_str());
        }
        self.entries.insert(key, PropValue::Handler(handler));
        self
    }

    /// Set a prop, returning the value it replaced.
    pub fn insert<K: Into<String>, V: Into<PropValue>>(
        &mut self,
        key: K,
        value: V,
    ) -> Option<PropValue> {
        self.entries.insert(key.into(), value.into())
    }

    /// Get a prop.
    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.entries.get(key)
    }

    /// Get a string prop.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(PropValue::as_str)
    }

    /// Get an integer prop.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.get(key) {
            Some(PropValue::Int(n)) => Some(*n),
            _ => None,
        }
    }

    /// Get a boolean prop.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key) {
            Some(PropValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Check if a prop is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate over props in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of props.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no props.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

/// Sync the difference between two prop sets onto a host node.
///
/// Listeners that disappeared or changed identity are removed before the new
/// ones are added; properties absent from `next` are cleared. Failures are
/// returned rather than aborting, so one bad prop never hides the others.
pub fn apply_props(doc: &mut Document, node: NodeId, prev: &Props, next: &Props) -> Vec<DomError> {
    let mut errors = Vec::new();

    // Remove stale listeners
    for (key, value) in prev.iter().filter(|(k, _)| is_event(k)) {
        if next.get(key) == Some(value) {
            continue;
        }
        if let Some(h) = value.as_handler() {
            if let Err(e) = doc.remove_event_listener(node, &event_name(key), h) {
                errors.push(e);
            }
        }
    }

    // Add new listeners
    for (key, value) in next.iter().filter(|(k, _)| is_event(k)) {
        if prev.get(key) == Some(value) {
            continue;
        }
        if let Some(h) = value.as_handler() {
            if let Err(e) = doc.add_event_listener(node, &event_name(key), h.clone()) {
                errors.push(e);
            }
        }
    }

    // Clear removed properties
    for (key, _) in prev.iter().filter(|(k, _)| is_attribute(k)) {
        if !next.contains(key) {
            if let Err(e) = doc.remove_property(node, key) {
                errors.push(e);
            }
        }
    }

    // Set changed properties
    for (key, value) in next.iter().filter(|(k, _)| is_attribute(k)) {
        if prev.get(key) == Some(value) {
            continue;
        }
        if let Some(text) = value.to_dom_string() {
            if let Err(e) = doc.set_property(node, key, &text) {
                errors.push(e);
            }
        }
    }

    errors
}
