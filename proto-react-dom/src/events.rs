//! DOM Event System
//!
//! Listener registration and capture/target/bubble dispatch. Handlers are
//! reference counted so the reconciler can compare them by identity when it
//! diffs `on*` props between renders.

use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use hashbrown::HashMap;

use crate::node::NodeId;

/// Where a dispatch currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventPhase {
    None,
    /// Walking down from the root towards the target.
    Capturing,
    AtTarget,
    /// Walking back up from the target.
    Bubbling,
}

/// Event type categories.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    DblClick,
    MouseDown,
    MouseUp,
    MouseEnter,
    MouseLeave,
    KeyDown,
    KeyUp,
    Focus,
    Blur,
    Input,
    Change,
    Submit,
    Scroll,
    /// Any other event name, stored lower-cased.
    Custom(String),
}

impl EventType {
    /// Get event type name.
    pub fn as_str(&self) -> &str {
        match self {
            EventType::Click => "click",
            EventType::DblClick => "dblclick",
            EventType::MouseDown => "mousedown",
            EventType::MouseUp => "mouseup",
            EventType::MouseEnter => "mouseenter",
            EventType::MouseLeave => "mouseleave",
            EventType::KeyDown => "keydown",
            EventType::KeyUp => "keyup",
            EventType::Focus => "focus",
            EventType::Blur => "blur",
            EventType::Input => "input",
            EventType::Change => "change",
            EventType::Submit => "submit",
            EventType::Scroll => "scroll",
            EventType::Custom(name) => name,
        }
    }

    /// Parse event type from a name. Unknown names become `Custom`.
    pub fn from_name(s: &str) -> Self {
        match s {
            "click" => EventType::Click,
            "dblclick" => EventType::DblClick,
            "mousedown" => EventType::MouseDown,
            "mouseup" => EventType::MouseUp,
            "mouseenter" => EventType::MouseEnter,
            "mouseleave" => EventType::MouseLeave,
            "keydown" => EventType::KeyDown,
            "keyup" => EventType::KeyUp,
            "focus" => EventType::Focus,
            "blur" => EventType::Blur,
            "input" => EventType::Input,
            "change" => EventType::Change,
            "submit" => EventType::Submit,
            "scroll" => EventType::Scroll,
            other => EventType::Custom(other.to_ascii_lowercase()),
        }
    }

    /// Check if event bubbles by default.
    pub fn bubbles(&self) -> bool {
        !matches!(
            self,
            EventType::Focus
                | EventType::Blur
                | EventType::MouseEnter
                | EventType::MouseLeave
                | EventType::Scroll
        )
    }

    /// Check if event is cancelable.
    pub fn cancelable(&self) -> bool {
        !matches!(self, EventType::Blur | EventType::Focus | EventType::Scroll)
    }
}

/// An event travelling through the tree. Handlers receive it mutably and
/// may stop it or mark it handled.
#[derive(Debug, Clone)]
pub struct Event {
    pub event_type: EventType,
    /// Node the event was dispatched at.
    pub target: NodeId,
    /// Node whose listeners are running.
    pub current_target: Option<NodeId>,
    pub phase: EventPhase,
    pub bubbles: bool,
    pub cancelable: bool,
    pub default_prevented: bool,
    pub propagation_stopped: bool,
    pub immediate_propagation_stopped: bool,
    /// Free-form payload (input value, key name).
    pub data: Option<String>,
}

impl Event {
    /// Create a new event.
    pub fn new(event_type: EventType, target: NodeId) -> Self {
        Self {
            bubbles: event_type.bubbles(),
            cancelable: event_type.cancelable(),
            event_type,
            target,
            current_target: None,
            phase: EventPhase::None,
            default_prevented: false,
            propagation_stopped: false,
            immediate_propagation_stopped: false,
            data: None,
        }
    }

    /// Create an event carrying a payload.
    pub fn with_data(event_type: EventType, target: NodeId, data: &str) -> Self {
        let mut event = Self::new(event_type, target);
        event.data = Some(data.to_string());
        event
    }

    /// Prevent default action.
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    /// Stop propagation.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Stop immediate propagation.
    pub fn stop_immediate_propagation(&mut self) {
        self.propagation_stopped = true;
        self.immediate_propagation_stopped = true;
    }
}

/// Listener callback. Identity (`Rc::ptr_eq`) is what registration and
/// removal compare.
pub type EventHandler = Rc<dyn Fn(&mut Event)>;

/// Event listener options.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListenerOptions {
    /// Listen during capture phase.
    pub capture: bool,
    /// Remove listener after first invocation.
    pub once: bool,
}

struct Listener {
    handler: EventHandler,
    options: ListenerOptions,
}

impl Listener {
    fn is(&self, handler: &EventHandler, capture: bool) -> bool {
        Rc::ptr_eq(&self.handler, handler) && self.options.capture == capture
    }
}

/// Listeners registered on one node, grouped by event name.
#[derive(Default)]
pub struct EventTarget {
    listeners: HashMap<String, Vec<Listener>>,
}

impl EventTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler`. Returns false when the same handler is already
    /// registered for this event and phase.
    pub fn add_event_listener(
        &mut self,
        event_type: &str,
        handler: EventHandler,
        options: ListenerOptions,
    ) -> bool {
        let list = self.listeners.entry(event_type.to_string()).or_default();
        if list.iter().any(|l| l.is(&handler, options.capture)) {
            return false;
        }
        list.push(Listener { handler, options });
        true
    }

    /// Unregister `handler` from either phase.
    pub fn remove_handler(&mut self, event_type: &str, handler: &EventHandler) -> bool {
        let Some(list) = self.listeners.get_mut(event_type) else {
            return false;
        };
        let before = list.len();
        list.retain(|l| !Rc::ptr_eq(&l.handler, handler));
        let removed = list.len() != before;
        if list.is_empty() {
            self.listeners.remove(event_type);
        }
        removed
    }

    /// Run the listeners of one phase. Handlers added or removed by a
    /// handler take effect on the next dispatch.
    pub fn dispatch_to_listeners(&mut self, event: &mut Event, capture: bool) {
        let name = event.event_type.as_str().to_string();
        let snapshot: Vec<(EventHandler, bool)> = match self.listeners.get(&name) {
            Some(list) => list
                .iter()
                .filter(|l| l.options.capture == capture)
                .map(|l| (l.handler.clone(), l.options.once))
                .collect(),
            None => return,
        };

        for (handler, once) in snapshot {
            handler(event);
            if once {
                self.remove_handler(&name, &handler);
            }
            if event.immediate_propagation_stopped {
                break;
            }
        }
    }

    pub fn has_listeners(&self, event_type: &str) -> bool {
        self.listeners.get(event_type).is_some_and(|l| !l.is_empty())
    }

    /// Total number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }
}

/// Per-node listener registry and propagation.
#[derive(Default)]
pub struct EventDispatcher {
    targets: HashMap<NodeId, EventTarget>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create event target for node.
    pub fn get_target(&mut self, node_id: NodeId) -> &mut EventTarget {
        self.targets.entry(node_id).or_insert_with(EventTarget::new)
    }

    /// Look up an existing event target.
    pub fn target(&self, node_id: NodeId) -> Option<&EventTarget> {
        self.targets.get(&node_id)
    }

    /// Dispatch event with propagation. `path` runs from the target up to
    /// the root.
    pub fn dispatch(&mut self, mut event: Event, path: &[NodeId]) -> Event {
        let Some((&target, ancestors)) = path.split_first() else {
            return event;
        };

        // (phase, node, capture listeners?) in visiting order
        let mut plan = Vec::with_capacity(path.len() * 2);
        plan.extend(ancestors.iter().rev().map(|&n| (EventPhase::Capturing, n, true)));
        plan.push((EventPhase::AtTarget, target, true));
        plan.push((EventPhase::AtTarget, target, false));
        if event.bubbles {
            plan.extend(ancestors.iter().map(|&n| (EventPhase::Bubbling, n, false)));
        }

        event.current_target = None;
        for (phase, node_id, capture) in plan {
            // a plain stop still lets the current node's other listeners run
            let same_node = event.current_target == Some(node_id);
            if event.immediate_propagation_stopped || (event.propagation_stopped && !same_node) {
                break;
            }
            event.phase = phase;
            event.current_target = Some(node_id);
            if let Some(listeners) = self.targets.get_mut(&node_id) {
                listeners.dispatch_to_listeners(&mut event, capture);
            }
        }

        event.phase = EventPhase::None;
        event
    }

    /// Remove all listeners for a node.
    pub fn remove_node(&mut self, node_id: NodeId) {
        self.targets.remove(&node_id);
    }
}
