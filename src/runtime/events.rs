/*!
 * Event Bus
 * Shared event targets (document, window, rendered elements) and listener dispatch
 */

use crate::core::errors::EventError;
use crate::core::types::{ListenerId, NodeId};
use crate::core::InlineString;
use ahash::RandomState;
use dashmap::DashMap;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Where a listener is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenerTarget {
    /// The shared document
    Document,
    /// The shared global namespace
    Window,
    /// An element inside some application's rendered subtree
    Element(NodeId),
}

impl ListenerTarget {
    /// Document and window are system-wide; elements are app-private
    #[inline]
    pub fn is_global(&self) -> bool {
        matches!(self, ListenerTarget::Document | ListenerTarget::Window)
    }

    /// Targets visited by a bubbling dispatch starting here
    fn propagation_path(&self) -> Vec<ListenerTarget> {
        match self {
            ListenerTarget::Element(_) => {
                vec![*self, ListenerTarget::Document, ListenerTarget::Window]
            }
            ListenerTarget::Document => vec![ListenerTarget::Document, ListenerTarget::Window],
            ListenerTarget::Window => vec![ListenerTarget::Window],
        }
    }
}

impl fmt::Display for ListenerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListenerTarget::Document => write!(f, "document"),
            ListenerTarget::Window => write!(f, "window"),
            ListenerTarget::Element(id) => write!(f, "element#{}", id),
        }
    }
}

/// Listener registration options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerOptions {
    pub capture: bool,
    pub once: bool,
    pub passive: bool,
}

impl ListenerOptions {
    pub fn capture() -> Self {
        Self {
            capture: true,
            ..Self::default()
        }
    }

    pub fn once() -> Self {
        Self {
            once: true,
            ..Self::default()
        }
    }
}

/// Physical key press as reported by the input layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInput {
    pub key: String,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl KeyInput {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Self::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }
}

/// Event in flight
///
/// Flags use interior mutability so listeners observe one another's
/// `prevent_default` / `stop_propagation` calls during a dispatch.
#[derive(Debug)]
pub struct DomEvent {
    event_type: InlineString,
    target: ListenerTarget,
    key: Option<KeyInput>,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
    in_passive_listener: Cell<bool>,
}

impl DomEvent {
    pub fn new(event_type: &str, target: ListenerTarget) -> Self {
        Self {
            event_type: event_type.into(),
            target,
            key: None,
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
            in_passive_listener: Cell::new(false),
        }
    }

    /// Keydown event delivered to the document
    pub fn keydown(key: KeyInput) -> Self {
        let mut event = Self::new("keydown", ListenerTarget::Document);
        event.key = Some(key);
        event
    }

    pub fn event_type(&self) -> &str {
        self.event_type.as_str()
    }

    pub fn target(&self) -> ListenerTarget {
        self.target
    }

    pub fn key(&self) -> Option<&KeyInput> {
        self.key.as_ref()
    }

    /// Suppress the default action. Ignored inside passive listeners.
    pub fn prevent_default(&self) {
        if !self.in_passive_listener.get() {
            self.default_prevented.set(true);
        }
    }

    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}

/// Listener callback
pub type EventHandler = Arc<dyn Fn(&DomEvent) + Send + Sync>;

#[derive(Clone)]
struct ListenerEntry {
    id: ListenerId,
    event_type: InlineString,
    options: ListenerOptions,
    handler: EventHandler,
}

/// Shared event bus
#[derive(Clone)]
pub struct EventBus {
    targets: Arc<DashMap<ListenerTarget, Vec<ListenerEntry>, RandomState>>,
    next_id: Arc<AtomicU64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            targets: Arc::new(DashMap::with_hasher(RandomState::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Attach a listener, returning its handle
    pub fn add_listener(
        &self,
        target: ListenerTarget,
        event_type: &str,
        handler: EventHandler,
        options: ListenerOptions,
    ) -> Result<ListenerId, EventError> {
        if event_type.is_empty() {
            return Err(EventError::InvalidEventType(event_type.into()));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.targets.entry(target).or_default().push(ListenerEntry {
            id,
            event_type: event_type.into(),
            options,
            handler,
        });
        debug!("Listener {} added on {} for '{}'", id, target, event_type);
        Ok(id)
    }

    /// Detach a listener. Type and capture flag must match the registration.
    pub fn remove_listener(
        &self,
        target: ListenerTarget,
        event_type: &str,
        id: ListenerId,
        options: ListenerOptions,
    ) -> Result<(), EventError> {
        let not_found = || EventError::ListenerNotFound {
            target: target.to_string().into(),
            event_type: event_type.into(),
            id,
        };

        let mut entries = self.targets.get_mut(&target).ok_or_else(not_found)?;
        let position = entries
            .iter()
            .position(|e| {
                e.id == id
                    && e.event_type.as_str() == event_type
                    && e.options.capture == options.capture
            })
            .ok_or_else(not_found)?;
        entries.remove(position);
        debug!("Listener {} removed from {}", id, target);
        Ok(())
    }

    pub fn has_listener(&self, target: ListenerTarget, id: ListenerId) -> bool {
        self.targets
            .get(&target)
            .map_or(false, |entries| entries.iter().any(|e| e.id == id))
    }

    pub fn listener_count(&self, target: ListenerTarget) -> usize {
        self.targets.get(&target).map_or(0, |entries| entries.len())
    }

    /// Listeners attached to the document and window
    pub fn global_listener_count(&self) -> usize {
        self.listener_count(ListenerTarget::Document) + self.listener_count(ListenerTarget::Window)
    }

    /// Deliver an event along its propagation path. Returns listeners invoked.
    pub fn dispatch(&self, event: &DomEvent) -> usize {
        let mut invoked = 0;

        for target in event.target().propagation_path() {
            for entry in self.take_matching(target, event.event_type()) {
                event.in_passive_listener.set(entry.options.passive);
                let outcome = catch_unwind(AssertUnwindSafe(|| (entry.handler)(event)));
                event.in_passive_listener.set(false);
                if outcome.is_err() {
                    error!(
                        "Listener {} on {} panicked while handling '{}'",
                        entry.id,
                        target,
                        event.event_type()
                    );
                }
                invoked += 1;
            }

            if event.propagation_stopped() {
                break;
            }
        }

        invoked
    }

    /// Snapshot matching listeners, dropping `once` entries before they run
    fn take_matching(&self, target: ListenerTarget, event_type: &str) -> Vec<ListenerEntry> {
        let Some(mut entries) = self.targets.get_mut(&target) else {
            return Vec::new();
        };
        let matching: Vec<ListenerEntry> = entries
            .iter()
            .filter(|e| e.event_type.as_str() == event_type)
            .cloned()
            .collect();
        entries.retain(|e| !(e.options.once && e.event_type.as_str() == event_type));
        matching
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
