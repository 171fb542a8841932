//! Change notifications emitted by the graph.
//!
//! Listeners are plain callbacks that receive a [`GraphEvent`] by reference.
//! They never get a handle to the graph, so a handler cannot re-enter a
//! mutation that is still in progress. Events are delivered synchronously,
//! in subscription order, before the mutating call returns.

use crate::domain::{EdgeId, NodeId};
use std::fmt;

/// A structural or display-state change in the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphEvent {
    /// A node was inserted.
    NodeAdded {
        /// The new node
        id: NodeId,
        /// The id was generated by the engine rather than supplied
        is_new: bool,
    },

    /// A node (and all its edges) was removed.
    NodeRemoved {
        /// The removed node
        id: NodeId,
    },

    /// An edge was inserted.
    EdgeAdded {
        /// The new edge
        id: EdgeId,
        /// The id was generated (a new edge) rather than re-synced from data
        is_new: bool,
    },

    /// An edge was removed.
    EdgeRemoved {
        /// The removed edge
        id: EdgeId,
    },

    /// The focus node changed.
    FocusNodeChanged {
        /// The node that now has focus
        id: NodeId,
    },

    /// A node's scope was toggled on or off.
    NodeScopeToggled {
        /// The toggled node
        id: NodeId,
        /// Whether the node is now the scope node
        scoped: bool,
    },
}

impl GraphEvent {
    /// Stable event name, for consumers that dispatch on strings.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::NodeAdded { .. } => "node_added",
            Self::NodeRemoved { .. } => "node_removed",
            Self::EdgeAdded { .. } => "edge_added",
            Self::EdgeRemoved { .. } => "edge_removed",
            Self::FocusNodeChanged { .. } => "focus_node_changed",
            Self::NodeScopeToggled { .. } => "node_scope_toggled",
        }
    }

    /// Id of the affected entity.
    #[must_use]
    pub fn entity_id(&self) -> &str {
        match self {
            Self::NodeAdded { id, .. }
            | Self::NodeRemoved { id }
            | Self::FocusNodeChanged { id }
            | Self::NodeScopeToggled { id, .. } => id.as_str(),
            Self::EdgeAdded { id, .. } | Self::EdgeRemoved { id } => id.as_str(),
        }
    }
}

/// Callback invoked for every emitted event.
pub type Listener = Box<dyn FnMut(&GraphEvent)>;

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Ordered set of listeners.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(ListenerId, Listener)>,
    next_id: u64,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listener_count", &self.listeners.len())
            .finish()
    }
}

impl EventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener.
    pub fn subscribe(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// True if no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver `event` to every listener, in subscription order.
    pub fn emit(&mut self, event: &GraphEvent) {
        tracing::trace!(event = event.name(), id = event.entity_id(), "emit");
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }
}
