//! Event bus for change notifications
//!
//! Uses tokio::sync::broadcast for pub/sub pattern.
//! Every successful mutation publishes an event; the `/events` SSE stream
//! forwards them to open dashboards, which refetch on the ones they show.
//! Order events carry the owning client so each stream only forwards what
//! its viewer may see (see [`EventFilter`]).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::domain::{DeliveryStatus, ProductionStatus, Role, User};

/// Toast level for user-facing notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// Event types that can be published on the bus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum BusEvent {
    // Order events
    OrderCreated {
        order_id: String,
        order_number: String,
        client_id: String,
    },
    OrderCancelled { order_id: String, client_id: String },
    ItemProductionChanged {
        order_id: String,
        client_id: String,
        item_id: String,
        status: ProductionStatus,
    },
    ItemDeliveryChanged {
        order_id: String,
        client_id: String,
        item_id: String,
        status: DeliveryStatus,
    },
    OrderDeliveryChanged {
        order_id: String,
        client_id: String,
        status: DeliveryStatus,
    },

    // Catalogue and pricing events
    ProductChanged { product_id: String },
    PriceListChanged { price_list_id: String },

    // User management
    UserChanged { user_id: String },

    /// Transient toast; scoped to one client's viewers when `client_id` is set
    Notification {
        level: NoticeLevel,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        client_id: Option<String>,
    },

    /// Outgoing backend requests currently in flight (global spinner)
    ActivityChanged { in_flight: usize },
}

impl BusEvent {
    /// Order the event refers to, if any
    pub fn order_id(&self) -> Option<&str> {
        match self {
            BusEvent::OrderCreated { order_id, .. }
            | BusEvent::OrderCancelled { order_id, .. }
            | BusEvent::ItemProductionChanged { order_id, .. }
            | BusEvent::ItemDeliveryChanged { order_id, .. }
            | BusEvent::OrderDeliveryChanged { order_id, .. } => Some(order_id),
            _ => None,
        }
    }

    /// Client owning the order (or the toast) the event refers to
    pub fn client_id(&self) -> Option<&str> {
        match self {
            BusEvent::OrderCreated { client_id, .. }
            | BusEvent::OrderCancelled { client_id, .. }
            | BusEvent::ItemProductionChanged { client_id, .. }
            | BusEvent::ItemDeliveryChanged { client_id, .. }
            | BusEvent::OrderDeliveryChanged { client_id, .. } => Some(client_id),
            BusEvent::Notification { client_id, .. } => client_id.as_deref(),
            _ => None,
        }
    }

    /// Whether dashboards listing orders should refetch
    pub fn touches_orders(&self) -> bool {
        self.order_id().is_some()
    }
}

/// Per-subscriber view of the bus
///
/// Kitchen, drivers and admins follow every order. Clients only follow their
/// own orders, distributors the orders of their clients. Price list and
/// user changes go to the roles that manage them.
#[derive(Debug, Clone)]
pub struct EventFilter {
    role: Role,
    user_id: String,
    clients: HashSet<String>,
}

impl EventFilter {
    /// `clients` lists the distributor's own clients; ignored for other roles
    pub fn new(user: &User, clients: impl IntoIterator<Item = String>) -> Self {
        Self {
            role: user.role,
            user_id: user.id.clone(),
            clients: clients.into_iter().collect(),
        }
    }

    fn follows_client(&self, client_id: &str) -> bool {
        match self.role {
            Role::Admin | Role::Chef | Role::Driver => true,
            Role::Client => client_id == self.user_id,
            Role::Distributor => self.clients.contains(client_id),
        }
    }

    pub fn allows(&self, event: &BusEvent) -> bool {
        if let Some(client_id) = event.client_id() {
            return self.follows_client(client_id);
        }
        match event {
            BusEvent::PriceListChanged { .. } | BusEvent::UserChanged { .. } => {
                matches!(self.role, Role::Admin | Role::Distributor)
            }
            _ => true,
        }
    }
}

/// Event bus handle for publishing and subscribing
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<BusEvent>,
}

impl EventBus {
    /// Create a new event bus with specified capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: BusEvent) {
        // Ignore send errors (no subscribers)
        let _ = self.sender.send(event);
    }

    pub fn notify(&self, level: NoticeLevel, message: impl Into<String>) {
        self.publish(BusEvent::Notification {
            level,
            message: message.into(),
            client_id: None,
        });
    }

    /// Toast shown only to viewers following `client_id`
    pub fn notify_client(&self, client_id: &str, level: NoticeLevel, message: impl Into<String>) {
        self.publish(BusEvent::Notification {
            level,
            message: message.into(),
            client_id: Some(client_id.to_string()),
        });
    }

    /// Subscribe to all events
    pub fn subscribe(&self) -> broadcast::Receiver<BusEvent> {
        self.sender.subscribe()
    }

    /// Get the number of current subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    /// Default capacity (256 events)
    fn default() -> Self {
        Self::new(256)
    }
}

/// Shared event bus wrapped in Arc for thread-safe sharing
pub type SharedBus = Arc<EventBus>;

/// Create a new shared event bus
pub fn create_bus() -> SharedBus {
    Arc::new(EventBus::default())
}
