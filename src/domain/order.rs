//! Orders and order items as returned by the backend.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::status::{DeliveryStatus, ProductionStatus};
use super::user::Role;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    /// Option item chosen for the product (e.g. "Large tray"), if any
    #[serde(default)]
    pub option_item_id: Option<String>,
    #[serde(default)]
    pub option_label: Option<String>,
    pub product_group: String,
    pub quantity: u32,
    #[serde(default)]
    pub produced_quantity: u32,
    pub unit_price: Decimal,
    #[serde(default)]
    pub production_status: ProductionStatus,
    #[serde(default)]
    pub delivery_status: DeliveryStatus,
}

impl OrderItem {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }

    pub fn is_cancelled(&self) -> bool {
        self.production_status == ProductionStatus::Cancelled
    }

    /// Production actions the kitchen may still take on this item
    pub fn production_actions(&self) -> Vec<ProductionStatus> {
        [
            ProductionStatus::Completed,
            ProductionStatus::PartiallyCompleted,
            ProductionStatus::Cancelled,
        ]
        .into_iter()
        .filter(|next| self.production_status.can_transition_to(*next))
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub order_number: String,
    pub client: ClientRef,
    pub delivery_date: NaiveDate,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub production_status: ProductionStatus,
    #[serde(default)]
    pub delivery_status: DeliveryStatus,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Completed/pending counts for a set of items
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub partial: usize,
    pub pending: usize,
    pub cancelled: usize,
}

impl Progress {
    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a OrderItem>) -> Self {
        let mut progress = Progress::default();
        for item in items {
            match item.production_status {
                ProductionStatus::Completed => progress.completed += 1,
                ProductionStatus::PartiallyCompleted => progress.partial += 1,
                ProductionStatus::Pending => progress.pending += 1,
                ProductionStatus::Cancelled => progress.cancelled += 1,
            }
        }
        progress
    }

    /// Items that still count towards the order (everything except cancelled)
    pub fn active(&self) -> usize {
        self.completed + self.partial + self.pending
    }

    pub fn is_done(&self) -> bool {
        self.pending == 0 && self.partial == 0
    }
}

/// Order-level production status derived from its items
pub fn derive_production_status(items: &[OrderItem]) -> ProductionStatus {
    if items.is_empty() {
        return ProductionStatus::Pending;
    }
    let progress = Progress::from_items(items);
    if progress.active() == 0 {
        ProductionStatus::Cancelled
    } else if progress.completed == progress.active() {
        ProductionStatus::Completed
    } else if progress.completed > 0 || progress.partial > 0 {
        ProductionStatus::PartiallyCompleted
    } else {
        ProductionStatus::Pending
    }
}

impl Order {
    pub fn progress(&self) -> Progress {
        Progress::from_items(&self.items)
    }

    /// Items belonging to one product group (a chef's station)
    pub fn items_for_group<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a OrderItem> {
        self.items
            .iter()
            .filter(move |item| item.product_group.eq_ignore_ascii_case(group))
    }

    pub fn has_group(&self, group: &str) -> bool {
        self.items_for_group(group).next().is_some()
    }

    pub fn derived_production_status(&self) -> ProductionStatus {
        derive_production_status(&self.items)
    }

    /// An order with every item cancelled is cancelled, whatever the header says
    pub fn is_cancelled(&self) -> bool {
        (!self.items.is_empty() && self.items.iter().all(OrderItem::is_cancelled))
            || self.production_status == ProductionStatus::Cancelled
            || self.delivery_status == DeliveryStatus::Cancelled
    }

    /// Status shown on the order card header
    pub fn display_production_status(&self) -> ProductionStatus {
        if self.is_cancelled() {
            ProductionStatus::Cancelled
        } else {
            self.derived_production_status()
        }
    }

    /// Dispatch actions a driver may take on the whole order
    pub fn delivery_actions(&self) -> Vec<DeliveryStatus> {
        if self.is_cancelled() {
            return Vec::new();
        }
        [
            DeliveryStatus::ReadyForDelivery,
            DeliveryStatus::Delivered,
            DeliveryStatus::PartiallyDelivered,
            DeliveryStatus::Failed,
        ]
        .into_iter()
        .filter(|next| self.delivery_status.can_transition_to(*next))
        .collect()
    }

    /// Clients may cancel orders the kitchen has not touched yet
    pub fn is_cancellable(&self) -> bool {
        !self.is_cancelled()
            && self
                .items
                .iter()
                .all(|item| item.production_status == ProductionStatus::Pending)
            && self.delivery_status == DeliveryStatus::Pending
    }

    /// Whether `role` may cancel the order.
    ///
    /// Clients only cancel untouched orders. Admins may cancel later too, as
    /// long as every live item and the dispatch state can still move to
    /// CANCELLED: a completed item or a failed delivery blocks it.
    pub fn can_be_cancelled_by(&self, role: Role) -> bool {
        match role {
            Role::Client => self.is_cancellable(),
            Role::Admin => {
                !self.is_cancelled()
                    && self.delivery_status.can_transition_to(DeliveryStatus::Cancelled)
                    && self.items.iter().all(|item| {
                        item.is_cancelled()
                            || item.production_status.can_transition_to(ProductionStatus::Cancelled)
                    })
            }
            _ => false,
        }
    }

    pub fn recompute_total(&self) -> Decimal {
        self.items
            .iter()
            .filter(|item| !item.is_cancelled())
            .map(OrderItem::line_total)
            .sum()
    }
}

/// One requested line of a new order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderLine {
    pub product_id: String,
    #[serde(default)]
    pub option_item_id: Option<String>,
    pub quantity: u32,
}

/// Order intake payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    /// Required when an admin or distributor orders on behalf of a client
    #[serde(default)]
    pub client_id: Option<String>,
    pub delivery_date: NaiveDate,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub lines: Vec<NewOrderLine>,
}

/// Filters for order listings (all optional, combined with AND)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_status: Option<ProductionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_status: Option<DeliveryStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl OrderQuery {
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(status) = self.production_status {
            if order.display_production_status() != status {
                return false;
            }
        }
        if let Some(status) = self.delivery_status {
            if order.delivery_status != status {
                return false;
            }
        }
        if let Some(date) = self.delivery_date {
            if order.delivery_date != date {
                return false;
            }
        }
        if let Some(ref client_id) = self.client_id {
            if &order.client.id != client_id {
                return false;
            }
        }
        if let Some(ref group) = self.product_group {
            if !order.has_group(group) {
                return false;
            }
        }
        if let Some(ref search) = self.search {
            let needle = search.trim().to_lowercase();
            if !needle.is_empty()
                && !order.order_number.to_lowercase().contains(&needle)
                && !order.client.name.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }
}

/// Production update sent by a chef
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionUpdate {
    pub status: ProductionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub produced_quantity: Option<u32>,
}

/// Delivery update sent by a driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryUpdate {
    pub status: DeliveryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
