//! Production and delivery status enums.
//!
//! Both are flat label lookups with a small transition table. The backend is
//! the authority on transitions; the UI uses the same table to decide which
//! action buttons to show, and the demo backend uses it to reject invalid
//! updates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Visual tone of a status badge (maps to a CSS class)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Neutral,
    Info,
    Success,
    Warning,
    Danger,
}

impl Tone {
    pub fn css_class(self) -> &'static str {
        match self {
            Tone::Neutral => "badge badge-neutral",
            Tone::Info => "badge badge-info",
            Tone::Success => "badge badge-success",
            Tone::Warning => "badge badge-warning",
            Tone::Danger => "badge badge-danger",
        }
    }
}

/// Label/tone pair rendered for a status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusBadge {
    pub label: &'static str,
    pub tone: Tone,
}

/// Kitchen fulfillment state of an order item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductionStatus {
    #[default]
    Pending,
    /// Older API versions send `PARTIAL`
    #[serde(alias = "PARTIAL")]
    PartiallyCompleted,
    Completed,
    Cancelled,
}

impl ProductionStatus {
    pub const ALL: [ProductionStatus; 4] = [
        ProductionStatus::Pending,
        ProductionStatus::PartiallyCompleted,
        ProductionStatus::Completed,
        ProductionStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProductionStatus::Pending => "PENDING",
            ProductionStatus::PartiallyCompleted => "PARTIALLY_COMPLETED",
            ProductionStatus::Completed => "COMPLETED",
            ProductionStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn badge(self) -> StatusBadge {
        match self {
            ProductionStatus::Pending => StatusBadge {
                label: "Pending",
                tone: Tone::Neutral,
            },
            ProductionStatus::PartiallyCompleted => StatusBadge {
                label: "Partial",
                tone: Tone::Warning,
            },
            ProductionStatus::Completed => StatusBadge {
                label: "Completed",
                tone: Tone::Success,
            },
            ProductionStatus::Cancelled => StatusBadge {
                label: "Cancelled",
                tone: Tone::Danger,
            },
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ProductionStatus::Completed | ProductionStatus::Cancelled
        )
    }

    /// Whether the kitchen may move an item from `self` to `next`
    pub fn can_transition_to(self, next: ProductionStatus) -> bool {
        use ProductionStatus::*;
        matches!(
            (self, next),
            (Pending, Completed)
                | (Pending, PartiallyCompleted)
                | (Pending, Cancelled)
                | (PartiallyCompleted, Completed)
                | (PartiallyCompleted, Cancelled)
        )
    }
}

impl fmt::Display for ProductionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductionStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(ProductionStatus::Pending),
            "PARTIAL" | "PARTIALLY_COMPLETED" => Ok(ProductionStatus::PartiallyCompleted),
            "COMPLETED" => Ok(ProductionStatus::Completed),
            "CANCELLED" | "FAILED" => Ok(ProductionStatus::Cancelled),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

/// Dispatch fulfillment state of an order or order item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    #[default]
    Pending,
    ReadyForDelivery,
    Delivered,
    PartiallyDelivered,
    Failed,
    Cancelled,
}

impl DeliveryStatus {
    pub const ALL: [DeliveryStatus; 6] = [
        DeliveryStatus::Pending,
        DeliveryStatus::ReadyForDelivery,
        DeliveryStatus::Delivered,
        DeliveryStatus::PartiallyDelivered,
        DeliveryStatus::Failed,
        DeliveryStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "PENDING",
            DeliveryStatus::ReadyForDelivery => "READY_FOR_DELIVERY",
            DeliveryStatus::Delivered => "DELIVERED",
            DeliveryStatus::PartiallyDelivered => "PARTIALLY_DELIVERED",
            DeliveryStatus::Failed => "FAILED",
            DeliveryStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn badge(self) -> StatusBadge {
        match self {
            DeliveryStatus::Pending => StatusBadge {
                label: "Awaiting production",
                tone: Tone::Neutral,
            },
            DeliveryStatus::ReadyForDelivery => StatusBadge {
                label: "Ready for delivery",
                tone: Tone::Info,
            },
            DeliveryStatus::Delivered => StatusBadge {
                label: "Delivered",
                tone: Tone::Success,
            },
            DeliveryStatus::PartiallyDelivered => StatusBadge {
                label: "Partially delivered",
                tone: Tone::Warning,
            },
            DeliveryStatus::Failed => StatusBadge {
                label: "Failed",
                tone: Tone::Danger,
            },
            DeliveryStatus::Cancelled => StatusBadge {
                label: "Cancelled",
                tone: Tone::Danger,
            },
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            DeliveryStatus::Delivered
                | DeliveryStatus::PartiallyDelivered
                | DeliveryStatus::Cancelled
        )
    }

    /// Whether dispatch may move from `self` to `next`.
    /// FAILED may go back to READY_FOR_DELIVERY for a second attempt.
    pub fn can_transition_to(self, next: DeliveryStatus) -> bool {
        use DeliveryStatus::*;
        matches!(
            (self, next),
            (Pending, ReadyForDelivery)
                | (Pending, Cancelled)
                | (ReadyForDelivery, Delivered)
                | (ReadyForDelivery, PartiallyDelivered)
                | (ReadyForDelivery, Failed)
                | (ReadyForDelivery, Cancelled)
                | (Failed, ReadyForDelivery)
        )
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(DeliveryStatus::Pending),
            "READY_FOR_DELIVERY" | "READY" => Ok(DeliveryStatus::ReadyForDelivery),
            "DELIVERED" => Ok(DeliveryStatus::Delivered),
            "PARTIALLY_DELIVERED" | "PARTIAL" => Ok(DeliveryStatus::PartiallyDelivered),
            "FAILED" => Ok(DeliveryStatus::Failed),
            "CANCELLED" => Ok(DeliveryStatus::Cancelled),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value: {0}")]
pub struct UnknownVariant(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_production_moves_to_any_outcome() {
        let from = ProductionStatus::Pending;
        assert!(from.can_transition_to(ProductionStatus::Completed));
        assert!(from.can_transition_to(ProductionStatus::PartiallyCompleted));
        assert!(from.can_transition_to(ProductionStatus::Cancelled));
        assert!(!from.can_transition_to(ProductionStatus::Pending));
    }

    #[test]
    fn terminal_production_states_have_no_exits() {
        for from in [ProductionStatus::Completed, ProductionStatus::Cancelled] {
            assert!(from.is_terminal());
            for next in ProductionStatus::ALL {
                assert!(!from.can_transition_to(next), "{from} -> {next}");
            }
        }
    }

    #[test]
    fn failed_delivery_can_be_redispatched() {
        assert!(DeliveryStatus::Failed.can_transition_to(DeliveryStatus::ReadyForDelivery));
        assert!(!DeliveryStatus::Failed.can_transition_to(DeliveryStatus::Delivered));
        assert!(!DeliveryStatus::Failed.is_terminal());
    }

    #[test]
    fn legacy_partial_spelling_deserializes() {
        let s: ProductionStatus = serde_json::from_str("\"PARTIAL\"").unwrap();
        assert_eq!(s, ProductionStatus::PartiallyCompleted);
        assert_eq!(
            serde_json::to_string(&s).unwrap(),
            "\"PARTIALLY_COMPLETED\""
        );
    }

    #[test]
    fn form_values_parse_case_insensitively() {
        assert_eq!(
            "completed".parse::<ProductionStatus>(),
            Ok(ProductionStatus::Completed)
        );
        assert_eq!(
            "ready_for_delivery".parse::<DeliveryStatus>(),
            Ok(DeliveryStatus::ReadyForDelivery)
        );
        assert!("shipped".parse::<DeliveryStatus>().is_err());
    }
}
