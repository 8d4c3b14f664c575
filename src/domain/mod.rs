//! Business entities shared by every dashboard.
//!
//! These mirror the JSON shapes of the REST backend. Business rules live
//! on the backend; the helpers here reflect them for rendering (which
//! buttons to show, which badge to draw) and back the demo backend.

pub mod analytics;
pub mod order;
pub mod pricing;
pub mod status;
pub mod user;

use regex::Regex;
use std::sync::LazyLock;

pub use analytics::{AnalyticsQuery, AnalyticsReport, AnalyticsSummary, CustomerKpi, RevenueByGroup};
pub use order::{
    ClientRef, DeliveryUpdate, NewOrder, NewOrderLine, Order, OrderItem, OrderQuery,
    ProductionUpdate, Progress,
};
pub use pricing::{
    NewPriceList, OptionItem, PriceList, PriceListItem, PriceRule, Product, ProductOption,
};
pub use status::{DeliveryStatus, ProductionStatus, StatusBadge, Tone};
pub use user::{NewUser, Role, Session, User};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid")
});

/// Cheap sanity check before a user form is forwarded to the backend
pub fn is_plausible_email(s: &str) -> bool {
    EMAIL_RE.is_match(s.trim())
}
