//! REST backend seam.
//!
//! Every dashboard reads and writes through the [`Backend`] trait:
//! - [`HttpBackend`] talks to the real REST API
//! - [`DemoBackend`] serves generated data from memory (demo mode)
//!
//! Page handlers never talk HTTP themselves. Calls are wrapped by
//! [`crate::activity::TrackedBackend`] so the global spinner sees them.

pub mod demo;
pub mod http;

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{
    AnalyticsQuery, AnalyticsReport, DeliveryStatus, DeliveryUpdate, NewOrder, NewPriceList,
    NewUser, Order, OrderQuery, PriceList, PriceListItem, Product, ProductionUpdate, Role,
    Session, User,
};

pub use demo::DemoBackend;
pub use http::HttpBackend;

/// How an error should reach the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Full-page blocking error view
    Critical,
    /// Transient toast, the page stays usable
    Notification,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackendError {
    #[error("Your session has expired, please sign in again")]
    Unauthorized,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    /// Backend refused the request; `message` is shown verbatim
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("{0}")]
    InvalidTransition(String),
    #[error("Backend unreachable: {0}")]
    Transport(String),
    #[error("Unexpected backend response: {0}")]
    Decode(String),
}

impl BackendError {
    pub fn severity(&self) -> Severity {
        match self {
            BackendError::Transport(_) | BackendError::Decode(_) => Severity::Critical,
            _ => Severity::Notification,
        }
    }

    /// HTTP status to answer with when this error ends a browser request
    pub fn status_code(&self) -> u16 {
        match self {
            BackendError::Unauthorized => 401,
            BackendError::Forbidden(_) => 403,
            BackendError::NotFound(_) => 404,
            BackendError::Rejected { status, .. } => *status,
            BackendError::InvalidTransition(_) => 409,
            BackendError::Transport(_) => 502,
            BackendError::Decode(_) => 502,
        }
    }

    pub fn forbidden_for(role: Role) -> Self {
        BackendError::Forbidden(format!("Not available for {} accounts", role.label()))
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Operations of the catering REST API.
///
/// `token` is the bearer token of the acting user; the backend scopes
/// results by that user's role (a chef only sees orders with items of
/// their group, a client only their own orders, and so on).
#[async_trait]
pub trait Backend: Send + Sync {
    // Auth
    async fn login(&self, email: &str, password: &str) -> BackendResult<Session>;
    async fn current_user(&self, token: &str) -> BackendResult<User>;

    // Orders
    async fn list_orders(&self, token: &str, query: &OrderQuery) -> BackendResult<Vec<Order>>;
    async fn get_order(&self, token: &str, order_id: &str) -> BackendResult<Order>;
    async fn create_order(&self, token: &str, order: &NewOrder) -> BackendResult<Order>;
    async fn cancel_order(&self, token: &str, order_id: &str) -> BackendResult<Order>;
    async fn update_item_production(
        &self,
        token: &str,
        order_id: &str,
        item_id: &str,
        update: &ProductionUpdate,
    ) -> BackendResult<Order>;
    async fn update_item_delivery(
        &self,
        token: &str,
        order_id: &str,
        item_id: &str,
        status: DeliveryStatus,
    ) -> BackendResult<Order>;
    async fn update_order_delivery(
        &self,
        token: &str,
        order_id: &str,
        update: &DeliveryUpdate,
    ) -> BackendResult<Order>;

    // Catalogue
    async fn list_products(&self, token: &str) -> BackendResult<Vec<Product>>;
    async fn set_product_active(
        &self,
        token: &str,
        product_id: &str,
        active: bool,
    ) -> BackendResult<Product>;

    // Pricing
    async fn list_price_lists(&self, token: &str) -> BackendResult<Vec<PriceList>>;
    async fn get_price_list(&self, token: &str, price_list_id: &str) -> BackendResult<PriceList>;
    async fn create_price_list(&self, token: &str, list: &NewPriceList)
        -> BackendResult<PriceList>;
    async fn upsert_price_list_item(
        &self,
        token: &str,
        price_list_id: &str,
        item: &PriceListItem,
    ) -> BackendResult<PriceList>;
    async fn remove_price_list_item(
        &self,
        token: &str,
        price_list_id: &str,
        option_item_id: &str,
    ) -> BackendResult<PriceList>;
    async fn assign_price_list(
        &self,
        token: &str,
        price_list_id: &str,
        user_id: &str,
    ) -> BackendResult<PriceList>;

    // Users
    async fn list_users(&self, token: &str, role: Option<Role>) -> BackendResult<Vec<User>>;
    async fn create_user(&self, token: &str, user: &NewUser) -> BackendResult<User>;
    async fn set_user_active(&self, token: &str, user_id: &str, active: bool)
        -> BackendResult<User>;

    // Analytics
    async fn analytics(&self, token: &str, query: &AnalyticsQuery)
        -> BackendResult<AnalyticsReport>;
}

pub type SharedBackend = Arc<dyn Backend>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_are_critical() {
        assert_eq!(
            BackendError::Transport("connection refused".into()).severity(),
            Severity::Critical
        );
        assert_eq!(
            BackendError::Rejected {
                status: 422,
                message: "Quantity exceeds order".into()
            }
            .severity(),
            Severity::Notification
        );
    }

    #[test]
    fn rejected_message_is_shown_verbatim() {
        let err = BackendError::Rejected {
            status: 400,
            message: "Delivery date must be in the future".into(),
        };
        assert_eq!(err.to_string(), "Delivery date must be in the future");
        assert_eq!(err.status_code(), 400);
    }
}
