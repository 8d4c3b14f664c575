//! Shared UI components for the Dioxus-based web UI.

pub mod layout;
pub mod nav;
pub mod order_card;
pub mod status;
pub mod theme;
pub mod toast;

pub use layout::Layout;
pub use nav::Nav;
pub use order_card::OrderCard;
pub use status::{DeliveryBadge, ProductionBadge, ProgressSummary};
pub use theme::ThemeSwitcher;
pub use toast::{with_flash, ErrorAlert, Flash, Toasts};
