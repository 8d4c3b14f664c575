//! Page components for the Dioxus-based web UI.
//!
//! Each page is a Dioxus component that renders a full page using the Layout component.

pub mod admin;
pub mod analytics;
pub mod chef;
pub mod client;
pub mod distributor;
pub mod driver;
pub mod error;
pub mod login;
pub mod orders;
pub mod price_lists;
pub mod products;
pub mod users;

pub use admin::AdminOverviewPage;
pub use analytics::AnalyticsPage;
pub use chef::ChefBoardPage;
pub use client::ClientOrdersPage;
pub use distributor::DistributorPage;
pub use driver::DriverPage;
pub use error::ErrorPage;
pub use login::LoginPage;
pub use orders::{NewOrderPage, OrderDetailPage, OrderFilters, OrdersPage};
pub use price_lists::{PriceListPage, PriceListsPage};
pub use products::ProductsPage;
pub use users::UsersPage;
