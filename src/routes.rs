//! Router assembly
//!
//! One `.route` line per method so the route set can be compared against
//! `tests/fixtures/api_routes.txt`.

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::api::{self, AppState};
use crate::ui::{self, actions};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/status", get(api::status_handler))
        // Event stream (SSE)
        .route("/events", get(api::events_handler))
        // JSON API
        .route("/api/auth/login", post(api::users::login_handler))
        .route("/api/auth/logout", post(api::users::logout_handler))
        .route("/api/me", get(api::users::me_handler))
        .route("/api/orders", get(api::orders::list_orders_handler))
        .route("/api/orders", post(api::orders::create_order_handler))
        .route("/api/orders/{order_id}", get(api::orders::get_order_handler))
        .route(
            "/api/orders/{order_id}/cancel",
            post(api::orders::cancel_order_handler),
        )
        .route(
            "/api/orders/{order_id}/items/{item_id}/production",
            patch(api::orders::item_production_handler),
        )
        .route(
            "/api/orders/{order_id}/items/{item_id}/delivery",
            patch(api::orders::item_delivery_handler),
        )
        .route(
            "/api/orders/{order_id}/delivery",
            patch(api::orders::order_delivery_handler),
        )
        .route("/api/products", get(api::catalog::products_handler))
        .route(
            "/api/products/{product_id}",
            patch(api::catalog::product_update_handler),
        )
        .route("/api/price-lists", get(api::catalog::price_lists_handler))
        .route(
            "/api/price-lists",
            post(api::catalog::create_price_list_handler),
        )
        .route(
            "/api/price-lists/{price_list_id}",
            get(api::catalog::price_list_handler),
        )
        .route(
            "/api/price-lists/{price_list_id}/items/{option_item_id}",
            put(api::catalog::upsert_price_list_item_handler),
        )
        .route(
            "/api/price-lists/{price_list_id}/items/{option_item_id}",
            delete(api::catalog::remove_price_list_item_handler),
        )
        .route(
            "/api/price-lists/{price_list_id}/assign",
            post(api::catalog::assign_price_list_handler),
        )
        .route("/api/users", get(api::users::users_handler))
        .route("/api/users", post(api::users::create_user_handler))
        .route("/api/users/{user_id}", patch(api::users::user_update_handler))
        .route("/api/analytics", get(api::users::analytics_handler))
        // Session
        .route("/", get(ui::root_page))
        .route("/login", get(ui::login_page))
        .route("/login", post(actions::login_action))
        .route("/logout", post(actions::logout_action))
        // Role dashboards
        .route("/admin", get(ui::admin_page))
        .route("/chef", get(ui::chef_page))
        .route("/driver", get(ui::driver_page))
        .route("/client", get(ui::client_page))
        .route("/distributor", get(ui::distributor_page))
        .route("/analytics", get(ui::analytics_page))
        // Orders
        .route("/orders", get(ui::orders_page))
        .route("/orders", post(actions::create_order_action))
        .route("/orders/new", get(ui::new_order_page))
        .route("/orders/{order_id}", get(ui::order_detail_page))
        .route("/orders/{order_id}/cancel", post(actions::cancel_order_action))
        .route(
            "/orders/{order_id}/items/{item_id}/production",
            post(actions::item_production_action),
        )
        .route(
            "/orders/{order_id}/items/{item_id}/delivery",
            post(actions::item_delivery_action),
        )
        .route(
            "/orders/{order_id}/delivery",
            post(actions::order_delivery_action),
        )
        // Catalogue and pricing
        .route("/products", get(ui::products_page))
        .route(
            "/products/{product_id}/active",
            post(actions::product_active_action),
        )
        .route("/price-lists", get(ui::price_lists_page))
        .route("/price-lists", post(actions::create_price_list_action))
        .route("/price-lists/{price_list_id}", get(ui::price_list_page))
        .route(
            "/price-lists/{price_list_id}/items",
            post(actions::upsert_price_item_action),
        )
        .route(
            "/price-lists/{price_list_id}/items/{option_item_id}/remove",
            post(actions::remove_price_item_action),
        )
        .route(
            "/price-lists/{price_list_id}/assign",
            post(actions::assign_price_list_action),
        )
        // Users
        .route("/users", get(ui::users_page))
        .route("/users", post(actions::create_user_action))
        .route("/users/{user_id}/active", post(actions::user_active_action))
        .route(
            "/users/{user_id}/price-list",
            post(actions::user_price_list_action),
        )
        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
