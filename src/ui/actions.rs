//! Form actions posted by the dashboards.
//!
//! Each handler relays one mutation to the backend, publishes it on the
//! bus and redirects back (`return_to`) with a flash message, so the page
//! refetches. Rejected mutations come back as an error toast with the
//! backend's message verbatim; an unreachable backend ends on the error
//! page and an expired session on the login page.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{info, warn};

use super::components::with_flash;
use super::pages::orders::ORDER_LINES;
use super::PageError;
use crate::api::catalog::{announce_price_list, announce_product};
use crate::api::orders::{
    announce_cancelled, announce_created, announce_delivery, announce_item_delivery,
    announce_production,
};
use crate::api::users::announce_user;
use crate::api::AppState;
use crate::backend::{BackendError, BackendResult, Severity};
use crate::bus::{BusEvent, NoticeLevel};
use crate::domain::{
    DeliveryStatus, DeliveryUpdate, NewOrder, NewOrderLine, NewPriceList, NewUser,
    PriceListItem, PriceRule, ProductionStatus, ProductionUpdate, Role,
};
use crate::session::{clear_session_cookie, session_cookie, Viewer};

/// Same-site path to return to, or `fallback`
pub fn safe_return(return_to: Option<&str>, fallback: &str) -> String {
    match return_to.map(str::trim) {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path.to_string(),
        _ => fallback.to_string(),
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Redirect back with an error toast
fn rejected(return_to: &str, message: &str) -> Response {
    Redirect::to(&with_flash(return_to, NoticeLevel::Error, message)).into_response()
}

/// Finish an action: success toast, error toast, or a full-page failure
fn respond<T>(
    result: BackendResult<T>,
    return_to: &str,
    on_success: impl FnOnce(&T) -> String,
) -> Response {
    match result {
        Ok(value) => {
            let message = on_success(&value);
            Redirect::to(&with_flash(return_to, NoticeLevel::Success, &message)).into_response()
        }
        Err(e) if e == BackendError::Unauthorized || e.severity() == Severity::Critical => {
            PageError(e).into_response()
        }
        Err(e) => {
            warn!("Action rejected: {}", e);
            rejected(return_to, &e.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReturnForm {
    #[serde(default)]
    pub return_to: Option<String>,
}

// =============================================================================
// Session
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// POST /login
pub async fn login_action(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    match state.backend.login(form.email.trim(), &form.password).await {
        Ok(session) => {
            info!("{} signed in as {}", session.user.email, session.user.role);
            (
                [(header::SET_COOKIE, session_cookie(&session.token))],
                Redirect::to(session.user.role.home_path()),
            )
                .into_response()
        }
        Err(e) if e.severity() == Severity::Critical => PageError(e).into_response(),
        Err(e) => {
            let message = match e {
                BackendError::Unauthorized => "Invalid email or password".to_string(),
                other => other.to_string(),
            };
            let target = format!(
                "/login?error={}&email={}",
                urlencoding::encode(&message),
                urlencoding::encode(form.email.trim())
            );
            Redirect::to(&target).into_response()
        }
    }
}

/// POST /logout
pub async fn logout_action() -> Response {
    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Redirect::to("/login"),
    )
        .into_response()
}

// =============================================================================
// Orders
// =============================================================================

/// Order form fields: `line_N` is `product_id` or `product_id:option_item_id`,
/// `qty_N` its quantity
pub fn parse_order_form(
    fields: &HashMap<String, String>,
    role: Role,
) -> Result<NewOrder, String> {
    let field = |name: &str| blank_to_none(fields.get(name).cloned());

    let delivery_date = field("delivery_date")
        .ok_or_else(|| "Choose a delivery date".to_string())
        .and_then(|d| {
            NaiveDate::parse_from_str(&d, "%Y-%m-%d")
                .map_err(|_| format!("Invalid delivery date: {d}"))
        })?;

    let mut lines = Vec::new();
    for i in 0..ORDER_LINES {
        let Some(choice) = field(&format!("line_{i}")) else {
            continue;
        };
        let quantity = match field(&format!("qty_{i}")) {
            Some(q) => q
                .parse::<u32>()
                .map_err(|_| format!("Invalid quantity: {q}"))?,
            None => 1,
        };
        if quantity == 0 {
            return Err("Quantities must be at least 1".to_string());
        }
        let (product_id, option_item_id) = match choice.split_once(':') {
            Some((product, option)) => (product.to_string(), Some(option.to_string())),
            None => (choice, None),
        };
        lines.push(NewOrderLine {
            product_id,
            option_item_id,
            quantity,
        });
    }
    if lines.is_empty() {
        return Err("Add at least one product".to_string());
    }

    let client_id = field("client_id");
    if role != Role::Client && client_id.is_none() {
        return Err("Choose a client for this order".to_string());
    }

    Ok(NewOrder {
        client_id: if role == Role::Client { None } else { client_id },
        delivery_date,
        delivery_address: field("delivery_address"),
        notes: field("notes"),
        lines,
    })
}

/// POST /orders - Place an order
pub async fn create_order_action(
    State(state): State<AppState>,
    viewer: Viewer,
    Form(fields): Form<HashMap<String, String>>,
) -> Response {
    let new_order = match parse_order_form(&fields, viewer.role()) {
        Ok(order) => order,
        Err(message) => return rejected("/orders/new", &message),
    };
    match state.backend.create_order(&viewer.token, &new_order).await {
        Ok(order) => {
            announce_created(&state.bus, &order);
            let target = if viewer.role() == Role::Client {
                "/client".to_string()
            } else {
                format!("/orders/{}", order.id)
            };
            let message = format!("Order {} placed", order.order_number);
            Redirect::to(&with_flash(&target, NoticeLevel::Success, &message)).into_response()
        }
        Err(e) => respond::<()>(Err(e), "/orders/new", |_| String::new()),
    }
}

/// POST /orders/{order_id}/cancel
pub async fn cancel_order_action(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(order_id): Path<String>,
    Form(form): Form<ReturnForm>,
) -> Response {
    let return_to = safe_return(form.return_to.as_deref(), viewer.role().home_path());
    let result = state.backend.cancel_order(&viewer.token, &order_id).await;
    if let Ok(order) = &result {
        announce_cancelled(&state.bus, order);
    }
    respond(result, &return_to, |order| {
        format!("Order {} cancelled", order.order_number)
    })
}

#[derive(Debug, Deserialize)]
pub struct ProductionForm {
    pub status: String,
    #[serde(default)]
    pub produced_quantity: Option<String>,
    #[serde(default)]
    pub return_to: Option<String>,
}

/// POST /orders/{order_id}/items/{item_id}/production
pub async fn item_production_action(
    State(state): State<AppState>,
    viewer: Viewer,
    Path((order_id, item_id)): Path<(String, String)>,
    Form(form): Form<ProductionForm>,
) -> Response {
    let return_to = safe_return(form.return_to.as_deref(), viewer.role().home_path());
    let Ok(status) = ProductionStatus::from_str(&form.status) else {
        return rejected(&return_to, &format!("Unknown production status: {}", form.status));
    };
    let produced_quantity = match blank_to_none(form.produced_quantity) {
        Some(q) => match q.parse::<u32>() {
            Ok(q) => Some(q),
            Err(_) => return rejected(&return_to, &format!("Invalid quantity: {q}")),
        },
        None => None,
    };
    let update = ProductionUpdate {
        status,
        produced_quantity,
    };
    let result = state
        .backend
        .update_item_production(&viewer.token, &order_id, &item_id, &update)
        .await;
    if let Ok(order) = &result {
        announce_production(&state.bus, order, &item_id);
    }
    respond(result, &return_to, |order| {
        let item = order
            .items
            .iter()
            .find(|i| i.id == item_id)
            .map(|i| i.product_name.as_str())
            .unwrap_or("Item");
        format!("{item}: {}", status.badge().label)
    })
}

#[derive(Debug, Deserialize)]
pub struct ItemDeliveryForm {
    pub status: String,
    #[serde(default)]
    pub return_to: Option<String>,
}

/// POST /orders/{order_id}/items/{item_id}/delivery
pub async fn item_delivery_action(
    State(state): State<AppState>,
    viewer: Viewer,
    Path((order_id, item_id)): Path<(String, String)>,
    Form(form): Form<ItemDeliveryForm>,
) -> Response {
    let return_to = safe_return(form.return_to.as_deref(), viewer.role().home_path());
    let Ok(status) = DeliveryStatus::from_str(&form.status) else {
        return rejected(&return_to, &format!("Unknown delivery status: {}", form.status));
    };
    let result = state
        .backend
        .update_item_delivery(&viewer.token, &order_id, &item_id, status)
        .await;
    if let Ok(order) = &result {
        announce_item_delivery(&state.bus, order, &item_id);
    }
    respond(result, &return_to, |_| {
        format!("Item marked {}", status.badge().label)
    })
}

#[derive(Debug, Deserialize)]
pub struct OrderDeliveryForm {
    pub status: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub return_to: Option<String>,
}

/// POST /orders/{order_id}/delivery
pub async fn order_delivery_action(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(order_id): Path<String>,
    Form(form): Form<OrderDeliveryForm>,
) -> Response {
    let return_to = safe_return(form.return_to.as_deref(), viewer.role().home_path());
    let Ok(status) = DeliveryStatus::from_str(&form.status) else {
        return rejected(&return_to, &format!("Unknown delivery status: {}", form.status));
    };
    let update = DeliveryUpdate {
        status,
        note: blank_to_none(form.note),
    };
    let result = state
        .backend
        .update_order_delivery(&viewer.token, &order_id, &update)
        .await;
    if let Ok(order) = &result {
        announce_delivery(&state.bus, order);
    }
    respond(result, &return_to, |order| {
        format!("Order {} {}", order.order_number, status.badge().label.to_lowercase())
    })
}

// =============================================================================
// Catalogue and pricing
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ActiveForm {
    pub active: String,
    #[serde(default)]
    pub return_to: Option<String>,
}

impl ActiveForm {
    fn flag(&self) -> bool {
        matches!(self.active.trim(), "true" | "1" | "on" | "yes")
    }
}

/// POST /products/{product_id}/active
pub async fn product_active_action(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(product_id): Path<String>,
    Form(form): Form<ActiveForm>,
) -> Response {
    let return_to = safe_return(form.return_to.as_deref(), "/products");
    let result = state
        .backend
        .set_product_active(&viewer.token, &product_id, form.flag())
        .await;
    if let Ok(product) = &result {
        announce_product(&state.bus, product);
    }
    respond(result, &return_to, |product| {
        let state = if product.active { "active" } else { "inactive" };
        format!("{} is now {state}", product.name)
    })
}

#[derive(Debug, Deserialize)]
pub struct NewPriceListForm {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// POST /price-lists
pub async fn create_price_list_action(
    State(state): State<AppState>,
    viewer: Viewer,
    Form(form): Form<NewPriceListForm>,
) -> Response {
    if form.name.trim().is_empty() {
        return rejected("/price-lists", "Price list name is required");
    }
    let list = NewPriceList {
        name: form.name.trim().to_string(),
        description: blank_to_none(form.description),
    };
    match state.backend.create_price_list(&viewer.token, &list).await {
        Ok(created) => {
            announce_price_list(&state.bus, &created);
            let target = format!("/price-lists/{}", created.id);
            let message = format!("Price list {} created", created.name);
            Redirect::to(&with_flash(&target, NoticeLevel::Success, &message)).into_response()
        }
        Err(e) => respond::<()>(Err(e), "/price-lists", |_| String::new()),
    }
}

#[derive(Debug, Deserialize)]
pub struct PriceItemForm {
    pub option_item_id: String,
    /// `fixed` or `multiplier`
    pub kind: String,
    pub value: String,
    #[serde(default)]
    pub return_to: Option<String>,
}

impl PriceItemForm {
    /// Price list item from the form, validated like the wire shape
    pub fn to_item(&self) -> Result<PriceListItem, String> {
        let option_item_id = self.option_item_id.trim();
        if option_item_id.is_empty() {
            return Err("Choose an option item".to_string());
        }
        let value = Decimal::from_str(self.value.trim())
            .map_err(|_| format!("Invalid number: {}", self.value))?;
        let rule = match self.kind.trim() {
            "fixed" => PriceRule::Fixed(value),
            "multiplier" => PriceRule::Multiplier(value),
            other => return Err(format!("Unknown rule: {other}")),
        };
        PriceListItem::new(option_item_id.to_string(), rule).map_err(|e| e.to_string())
    }
}

/// POST /price-lists/{price_list_id}/items - Set a fixed price or multiplier
pub async fn upsert_price_item_action(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(price_list_id): Path<String>,
    Form(form): Form<PriceItemForm>,
) -> Response {
    let fallback = format!("/price-lists/{price_list_id}");
    let return_to = safe_return(form.return_to.as_deref(), &fallback);
    let item = match form.to_item() {
        Ok(item) => item,
        Err(message) => return rejected(&return_to, &message),
    };
    let result = state
        .backend
        .upsert_price_list_item(&viewer.token, &price_list_id, &item)
        .await;
    if let Ok(list) = &result {
        announce_price_list(&state.bus, list);
    }
    respond(result, &return_to, |list| format!("{} updated", list.name))
}

/// POST /price-lists/{price_list_id}/items/{option_item_id}/remove
pub async fn remove_price_item_action(
    State(state): State<AppState>,
    viewer: Viewer,
    Path((price_list_id, option_item_id)): Path<(String, String)>,
    Form(form): Form<ReturnForm>,
) -> Response {
    let fallback = format!("/price-lists/{price_list_id}");
    let return_to = safe_return(form.return_to.as_deref(), &fallback);
    let result = state
        .backend
        .remove_price_list_item(&viewer.token, &price_list_id, &option_item_id)
        .await;
    if let Ok(list) = &result {
        announce_price_list(&state.bus, list);
    }
    respond(result, &return_to, |list| {
        format!("Override removed from {}", list.name)
    })
}

#[derive(Debug, Deserialize)]
pub struct AssignForm {
    pub user_id: String,
    #[serde(default)]
    pub return_to: Option<String>,
}

async fn assign(
    state: &AppState,
    viewer: &Viewer,
    price_list_id: &str,
    user_id: &str,
    return_to: &str,
) -> Response {
    if price_list_id.trim().is_empty() {
        return rejected(return_to, "Choose a price list");
    }
    if user_id.trim().is_empty() {
        return rejected(return_to, "Choose a client or distributor");
    }
    let result = state
        .backend
        .assign_price_list(&viewer.token, price_list_id, user_id)
        .await;
    if let Ok(list) = &result {
        announce_price_list(&state.bus, list);
        state.bus.publish(BusEvent::UserChanged {
            user_id: user_id.to_string(),
        });
    }
    respond(result, return_to, |list| format!("{} assigned", list.name))
}

/// POST /price-lists/{price_list_id}/assign
pub async fn assign_price_list_action(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(price_list_id): Path<String>,
    Form(form): Form<AssignForm>,
) -> Response {
    let fallback = format!("/price-lists/{price_list_id}");
    let return_to = safe_return(form.return_to.as_deref(), &fallback);
    assign(&state, &viewer, &price_list_id, &form.user_id, &return_to).await
}

#[derive(Debug, Deserialize)]
pub struct UserPriceListForm {
    pub price_list_id: String,
    #[serde(default)]
    pub return_to: Option<String>,
}

/// POST /users/{user_id}/price-list - Same assignment, from the user table
pub async fn user_price_list_action(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(user_id): Path<String>,
    Form(form): Form<UserPriceListForm>,
) -> Response {
    let return_to = safe_return(form.return_to.as_deref(), "/users");
    assign(&state, &viewer, &form.price_list_id, &user_id, &return_to).await
}

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct NewUserForm {
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub product_group: Option<String>,
    #[serde(default)]
    pub distributor_id: Option<String>,
    #[serde(default)]
    pub return_to: Option<String>,
}

impl NewUserForm {
    pub fn to_new_user(&self) -> Result<NewUser, String> {
        let role = Role::from_str(&self.role).map_err(|e| e.to_string())?;
        let user = NewUser {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            role,
            password: blank_to_none(self.password.clone()),
            product_group: blank_to_none(self.product_group.clone()),
            distributor_id: blank_to_none(self.distributor_id.clone()),
        };
        user.validate()?;
        Ok(user)
    }
}

/// POST /users
pub async fn create_user_action(
    State(state): State<AppState>,
    viewer: Viewer,
    Form(form): Form<NewUserForm>,
) -> Response {
    let return_to = safe_return(form.return_to.as_deref(), "/users");
    let new_user = match form.to_new_user() {
        Ok(user) => user,
        Err(message) => return rejected(&return_to, &message),
    };
    let result = state.backend.create_user(&viewer.token, &new_user).await;
    if let Ok(user) = &result {
        info!("{} created {} account {}", viewer.user.email, user.role, user.email);
        announce_user(&state.bus, user);
    }
    respond(result, &return_to, |user| {
        format!("{} account created for {}", user.role.label(), user.name)
    })
}

/// POST /users/{user_id}/active
pub async fn user_active_action(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(user_id): Path<String>,
    Form(form): Form<ActiveForm>,
) -> Response {
    let return_to = safe_return(form.return_to.as_deref(), "/users");
    let result = state
        .backend
        .set_user_active(&viewer.token, &user_id, form.flag())
        .await;
    if let Ok(user) = &result {
        announce_user(&state.bus, user);
    }
    respond(result, &return_to, |user| {
        let state = if user.active { "activated" } else { "deactivated" };
        format!("{} {state}", user.name)
    })
}
