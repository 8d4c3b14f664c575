//! Web UI handlers - one dashboard per role
//!
//! Every page follows the same flow: fetch through the backend, render with
//! Dioxus SSR, and let form posts (see [`actions`]) redirect back here so
//! the page refetches. Pico CSS keeps the markup close to classless HTML.
//!
//! - components/ - Shared Dioxus components (layout, nav, order card, badges)
//! - pages/ - Page components per role

pub mod actions;
pub mod components;
pub mod pages;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::{NaiveDate, Utc};
use dioxus::prelude::*;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::actions::{ActionOutcome, ANALYTICS, ORDER_SEARCH};
use crate::api::AppState;
use crate::backend::{BackendError, BackendResult, Severity};
use crate::domain::{AnalyticsQuery, OrderQuery, PriceList, Product, Role, User};
use crate::session::{clear_session_cookie, token_from_headers, Viewer};
use components::Flash;
use pages::{
    AdminOverviewPage, AnalyticsPage, ChefBoardPage, ClientOrdersPage, DistributorPage,
    DriverPage, ErrorPage, LoginPage, NewOrderPage, OrderDetailPage, OrderFilters, OrdersPage,
    PriceListPage, PriceListsPage, ProductsPage, UsersPage,
};

/// Rendered page as a full HTML document
pub fn render_page(page: Element) -> Html<String> {
    let html = dioxus::ssr::render_element(page);
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\" data-theme=\"dark\">\n{}</html>",
        html
    ))
}

/// Backend failure ending a page request
#[derive(Debug)]
pub struct PageError(pub BackendError);

impl From<BackendError> for PageError {
    fn from(err: BackendError) -> Self {
        PageError(err)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        if self.0 == BackendError::Unauthorized {
            return (
                [(header::SET_COOKIE, clear_session_cookie())],
                Redirect::to("/login"),
            )
                .into_response();
        }
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if self.0.severity() == Severity::Critical {
            warn!("Page failed to load: {}", self.0);
        } else {
            debug!("Page rejected: {}", self.0);
        }
        let message = self.0.to_string();
        let code = status.as_u16();
        (
            status,
            render_page(rsx! { ErrorPage { status: code, message, user: None } }),
        )
            .into_response()
    }
}

pub type PageResult = Result<Response, PageError>;

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Optional lookups: a missing or forbidden resource renders without it,
/// an unreachable backend still fails the page
fn optional<T>(result: BackendResult<T>) -> BackendResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.severity() == Severity::Critical || e == BackendError::Unauthorized => Err(e),
        Err(e) => {
            debug!("Optional lookup skipped: {}", e);
            Ok(None)
        }
    }
}

/// Distinct product groups in catalogue order
fn product_groups(products: &[Product]) -> Vec<String> {
    let mut groups: Vec<String> = Vec::new();
    for product in products {
        if !groups.iter().any(|g| g.eq_ignore_ascii_case(&product.group)) {
            groups.push(product.group.clone());
        }
    }
    groups
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// GET / - Role home, or the login page when signed out
pub async fn root_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(token) = token_from_headers(&headers) else {
        return Redirect::to("/login").into_response();
    };
    match state.backend.current_user(&token).await {
        Ok(user) => Redirect::to(user.role.home_path()).into_response(),
        Err(e) => PageError(e).into_response(),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// GET /login
pub async fn login_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<LoginQuery>,
) -> Response {
    if let Some(token) = token_from_headers(&headers) {
        if let Ok(user) = state.backend.current_user(&token).await {
            return Redirect::to(user.role.home_path()).into_response();
        }
    }
    let demo_accounts = if state.demo {
        state.demo_accounts.as_ref().clone()
    } else {
        Vec::new()
    };
    render_page(rsx! {
        LoginPage {
            error: query.error,
            email: query.email.unwrap_or_default(),
            demo_accounts,
        }
    })
    .into_response()
}

/// GET /admin - Status counts and today's deliveries
pub async fn admin_page(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(flash): Query<Flash>,
) -> PageResult {
    viewer.require(&[Role::Admin])?;
    let orders = state
        .backend
        .list_orders(&viewer.token, &OrderQuery::default())
        .await?;
    let display = state.display.as_ref().clone();
    Ok(render_page(rsx! {
        AdminOverviewPage { user: viewer.user, flash: Some(flash), display, orders, today: today() }
    })
    .into_response())
}

/// GET /orders - Filterable order table
///
/// A newer search from the same user supersedes one still running; the
/// superseded request answers 204.
pub async fn orders_page(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(filters): Query<OrderFilters>,
    Query(flash): Query<Flash>,
) -> PageResult {
    viewer.require(&[Role::Admin, Role::Distributor])?;
    let query = filters.to_query();
    let backend = state.backend.clone();
    let outcome = state
        .actions
        .run(&viewer.user.id, ORDER_SEARCH, async {
            backend.list_orders(&viewer.token, &query).await
        })
        .await;
    let orders = match outcome {
        ActionOutcome::Completed(result) => result?,
        ActionOutcome::Superseded => return Ok(StatusCode::NO_CONTENT.into_response()),
    };
    let products = state.backend.list_products(&viewer.token).await?;
    let clients = state
        .backend
        .list_users(&viewer.token, Some(Role::Client))
        .await?;
    let display = state.display.as_ref().clone();
    Ok(render_page(rsx! {
        OrdersPage {
            user: viewer.user,
            flash: Some(flash),
            display,
            orders,
            filters,
            groups: product_groups(&products),
            clients,
        }
    })
    .into_response())
}

/// GET /orders/{order_id}
pub async fn order_detail_page(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(order_id): Path<String>,
    Query(flash): Query<Flash>,
) -> PageResult {
    let order = state.backend.get_order(&viewer.token, &order_id).await?;
    let display = state.display.as_ref().clone();
    Ok(render_page(rsx! {
        OrderDetailPage { user: viewer.user, flash: Some(flash), display, order }
    })
    .into_response())
}

/// Price list applied to the viewer's own purchases
async fn own_price_list(state: &AppState, viewer: &Viewer) -> BackendResult<Option<PriceList>> {
    match viewer.user.price_list_id.as_deref() {
        Some(id) => optional(state.backend.get_price_list(&viewer.token, id).await),
        None => Ok(None),
    }
}

/// GET /orders/new - Order intake form
pub async fn new_order_page(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(flash): Query<Flash>,
) -> PageResult {
    viewer.require(&[Role::Client, Role::Distributor, Role::Admin])?;
    let products = state.backend.list_products(&viewer.token).await?;
    let price_list = if viewer.role() == Role::Admin {
        None
    } else {
        own_price_list(&state, &viewer).await?
    };
    let clients = if viewer.role() == Role::Client {
        Vec::new()
    } else {
        state
            .backend
            .list_users(&viewer.token, Some(Role::Client))
            .await?
    };
    let display = state.display.as_ref().clone();
    Ok(render_page(rsx! {
        NewOrderPage {
            user: viewer.user,
            flash: Some(flash),
            display,
            products,
            price_list,
            clients,
            today: today(),
        }
    })
    .into_response())
}

/// GET /products
pub async fn products_page(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(flash): Query<Flash>,
) -> PageResult {
    viewer.require(&[Role::Admin])?;
    let products = state.backend.list_products(&viewer.token).await?;
    let display = state.display.as_ref().clone();
    Ok(render_page(rsx! {
        ProductsPage { user: viewer.user, flash: Some(flash), display, products }
    })
    .into_response())
}

#[derive(Debug, Default, Deserialize)]
pub struct UsersPageQuery {
    #[serde(default)]
    pub role: String,
}

/// GET /users - Accounts (admin) or own clients (distributor)
pub async fn users_page(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<UsersPageQuery>,
    Query(flash): Query<Flash>,
) -> PageResult {
    viewer.require(&[Role::Admin, Role::Distributor])?;
    let role_filter: Option<Role> = query.role.parse().ok();
    let users = state.backend.list_users(&viewer.token, role_filter).await?;
    let price_lists = state.backend.list_price_lists(&viewer.token).await?;
    let groups = if viewer.role() == Role::Admin {
        product_groups(&state.backend.list_products(&viewer.token).await?)
    } else {
        Vec::new()
    };
    Ok(render_page(rsx! {
        UsersPage { user: viewer.user, flash: Some(flash), users, price_lists, groups, role_filter }
    })
    .into_response())
}

/// GET /price-lists
pub async fn price_lists_page(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(flash): Query<Flash>,
) -> PageResult {
    viewer.require(&[Role::Admin, Role::Distributor])?;
    let price_lists = state.backend.list_price_lists(&viewer.token).await?;
    Ok(render_page(rsx! {
        PriceListsPage { user: viewer.user, flash: Some(flash), price_lists }
    })
    .into_response())
}

/// GET /price-lists/{price_list_id} - Item editor and assignment
pub async fn price_list_page(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(price_list_id): Path<String>,
    Query(flash): Query<Flash>,
) -> PageResult {
    viewer.require(&[Role::Admin, Role::Distributor])?;
    let price_list = state
        .backend
        .get_price_list(&viewer.token, &price_list_id)
        .await?;
    let products = state.backend.list_products(&viewer.token).await?;
    let assignable: Vec<User> = state
        .backend
        .list_users(&viewer.token, None)
        .await?
        .into_iter()
        .filter(|u| matches!(u.role, Role::Client | Role::Distributor) && u.active)
        .collect();
    let display = state.display.as_ref().clone();
    Ok(render_page(rsx! {
        PriceListPage { user: viewer.user, flash: Some(flash), display, price_list, products, assignable }
    })
    .into_response())
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsForm {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
}

/// GET /analytics - Superseded requests answer 204
pub async fn analytics_page(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(form): Query<AnalyticsForm>,
    Query(flash): Query<Flash>,
) -> PageResult {
    viewer.require(&[Role::Admin, Role::Distributor])?;
    let query = AnalyticsQuery {
        from: parse_date(&form.from),
        to: parse_date(&form.to),
    };
    let backend = state.backend.clone();
    let outcome = state
        .actions
        .run(&viewer.user.id, ANALYTICS, async {
            backend.analytics(&viewer.token, &query).await
        })
        .await;
    let report = match outcome {
        ActionOutcome::Completed(result) => result?,
        ActionOutcome::Superseded => return Ok(StatusCode::NO_CONTENT.into_response()),
    };
    let display = state.display.as_ref().clone();
    Ok(render_page(rsx! {
        AnalyticsPage {
            user: viewer.user,
            flash: Some(flash),
            display,
            report,
            from: form.from.clone(),
            to: form.to.clone(),
        }
    })
    .into_response())
}

#[derive(Debug, Default, Deserialize)]
pub struct ChefQuery {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub date: String,
}

/// GET /chef - Production board for the chef's station (admins pick one)
pub async fn chef_page(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<ChefQuery>,
    Query(flash): Query<Flash>,
) -> PageResult {
    viewer.require(&[Role::Chef, Role::Admin])?;
    let (group, groups) = if viewer.role() == Role::Chef {
        let group = viewer.user.product_group.clone().ok_or_else(|| {
            BackendError::Forbidden("No kitchen station is assigned to your account".to_string())
        })?;
        (group, Vec::new())
    } else {
        let groups = product_groups(&state.backend.list_products(&viewer.token).await?);
        let group = groups
            .iter()
            .find(|g| g.eq_ignore_ascii_case(query.group.trim()))
            .or_else(|| groups.first())
            .cloned()
            .ok_or_else(|| BackendError::NotFound("No product groups configured".to_string()))?;
        (group, groups)
    };
    let orders = state
        .backend
        .list_orders(
            &viewer.token,
            &OrderQuery {
                product_group: Some(group.clone()),
                delivery_date: parse_date(&query.date),
                ..Default::default()
            },
        )
        .await?;
    let display = state.display.as_ref().clone();
    Ok(render_page(rsx! {
        ChefBoardPage {
            user: viewer.user,
            flash: Some(flash),
            display,
            orders,
            group,
            groups,
            date: query.date.trim().to_string(),
        }
    })
    .into_response())
}

#[derive(Debug, Default, Deserialize)]
pub struct DriverQuery {
    #[serde(default)]
    pub date: String,
}

/// GET /driver - Delivery run, today unless a date is given
pub async fn driver_page(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<DriverQuery>,
    Query(flash): Query<Flash>,
) -> PageResult {
    viewer.require(&[Role::Driver, Role::Admin])?;
    let date = parse_date(&query.date).unwrap_or_else(today);
    let orders = state
        .backend
        .list_orders(
            &viewer.token,
            &OrderQuery {
                delivery_date: Some(date),
                ..Default::default()
            },
        )
        .await?;
    let display = state.display.as_ref().clone();
    Ok(render_page(rsx! {
        DriverPage { user: viewer.user, flash: Some(flash), display, orders, date }
    })
    .into_response())
}

/// GET /client - The client's own orders
pub async fn client_page(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(flash): Query<Flash>,
) -> PageResult {
    viewer.require(&[Role::Client])?;
    let orders = state
        .backend
        .list_orders(&viewer.token, &OrderQuery::default())
        .await?;
    let display = state.display.as_ref().clone();
    Ok(render_page(rsx! {
        ClientOrdersPage { user: viewer.user, flash: Some(flash), display, orders }
    })
    .into_response())
}

/// GET /distributor - Own clients and their orders
pub async fn distributor_page(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(flash): Query<Flash>,
) -> PageResult {
    viewer.require(&[Role::Distributor])?;
    let orders = state
        .backend
        .list_orders(&viewer.token, &OrderQuery::default())
        .await?;
    let clients = state
        .backend
        .list_users(&viewer.token, Some(Role::Client))
        .await?;
    let price_lists = state.backend.list_price_lists(&viewer.token).await?;
    let display = state.display.as_ref().clone();
    Ok(render_page(rsx! {
        DistributorPage { user: viewer.user, flash: Some(flash), display, orders, clients, price_lists }
    })
    .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProductOption;
    use rust_decimal::Decimal;

    fn product(id: &str, group: &str) -> Product {
        Product {
            id: id.into(),
            name: id.into(),
            group: group.into(),
            base_price: Decimal::ONE,
            unit: None,
            active: true,
            options: Vec::<ProductOption>::new(),
        }
    }

    #[test]
    fn product_groups_are_distinct_and_ordered() {
        let products = [
            product("a", "Hot"),
            product("b", "Cold"),
            product("c", "hot"),
            product("d", "Pastry"),
        ];
        assert_eq!(product_groups(&products), ["Hot", "Cold", "Pastry"]);
    }

    #[test]
    fn optional_lookup_keeps_critical_errors() {
        assert_eq!(
            optional::<()>(Err(BackendError::NotFound("gone".into()))),
            Ok(None)
        );
        assert!(optional::<()>(Err(BackendError::Transport("down".into()))).is_err());
        assert!(optional::<()>(Err(BackendError::Unauthorized)).is_err());
    }

    #[tokio::test]
    async fn unauthorized_page_redirects_to_login() {
        let response = PageError(BackendError::Unauthorized).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/login");
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn transport_failure_renders_error_page() {
        let response = PageError(BackendError::Transport("connection refused".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
