//! Mock catering REST API
//!
//! Serves a handful of endpoints under `/v1/` with canned data, checks the
//! bearer token and records what the client sent.

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Json, Router,
};
use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use catering_dashboard::domain::{
    ClientRef, DeliveryStatus, Order, OrderItem, ProductionStatus, Role, Session, User,
};

pub const MOCK_TOKEN: &str = "mock-token";
pub const MOCK_PASSWORD: &str = "secret";

/// Mock API state
struct MockState {
    orders: Vec<Order>,
    /// Last JSON body received by a mutating endpoint
    last_body: Option<Value>,
    /// Last `Authorization` header seen
    last_auth: Option<String>,
    /// Respond to `GET products` with garbage
    broken_products: bool,
}

/// Mock catering API server
pub struct MockCateringApi {
    addr: SocketAddr,
    state: Arc<RwLock<MockState>>,
    handle: JoinHandle<()>,
}

pub fn mock_chef() -> User {
    User {
        id: "u-chef".to_string(),
        name: "Marta Chef".to_string(),
        email: "chef@mock.local".to_string(),
        role: Role::Chef,
        active: true,
        product_group: Some("Hot".to_string()),
        price_list_id: None,
        distributor_id: None,
    }
}

pub fn mock_order() -> Order {
    let item = |id: &str, group: &str, status: ProductionStatus| OrderItem {
        id: id.to_string(),
        product_id: format!("p-{id}"),
        product_name: format!("Dish {id}"),
        option_item_id: None,
        option_label: None,
        product_group: group.to_string(),
        quantity: 4,
        produced_quantity: 0,
        unit_price: Decimal::new(1250, 2),
        production_status: status,
        delivery_status: DeliveryStatus::Pending,
    };
    Order {
        id: "o-1".to_string(),
        order_number: "ORD-1001".to_string(),
        client: ClientRef {
            id: "c-1".to_string(),
            name: "Harbor Bistro".to_string(),
        },
        delivery_date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
        delivery_address: Some("1 Quay Street".to_string()),
        notes: None,
        production_status: ProductionStatus::Pending,
        delivery_status: DeliveryStatus::Pending,
        items: vec![
            item("i-1", "Hot", ProductionStatus::Pending),
            item("i-2", "Cold", ProductionStatus::Completed),
        ],
        total: Decimal::new(10000, 2),
        created_at: DateTime::from_timestamp(1_770_000_000, 0).unwrap(),
    }
}

impl MockCateringApi {
    /// Start the mock API on a random port
    pub async fn start() -> Self {
        let state = Arc::new(RwLock::new(MockState {
            orders: vec![mock_order()],
            last_body: None,
            last_auth: None,
            broken_products: false,
        }));

        let app = Router::new()
            .route("/v1/auth/login", post(handle_login))
            .route("/v1/auth/me", get(handle_me))
            .route("/v1/orders", get(handle_orders))
            .route("/v1/orders/{order_id}", get(handle_order))
            .route(
                "/v1/orders/{order_id}/items/{item_id}/production",
                patch(handle_production),
            )
            .route("/v1/orders/{order_id}/cancel", post(handle_cancel))
            .route("/v1/products", get(handle_products))
            .route(
                "/v1/price-lists/{price_list_id}/items/{option_item_id}",
                put(handle_price_item),
            )
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// API root as configured in `backend.base_url`
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    pub async fn last_body(&self) -> Option<Value> {
        self.state.read().await.last_body.clone()
    }

    pub async fn last_auth(&self) -> Option<String> {
        self.state.read().await.last_auth.clone()
    }

    pub async fn break_products(&self) {
        self.state.write().await.broken_products = true;
    }

    /// Stop the mock server
    pub async fn stop(self) {
        self.handle.abort();
    }
}

type Shared = State<Arc<RwLock<MockState>>>;

async fn authorize(state: &Arc<RwLock<MockState>>, headers: &HeaderMap) -> Result<(), Response> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.write().await.last_auth = auth.clone();
    if auth.as_deref() == Some(&format!("Bearer {MOCK_TOKEN}")) {
        Ok(())
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Token expired" })),
        )
            .into_response())
    }
}

async fn handle_login(Json(body): Json<Value>) -> Response {
    if body["password"] == MOCK_PASSWORD && body["email"] == "chef@mock.local" {
        Json(Session {
            token: MOCK_TOKEN.to_string(),
            user: mock_chef(),
        })
        .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid credentials" })),
        )
            .into_response()
    }
}

async fn handle_me(State(state): Shared, headers: HeaderMap) -> Response {
    if let Err(denied) = authorize(&state, &headers).await {
        return denied;
    }
    Json(mock_chef()).into_response()
}

async fn handle_orders(State(state): Shared, headers: HeaderMap) -> Response {
    if let Err(denied) = authorize(&state, &headers).await {
        return denied;
    }
    Json(state.read().await.orders.clone()).into_response()
}

async fn handle_order(
    State(state): Shared,
    headers: HeaderMap,
    Path(order_id): Path<String>,
) -> Response {
    if let Err(denied) = authorize(&state, &headers).await {
        return denied;
    }
    match state.read().await.orders.iter().find(|o| o.id == order_id) {
        Some(order) => Json(order.clone()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("Order {order_id} not found") })),
        )
            .into_response(),
    }
}

async fn handle_production(
    State(state): Shared,
    headers: HeaderMap,
    Path((order_id, item_id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(denied) = authorize(&state, &headers).await {
        return denied;
    }
    let mut guard = state.write().await;
    guard.last_body = Some(body.clone());
    let Some(order) = guard.orders.iter_mut().find(|o| o.id == order_id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let Some(item) = order.items.iter_mut().find(|i| i.id == item_id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if item.production_status == ProductionStatus::Completed {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "message": "Item is already completed" })),
        )
            .into_response();
    }
    item.production_status = ProductionStatus::Completed;
    item.produced_quantity = item.quantity;
    Json(order.clone()).into_response()
}

async fn handle_cancel(
    State(state): Shared,
    headers: HeaderMap,
    Path(_order_id): Path<String>,
) -> Response {
    if let Err(denied) = authorize(&state, &headers).await {
        return denied;
    }
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "message": "Orders can only be cancelled before production starts" })),
    )
        .into_response()
}

async fn handle_products(State(state): Shared, headers: HeaderMap) -> Response {
    if let Err(denied) = authorize(&state, &headers).await {
        return denied;
    }
    if state.read().await.broken_products {
        return "<html>gateway</html>".into_response();
    }
    Json(json!([])).into_response()
}

async fn handle_price_item(
    State(state): Shared,
    headers: HeaderMap,
    Path((price_list_id, _option_item_id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(denied) = authorize(&state, &headers).await {
        return denied;
    }
    state.write().await.last_body = Some(body.clone());
    Json(json!({
        "id": price_list_id,
        "name": "Wholesale",
        "items": [body],
    }))
    .into_response()
}
