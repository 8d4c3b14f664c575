//! Order endpoints: listing, intake, cancellation, production and delivery updates

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::info;

use super::{superseded_response, ApiError, ApiResult, AppState};
use crate::actions::{ActionOutcome, ORDER_SEARCH};
use crate::bus::{BusEvent, NoticeLevel, SharedBus};
use crate::domain::{DeliveryStatus, DeliveryUpdate, NewOrder, Order, OrderQuery, ProductionUpdate};
use crate::session::Viewer;

pub(crate) fn announce_created(bus: &SharedBus, order: &Order) {
    info!(
        "Order {} created for {} ({} items)",
        order.order_number,
        order.client.name,
        order.items.len()
    );
    bus.publish(BusEvent::OrderCreated {
        order_id: order.id.clone(),
        order_number: order.order_number.clone(),
        client_id: order.client.id.clone(),
    });
    bus.notify_client(
        &order.client.id,
        NoticeLevel::Info,
        format!("New order {} placed", order.order_number),
    );
}

pub(crate) fn announce_cancelled(bus: &SharedBus, order: &Order) {
    info!("Order {} cancelled", order.order_number);
    bus.publish(BusEvent::OrderCancelled {
        order_id: order.id.clone(),
        client_id: order.client.id.clone(),
    });
}

pub(crate) fn announce_production(bus: &SharedBus, order: &Order, item_id: &str) {
    if let Some(item) = order.items.iter().find(|i| i.id == item_id) {
        bus.publish(BusEvent::ItemProductionChanged {
            order_id: order.id.clone(),
            client_id: order.client.id.clone(),
            item_id: item.id.clone(),
            status: item.production_status,
        });
    }
}

pub(crate) fn announce_item_delivery(bus: &SharedBus, order: &Order, item_id: &str) {
    if let Some(item) = order.items.iter().find(|i| i.id == item_id) {
        bus.publish(BusEvent::ItemDeliveryChanged {
            order_id: order.id.clone(),
            client_id: order.client.id.clone(),
            item_id: item.id.clone(),
            status: item.delivery_status,
        });
    }
}

pub(crate) fn announce_delivery(bus: &SharedBus, order: &Order) {
    bus.publish(BusEvent::OrderDeliveryChanged {
        order_id: order.id.clone(),
        client_id: order.client.id.clone(),
        status: order.delivery_status,
    });
}

/// GET /api/orders - Orders visible to the viewer, filtered by query
///
/// A newer search from the same user supersedes one still running.
pub async fn list_orders_handler(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<OrderQuery>,
) -> Response {
    let backend = state.backend.clone();
    let outcome = state
        .actions
        .run(&viewer.user.id, ORDER_SEARCH, async {
            backend.list_orders(&viewer.token, &query).await
        })
        .await;
    match outcome {
        ActionOutcome::Completed(Ok(orders)) => Json(orders).into_response(),
        ActionOutcome::Completed(Err(e)) => ApiError(e).into_response(),
        ActionOutcome::Superseded => superseded_response(),
    }
}

/// GET /api/orders/{order_id}
pub async fn get_order_handler(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(order_id): Path<String>,
) -> ApiResult<Order> {
    Ok(Json(state.backend.get_order(&viewer.token, &order_id).await?))
}

/// POST /api/orders - Place an order
pub async fn create_order_handler(
    State(state): State<AppState>,
    viewer: Viewer,
    Json(new_order): Json<NewOrder>,
) -> ApiResult<Order> {
    let order = state.backend.create_order(&viewer.token, &new_order).await?;
    announce_created(&state.bus, &order);
    Ok(Json(order))
}

/// POST /api/orders/{order_id}/cancel
pub async fn cancel_order_handler(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(order_id): Path<String>,
) -> ApiResult<Order> {
    let order = state.backend.cancel_order(&viewer.token, &order_id).await?;
    announce_cancelled(&state.bus, &order);
    Ok(Json(order))
}

/// PATCH /api/orders/{order_id}/items/{item_id}/production
pub async fn item_production_handler(
    State(state): State<AppState>,
    viewer: Viewer,
    Path((order_id, item_id)): Path<(String, String)>,
    Json(update): Json<ProductionUpdate>,
) -> ApiResult<Order> {
    let order = state
        .backend
        .update_item_production(&viewer.token, &order_id, &item_id, &update)
        .await?;
    announce_production(&state.bus, &order, &item_id);
    Ok(Json(order))
}

#[derive(Deserialize)]
pub struct ItemDeliveryRequest {
    pub status: DeliveryStatus,
}

/// PATCH /api/orders/{order_id}/items/{item_id}/delivery
pub async fn item_delivery_handler(
    State(state): State<AppState>,
    viewer: Viewer,
    Path((order_id, item_id)): Path<(String, String)>,
    Json(req): Json<ItemDeliveryRequest>,
) -> ApiResult<Order> {
    let order = state
        .backend
        .update_item_delivery(&viewer.token, &order_id, &item_id, req.status)
        .await?;
    announce_item_delivery(&state.bus, &order, &item_id);
    Ok(Json(order))
}

/// PATCH /api/orders/{order_id}/delivery
pub async fn order_delivery_handler(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(order_id): Path<String>,
    Json(update): Json<DeliveryUpdate>,
) -> ApiResult<Order> {
    let order = state
        .backend
        .update_order_delivery(&viewer.token, &order_id, &update)
        .await?;
    announce_delivery(&state.bus, &order);
    Ok(Json(order))
}
