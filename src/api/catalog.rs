//! Product and price list endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use super::{ApiError, ApiResult, AppState};
use crate::backend::BackendError;
use crate::bus::{BusEvent, SharedBus};
use crate::domain::{NewPriceList, PriceList, PriceListItem, Product};
use crate::session::Viewer;

pub(crate) fn announce_product(bus: &SharedBus, product: &Product) {
    bus.publish(BusEvent::ProductChanged {
        product_id: product.id.clone(),
    });
}

pub(crate) fn announce_price_list(bus: &SharedBus, list: &PriceList) {
    bus.publish(BusEvent::PriceListChanged {
        price_list_id: list.id.clone(),
    });
}

#[derive(Deserialize)]
pub struct ActiveRequest {
    pub active: bool,
}

/// GET /api/products
pub async fn products_handler(
    State(state): State<AppState>,
    viewer: Viewer,
) -> ApiResult<Vec<Product>> {
    Ok(Json(state.backend.list_products(&viewer.token).await?))
}

/// PATCH /api/products/{product_id} - Activate or deactivate
pub async fn product_update_handler(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(product_id): Path<String>,
    Json(req): Json<ActiveRequest>,
) -> ApiResult<Product> {
    let product = state
        .backend
        .set_product_active(&viewer.token, &product_id, req.active)
        .await?;
    announce_product(&state.bus, &product);
    Ok(Json(product))
}

/// GET /api/price-lists
pub async fn price_lists_handler(
    State(state): State<AppState>,
    viewer: Viewer,
) -> ApiResult<Vec<PriceList>> {
    Ok(Json(state.backend.list_price_lists(&viewer.token).await?))
}

/// GET /api/price-lists/{price_list_id}
pub async fn price_list_handler(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(price_list_id): Path<String>,
) -> ApiResult<PriceList> {
    Ok(Json(
        state
            .backend
            .get_price_list(&viewer.token, &price_list_id)
            .await?,
    ))
}

/// POST /api/price-lists
pub async fn create_price_list_handler(
    State(state): State<AppState>,
    viewer: Viewer,
    Json(req): Json<NewPriceList>,
) -> ApiResult<PriceList> {
    let list = state.backend.create_price_list(&viewer.token, &req).await?;
    announce_price_list(&state.bus, &list);
    Ok(Json(list))
}

/// PUT /api/price-lists/{price_list_id}/items/{option_item_id}
///
/// Body is the wire shape (`price` or `multiplier`, never both), so an
/// invalid combination is rejected while decoding.
pub async fn upsert_price_list_item_handler(
    State(state): State<AppState>,
    viewer: Viewer,
    Path((price_list_id, option_item_id)): Path<(String, String)>,
    Json(item): Json<PriceListItem>,
) -> ApiResult<PriceList> {
    if item.option_item_id != option_item_id {
        return Err(ApiError(BackendError::Rejected {
            status: 400,
            message: format!(
                "Body is for {} but the path names {}",
                item.option_item_id, option_item_id
            ),
        }));
    }
    let list = state
        .backend
        .upsert_price_list_item(&viewer.token, &price_list_id, &item)
        .await?;
    announce_price_list(&state.bus, &list);
    Ok(Json(list))
}

/// DELETE /api/price-lists/{price_list_id}/items/{option_item_id}
pub async fn remove_price_list_item_handler(
    State(state): State<AppState>,
    viewer: Viewer,
    Path((price_list_id, option_item_id)): Path<(String, String)>,
) -> ApiResult<PriceList> {
    let list = state
        .backend
        .remove_price_list_item(&viewer.token, &price_list_id, &option_item_id)
        .await?;
    announce_price_list(&state.bus, &list);
    Ok(Json(list))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    pub user_id: String,
}

/// POST /api/price-lists/{price_list_id}/assign
pub async fn assign_price_list_handler(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(price_list_id): Path<String>,
    Json(req): Json<AssignRequest>,
) -> ApiResult<PriceList> {
    let list = state
        .backend
        .assign_price_list(&viewer.token, &price_list_id, &req.user_id)
        .await?;
    announce_price_list(&state.bus, &list);
    state.bus.publish(BusEvent::UserChanged {
        user_id: req.user_id,
    });
    Ok(Json(list))
}
