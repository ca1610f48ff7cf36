//! Purchase Order API Handlers
//!
//! Numbering, totals and the status machine live in
//! [`crate::services::purchase_order`]; delivering an order books one stock
//! entry per line.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{
    PurchaseOrder, PurchaseOrderCreate, PurchaseOrderDetail, PurchaseOrderLineInput,
    PurchaseOrderStatus, PurchaseOrderUpdate, StatusChange,
};

use crate::auth::TenantIdentity;
use crate::db::repository::purchase_order as repo;
use crate::services::purchase_order;
use crate::state::AppState;
use crate::utils::AppResult;

#[derive(Debug, Deserialize)]
pub struct OrderQuery {
    pub statut: Option<PurchaseOrderStatus>,
}

/// GET /api/purchase-orders?statut=
pub async fn list(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Query(query): Query<OrderQuery>,
) -> AppResult<Json<Vec<PurchaseOrder>>> {
    let orders = repo::find_all(&state.pool, &identity.tenant_id, query.statut).await?;
    Ok(Json(orders))
}

/// GET /api/purchase-orders/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<PurchaseOrderDetail>> {
    Ok(Json(purchase_order::detail(&state.pool, &identity.tenant_id, id).await?))
}

/// POST /api/purchase-orders
pub async fn create(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Json(payload): Json<PurchaseOrderCreate>,
) -> AppResult<Json<PurchaseOrderDetail>> {
    let order = purchase_order::create(&state.pool, &identity.tenant_id, &payload).await?;
    Ok(Json(order))
}

/// PUT /api/purchase-orders/{id}
pub async fn update(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
    Json(payload): Json<PurchaseOrderUpdate>,
) -> AppResult<Json<PurchaseOrder>> {
    let order = purchase_order::update(&state.pool, &identity.tenant_id, id, &payload).await?;
    Ok(Json(order))
}

/// PUT /api/purchase-orders/{id}/lines
pub async fn replace_lines(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
    Json(lignes): Json<Vec<PurchaseOrderLineInput>>,
) -> AppResult<Json<PurchaseOrderDetail>> {
    let order =
        purchase_order::replace_lines(&state.pool, &identity.tenant_id, id, &lignes).await?;
    Ok(Json(order))
}

/// PUT /api/purchase-orders/{id}/status
pub async fn change_status(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
    Json(payload): Json<StatusChange<PurchaseOrderStatus>>,
) -> AppResult<Json<PurchaseOrder>> {
    let order =
        purchase_order::change_status(&state.pool, &identity.tenant_id, id, payload.statut).await?;
    Ok(Json(order))
}

/// DELETE /api/purchase-orders/{id}
pub async fn delete(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    purchase_order::delete(&state.pool, &identity.tenant_id, id).await?;
    Ok(Json(true))
}
