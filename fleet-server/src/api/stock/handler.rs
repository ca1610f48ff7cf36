//! Stock ledger and inventory API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    response::Response,
};
use serde::Deserialize;
use shared::error::ErrorCode;
use shared::models::{
    InventoryState, StockEntry, StockEntryInput, StockExit, StockExitInput, StockMovement,
};

use crate::api::csv_response;
use crate::auth::TenantIdentity;
use crate::db::repository::stock as repo;
use crate::services::{export, stock};
use crate::state::AppState;
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, validate_text_len};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct ProductFilter {
    pub product_id: Option<String>,
}

// ── Entries ─────────────────────────────────────────────────────────

/// GET /api/stock/entries?product_id=
pub async fn list_entries(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Query(filter): Query<ProductFilter>,
) -> AppResult<Json<Vec<StockEntry>>> {
    let rows =
        repo::list_entries(&state.pool, &identity.tenant_id, filter.product_id.as_deref()).await?;
    Ok(Json(rows))
}

/// GET /api/stock/entries/{id}
pub async fn get_entry(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<StockEntry>> {
    let item = repo::find_entry(&state.pool, &identity.tenant_id, id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::StockEntryNotFound,
                format!("Stock entry {id} not found"),
            )
        })?;
    Ok(Json(item))
}

/// POST /api/stock/entries
pub async fn create_entry(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Json(payload): Json<StockEntryInput>,
) -> AppResult<Json<StockEntry>> {
    validate_text_len(&payload.fournisseur, "fournisseur", MAX_NAME_LEN)?;
    let item = stock::create_entry(&state.pool, &identity.tenant_id, &payload).await?;
    Ok(Json(item))
}

/// PUT /api/stock/entries/{id}
pub async fn update_entry(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
    Json(payload): Json<StockEntryInput>,
) -> AppResult<Json<StockEntry>> {
    validate_text_len(&payload.fournisseur, "fournisseur", MAX_NAME_LEN)?;
    let item = stock::update_entry(&state.pool, &identity.tenant_id, id, &payload).await?;
    Ok(Json(item))
}

/// DELETE /api/stock/entries/{id}
pub async fn delete_entry(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<StockEntry>> {
    let removed = stock::delete_entry(&state.pool, &identity.tenant_id, id).await?;
    Ok(Json(removed))
}

// ── Exits ───────────────────────────────────────────────────────────

/// GET /api/stock/exits?product_id=
pub async fn list_exits(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Query(filter): Query<ProductFilter>,
) -> AppResult<Json<Vec<StockExit>>> {
    let rows =
        repo::list_exits(&state.pool, &identity.tenant_id, filter.product_id.as_deref()).await?;
    Ok(Json(rows))
}

/// GET /api/stock/exits/{id}
pub async fn get_exit(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<StockExit>> {
    let item = repo::find_exit(&state.pool, &identity.tenant_id, id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::StockExitNotFound, format!("Stock exit {id} not found"))
        })?;
    Ok(Json(item))
}

/// POST /api/stock/exits
pub async fn create_exit(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Json(payload): Json<StockExitInput>,
) -> AppResult<Json<StockExit>> {
    validate_text_len(&payload.motif, "motif", MAX_NOTE_LEN)?;
    let item = stock::create_exit(&state.pool, &identity.tenant_id, &payload).await?;
    Ok(Json(item))
}

/// PUT /api/stock/exits/{id}
pub async fn update_exit(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
    Json(payload): Json<StockExitInput>,
) -> AppResult<Json<StockExit>> {
    validate_text_len(&payload.motif, "motif", MAX_NOTE_LEN)?;
    let item = stock::update_exit(&state.pool, &identity.tenant_id, id, &payload).await?;
    Ok(Json(item))
}

/// DELETE /api/stock/exits/{id}
pub async fn delete_exit(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<StockExit>> {
    let removed = stock::delete_exit(&state.pool, &identity.tenant_id, id).await?;
    Ok(Json(removed))
}

/// GET /api/stock/movements?product_id=
pub async fn list_movements(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Query(filter): Query<ProductFilter>,
) -> AppResult<Json<Vec<StockMovement>>> {
    let rows =
        repo::list_movements(&state.pool, &identity.tenant_id, filter.product_id.as_deref())
            .await?;
    Ok(Json(rows))
}

// ── Inventory ───────────────────────────────────────────────────────

/// GET /api/inventory/state
pub async fn inventory_state(
    State(state): State<AppState>,
    identity: TenantIdentity,
) -> AppResult<Json<InventoryState>> {
    Ok(Json(stock::inventory_state(&state.pool, &identity.tenant_id).await?))
}

/// GET /api/inventory/export.csv
pub async fn export_csv(
    State(state): State<AppState>,
    identity: TenantIdentity,
) -> AppResult<Response> {
    let body = export::export_inventory(&state.pool, &identity.tenant_id).await?;
    Ok(csv_response("inventaire.csv", body))
}
