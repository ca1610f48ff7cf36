//! Invoice API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{
    Invoice, InvoiceCreate, InvoiceDetail, InvoiceLineInput, InvoiceStatus, InvoiceUpdate,
    StatusChange,
};

use crate::auth::TenantIdentity;
use crate::db::repository::invoice as repo;
use crate::services::invoicing;
use crate::state::AppState;
use crate::utils::AppResult;

#[derive(Debug, Deserialize)]
pub struct InvoiceQuery {
    pub statut: Option<InvoiceStatus>,
}

/// GET /api/invoices?statut=
pub async fn list(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Query(query): Query<InvoiceQuery>,
) -> AppResult<Json<Vec<Invoice>>> {
    let invoices = repo::find_all(&state.pool, &identity.tenant_id, query.statut).await?;
    Ok(Json(invoices))
}

/// GET /api/invoices/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<InvoiceDetail>> {
    Ok(Json(invoicing::detail(&state.pool, &identity.tenant_id, id).await?))
}

/// POST /api/invoices
pub async fn create(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Json(payload): Json<InvoiceCreate>,
) -> AppResult<Json<InvoiceDetail>> {
    let invoice = invoicing::create(&state.pool, &identity.tenant_id, &payload).await?;
    Ok(Json(invoice))
}

/// PUT /api/invoices/{id}
pub async fn update(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
    Json(payload): Json<InvoiceUpdate>,
) -> AppResult<Json<Invoice>> {
    let invoice = invoicing::update(&state.pool, &identity.tenant_id, id, &payload).await?;
    Ok(Json(invoice))
}

/// PUT /api/invoices/{id}/lines
pub async fn replace_lines(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
    Json(lignes): Json<Vec<InvoiceLineInput>>,
) -> AppResult<Json<InvoiceDetail>> {
    let invoice = invoicing::replace_lines(&state.pool, &identity.tenant_id, id, &lignes).await?;
    Ok(Json(invoice))
}

/// PUT /api/invoices/{id}/status
pub async fn change_status(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
    Json(payload): Json<StatusChange<InvoiceStatus>>,
) -> AppResult<Json<Invoice>> {
    let invoice =
        invoicing::change_status(&state.pool, &identity.tenant_id, id, payload.statut).await?;
    Ok(Json(invoice))
}

/// DELETE /api/invoices/{id}
pub async fn delete(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    invoicing::delete(&state.pool, &identity.tenant_id, id).await?;
    Ok(Json(true))
}
