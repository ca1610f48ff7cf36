//! Vehicle Rental API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::NaiveDate;
use serde::Deserialize;
use shared::error::ErrorCode;
use shared::models::{
    DailyLog, DailyLogInput, GenerateInvoicesReport, GenerateInvoicesRequest, Rental,
    RentalDashboard, RentalInput, RentalInvoice, RentalInvoiceStatus, RentalStatus,
    RentalSupplier, RentalSupplierInput, StatusChange,
};
use validator::ValidateEmail;

use crate::api::not_found_as;
use crate::auth::TenantIdentity;
use crate::db::repository::rental as repo;
use crate::services::rental;
use crate::state::AppState;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN,
    validate_required_text, validate_text_len,
};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct RentalQuery {
    pub statut: Option<RentalStatus>,
}

#[derive(Debug, Deserialize)]
pub struct LogQuery {
    pub du: Option<NaiveDate>,
    pub au: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct InvoiceQuery {
    pub rental_id: Option<i64>,
}

fn validate_supplier(payload: &RentalSupplierInput) -> AppResult<()> {
    validate_required_text(&payload.nom, "nom", MAX_NAME_LEN)?;
    validate_text_len(&payload.contact, "contact", MAX_NAME_LEN)?;
    validate_text_len(&payload.telephone, "telephone", MAX_SHORT_TEXT_LEN)?;
    validate_text_len(&payload.email, "email", MAX_EMAIL_LEN)?;
    if !payload.email.is_empty() && !payload.email.validate_email() {
        return Err(AppError::validation(format!(
            "'{}' is not a valid email",
            payload.email
        )));
    }
    validate_text_len(&payload.adresse, "adresse", MAX_ADDRESS_LEN)
}

async fn require_rental(state: &AppState, tenant_id: &str, id: i64) -> AppResult<Rental> {
    repo::find_rental(&state.pool, tenant_id, id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::RentalNotFound, format!("Rental {id} not found"))
        })
}

// ── Suppliers ───────────────────────────────────────────────────────

/// GET /api/rentals/suppliers
pub async fn list_suppliers(
    State(state): State<AppState>,
    identity: TenantIdentity,
) -> AppResult<Json<Vec<RentalSupplier>>> {
    Ok(Json(repo::list_suppliers(&state.pool, &identity.tenant_id).await?))
}

/// GET /api/rentals/suppliers/{id}
pub async fn get_supplier(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<RentalSupplier>> {
    let item = repo::find_supplier(&state.pool, &identity.tenant_id, id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::SupplierNotFound, format!("Supplier {id} not found"))
        })?;
    Ok(Json(item))
}

/// POST /api/rentals/suppliers
pub async fn create_supplier(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Json(payload): Json<RentalSupplierInput>,
) -> AppResult<Json<RentalSupplier>> {
    validate_supplier(&payload)?;
    let item = repo::create_supplier(&state.pool, &identity.tenant_id, &payload).await?;
    Ok(Json(item))
}

/// PUT /api/rentals/suppliers/{id}
pub async fn update_supplier(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
    Json(payload): Json<RentalSupplierInput>,
) -> AppResult<Json<RentalSupplier>> {
    validate_supplier(&payload)?;
    let item = repo::update_supplier(&state.pool, &identity.tenant_id, id, &payload)
        .await
        .map_err(not_found_as(ErrorCode::SupplierNotFound, format!("Supplier {id}")))?;
    Ok(Json(item))
}

/// DELETE /api/rentals/suppliers/{id}
pub async fn delete_supplier(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    repo::delete_supplier(&state.pool, &identity.tenant_id, id)
        .await
        .map_err(not_found_as(ErrorCode::SupplierNotFound, format!("Supplier {id}")))?;
    Ok(Json(true))
}

// ── Rentals ─────────────────────────────────────────────────────────

/// GET /api/rentals?statut=
pub async fn list(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Query(query): Query<RentalQuery>,
) -> AppResult<Json<Vec<Rental>>> {
    Ok(Json(repo::list_rentals(&state.pool, &identity.tenant_id, query.statut).await?))
}

/// GET /api/rentals/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<Rental>> {
    Ok(Json(require_rental(&state, &identity.tenant_id, id).await?))
}

/// POST /api/rentals
pub async fn create(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Json(payload): Json<RentalInput>,
) -> AppResult<Json<Rental>> {
    validate_text_len(&payload.observations, "observations", MAX_NOTE_LEN)?;
    let item = rental::create_rental(&state.pool, &identity.tenant_id, &payload).await?;
    Ok(Json(item))
}

/// PUT /api/rentals/{id}
pub async fn update(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
    Json(payload): Json<RentalInput>,
) -> AppResult<Json<Rental>> {
    validate_text_len(&payload.observations, "observations", MAX_NOTE_LEN)?;
    let item = rental::update_rental(&state.pool, &identity.tenant_id, id, &payload).await?;
    Ok(Json(item))
}

/// DELETE /api/rentals/{id}
pub async fn delete(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    repo::delete_rental(&state.pool, &identity.tenant_id, id)
        .await
        .map_err(not_found_as(ErrorCode::RentalNotFound, format!("Rental {id}")))?;
    Ok(Json(true))
}

// ── Daily logs ──────────────────────────────────────────────────────

/// GET /api/rentals/{id}/logs?du=&au=
///
/// Defaults to the whole rental period, up to today for an open-ended rental.
pub async fn list_logs(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
    Query(query): Query<LogQuery>,
) -> AppResult<Json<Vec<DailyLog>>> {
    let location = require_rental(&state, &identity.tenant_id, id).await?;
    let from = query.du.unwrap_or(location.date_debut);
    let to = query
        .au
        .or(location.date_fin)
        .unwrap_or_else(shared::util::today);
    let logs = repo::list_logs(&state.pool, &identity.tenant_id, id, from, to).await?;
    Ok(Json(logs))
}

/// POST /api/rentals/{id}/logs
///
/// One log per day; posting the same date again replaces it.
pub async fn record_log(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
    Json(payload): Json<DailyLogInput>,
) -> AppResult<Json<DailyLog>> {
    validate_text_len(&payload.commentaire, "commentaire", MAX_NOTE_LEN)?;
    let log = rental::record_log(&state.pool, &identity.tenant_id, id, &payload).await?;
    Ok(Json(log))
}

/// DELETE /api/rentals/logs/{id}
pub async fn delete_log(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    repo::delete_log(&state.pool, &identity.tenant_id, id)
        .await
        .map_err(not_found_as(ErrorCode::NotFound, format!("Daily log {id}")))?;
    Ok(Json(true))
}

// ── Invoices ────────────────────────────────────────────────────────

/// GET /api/rentals/invoices?rental_id=
pub async fn list_invoices(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Query(query): Query<InvoiceQuery>,
) -> AppResult<Json<Vec<RentalInvoice>>> {
    Ok(Json(repo::list_invoices(&state.pool, &identity.tenant_id, query.rental_id).await?))
}

/// POST /api/rentals/invoices/generate
pub async fn generate_invoices(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Json(payload): Json<GenerateInvoicesRequest>,
) -> AppResult<Json<GenerateInvoicesReport>> {
    let report = rental::generate_monthly_invoices(
        &state.pool,
        &identity.tenant_id,
        payload.annee,
        payload.mois,
    )
    .await?;
    Ok(Json(report))
}

/// PUT /api/rentals/invoices/{id}/status
pub async fn change_invoice_status(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
    Json(payload): Json<StatusChange<RentalInvoiceStatus>>,
) -> AppResult<Json<RentalInvoice>> {
    let invoice =
        rental::change_invoice_status(&state.pool, &identity.tenant_id, id, payload.statut).await?;
    Ok(Json(invoice))
}

/// POST /api/rentals/{id}/invoice
pub async fn generate_invoice(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<RentalInvoice>> {
    let invoice = rental::generate_single_invoice(&state.pool, &identity.tenant_id, id).await?;
    Ok(Json(invoice))
}

/// GET /api/rentals/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    identity: TenantIdentity,
) -> AppResult<Json<RentalDashboard>> {
    Ok(Json(rental::dashboard(&state.pool, &identity.tenant_id).await?))
}
