//! Vehicle record API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::NaiveDate;
use serde::Deserialize;
use shared::error::ErrorCode;
use shared::models::{
    AdminDocument, AdminDocumentInput, AvailabilityInput, AvailabilityRecord, DistanceRecord,
    DistanceRecordInput, FinancialCost, FinancialCostInput, FleetDashboard, FuelRecord,
    FuelRecordInput, Incident, IncidentInput, OperatingCost, OperatingCostInput,
    VehicleComparison, VehicleUsage, VehicleUsageInput,
};

use crate::api::not_found_as;
use crate::auth::TenantIdentity;
use crate::db::repository::fleet_record::{self, RecordKind};
use crate::services::{fleet, vehicle_stats};
use crate::state::AppState;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_amount, validate_required_text,
    validate_text_len,
};
use crate::utils::{AppError, AppResult};

const DEFAULT_EXPIRY_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Deserialize)]
pub struct ExpiringQuery {
    pub days: Option<i64>,
}

/// `?ids=V001,V002&du=&au=`
#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    #[serde(default)]
    pub ids: String,
    pub du: Option<NaiveDate>,
    pub au: Option<NaiveDate>,
}

fn period_error(field: &str) -> AppError {
    AppError::with_message(
        ErrorCode::InvalidPeriod,
        format!("{field}: end date is before start date"),
    )
}

fn validate_document(payload: &AdminDocumentInput) -> AppResult<()> {
    validate_required_text(&payload.type_document, "type_document", MAX_SHORT_TEXT_LEN)?;
    validate_text_len(&payload.numero, "numero", MAX_SHORT_TEXT_LEN)?;
    validate_text_len(&payload.commentaires, "commentaires", MAX_NOTE_LEN)?;
    if payload.date_expiration < payload.date_emission {
        return Err(period_error("date_expiration"));
    }
    Ok(())
}

fn validate_availability(payload: &AvailabilityInput) -> AppResult<()> {
    validate_amount(payload.heures_disponibles, "heures_disponibles")?;
    validate_amount(payload.heures_totales, "heures_totales")?;
    if payload.heures_disponibles > payload.heures_totales {
        return Err(AppError::validation(
            "heures_disponibles cannot exceed heures_totales",
        ));
    }
    if payload.date_fin < payload.date_debut {
        return Err(period_error("date_fin"));
    }
    validate_text_len(&payload.raison, "raison", MAX_NOTE_LEN)
}

fn validate_cost(type_cout: &str, montant: f64, description: &str) -> AppResult<()> {
    validate_required_text(type_cout, "type_cout", MAX_NAME_LEN)?;
    validate_amount(montant, "montant")?;
    validate_text_len(description, "description", MAX_NOTE_LEN)
}

fn record_or_not_found<T>(row: Option<T>, what: &str, id: i64) -> AppResult<Json<T>> {
    row.map(Json).ok_or_else(|| {
        AppError::with_message(ErrorCode::FleetRecordNotFound, format!("{what} {id} not found"))
    })
}

fn validate_usage(payload: &VehicleUsageInput) -> AppResult<()> {
    if payload.date_fin < payload.date_debut {
        return Err(period_error("date_fin"));
    }
    validate_text_len(&payload.motif, "motif", MAX_NOTE_LEN)
}

fn validate_incident(payload: &IncidentInput) -> AppResult<()> {
    validate_text_len(&payload.lieu, "lieu", MAX_NAME_LEN)?;
    validate_text_len(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_text_len(&payload.mesures_prises, "mesures_prises", MAX_NOTE_LEN)
}

// ── Documents ───────────────────────────────────────────────────────

/// GET /api/vehicles/{id}/documents
pub async fn list_documents(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(vehicle_id): Path<String>,
) -> AppResult<Json<Vec<AdminDocument>>> {
    let docs = fleet::list_documents(&state.pool, &identity.tenant_id, &vehicle_id).await?;
    Ok(Json(docs))
}

/// POST /api/vehicles/{id}/documents
pub async fn add_document(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(vehicle_id): Path<String>,
    Json(payload): Json<AdminDocumentInput>,
) -> AppResult<Json<AdminDocument>> {
    validate_document(&payload)?;
    let doc = fleet::add_document(&state.pool, &identity.tenant_id, &vehicle_id, &payload).await?;
    Ok(Json(doc))
}

/// GET /api/documents/{id}
pub async fn get_document(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<AdminDocument>> {
    let doc = fleet_record::find_document(&state.pool, &identity.tenant_id, id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::DocumentNotFound, format!("Document {id} not found"))
        })?;
    Ok(Json(doc.with_expiry(shared::util::today())))
}

/// PUT /api/documents/{id}
pub async fn update_document(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
    Json(payload): Json<AdminDocumentInput>,
) -> AppResult<Json<AdminDocument>> {
    validate_document(&payload)?;
    let doc = fleet::update_document(&state.pool, &identity.tenant_id, id, &payload).await?;
    Ok(Json(doc))
}

/// GET /api/documents/expiring?days=
///
/// Includes documents already past their expiration date.
pub async fn expiring_documents(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Query(query): Query<ExpiringQuery>,
) -> AppResult<Json<Vec<AdminDocument>>> {
    let days = query.days.unwrap_or(DEFAULT_EXPIRY_WINDOW_DAYS);
    if days < 0 {
        return Err(AppError::validation(format!("days must be non-negative, got {days}")));
    }
    let docs = fleet::expiring_documents(&state.pool, &identity.tenant_id, days).await?;
    Ok(Json(docs))
}

// ── Distances and fuel ──────────────────────────────────────────────

/// GET /api/vehicles/{id}/distances
pub async fn list_distances(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(vehicle_id): Path<String>,
) -> AppResult<Json<Vec<DistanceRecord>>> {
    let rows = fleet_record::list_distances(&state.pool, &identity.tenant_id, &vehicle_id).await?;
    Ok(Json(rows))
}

/// POST /api/vehicles/{id}/distances
pub async fn add_distance(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(vehicle_id): Path<String>,
    Json(payload): Json<DistanceRecordInput>,
) -> AppResult<Json<DistanceRecord>> {
    if payload.date_fin < payload.date_debut {
        return Err(period_error("date_fin"));
    }
    let row = fleet::add_distance(&state.pool, &identity.tenant_id, &vehicle_id, &payload).await?;
    Ok(Json(row))
}

/// GET /api/distances/{id}
pub async fn get_distance(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<DistanceRecord>> {
    let row = fleet_record::find_distance(&state.pool, &identity.tenant_id, id).await?;
    record_or_not_found(row, "Distance record", id)
}

/// PUT /api/distances/{id}
pub async fn update_distance(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
    Json(payload): Json<DistanceRecordInput>,
) -> AppResult<Json<DistanceRecord>> {
    if payload.date_fin < payload.date_debut {
        return Err(period_error("date_fin"));
    }
    let row = fleet::update_distance(&state.pool, &identity.tenant_id, id, &payload).await?;
    Ok(Json(row))
}

/// GET /api/vehicles/{id}/fuel
pub async fn list_fuel(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(vehicle_id): Path<String>,
) -> AppResult<Json<Vec<FuelRecord>>> {
    let rows = fleet_record::list_fuel(&state.pool, &identity.tenant_id, &vehicle_id).await?;
    Ok(Json(rows))
}

/// POST /api/vehicles/{id}/fuel
pub async fn add_fuel(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(vehicle_id): Path<String>,
    Json(payload): Json<FuelRecordInput>,
) -> AppResult<Json<FuelRecord>> {
    validate_amount(payload.litres_ajoutes, "litres_ajoutes")?;
    let row = fleet::add_fuel(&state.pool, &identity.tenant_id, &vehicle_id, &payload).await?;
    Ok(Json(row))
}

/// GET /api/fuel/{id}
pub async fn get_fuel(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<FuelRecord>> {
    let row = fleet_record::find_fuel(&state.pool, &identity.tenant_id, id).await?;
    record_or_not_found(row, "Fuel record", id)
}

/// PUT /api/fuel/{id}
pub async fn update_fuel(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
    Json(payload): Json<FuelRecordInput>,
) -> AppResult<Json<FuelRecord>> {
    validate_amount(payload.litres_ajoutes, "litres_ajoutes")?;
    let row = fleet::update_fuel(&state.pool, &identity.tenant_id, id, &payload).await?;
    Ok(Json(row))
}

// ── Availability and costs ──────────────────────────────────────────

/// GET /api/vehicles/{id}/availability
pub async fn list_availability(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(vehicle_id): Path<String>,
) -> AppResult<Json<Vec<AvailabilityRecord>>> {
    let rows =
        fleet_record::list_availability(&state.pool, &identity.tenant_id, &vehicle_id).await?;
    Ok(Json(rows))
}

/// POST /api/vehicles/{id}/availability
pub async fn add_availability(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(vehicle_id): Path<String>,
    Json(payload): Json<AvailabilityInput>,
) -> AppResult<Json<AvailabilityRecord>> {
    validate_availability(&payload)?;
    let row =
        fleet::add_availability(&state.pool, &identity.tenant_id, &vehicle_id, &payload).await?;
    Ok(Json(row))
}

/// GET /api/availability/{id}
pub async fn get_availability(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<AvailabilityRecord>> {
    let row = fleet_record::find_availability(&state.pool, &identity.tenant_id, id).await?;
    record_or_not_found(row, "Availability record", id)
}

/// PUT /api/availability/{id}
pub async fn update_availability(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
    Json(payload): Json<AvailabilityInput>,
) -> AppResult<Json<AvailabilityRecord>> {
    validate_availability(&payload)?;
    let row = fleet::update_availability(&state.pool, &identity.tenant_id, id, &payload).await?;
    Ok(Json(row))
}

/// GET /api/vehicles/{id}/operating-costs
pub async fn list_operating_costs(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(vehicle_id): Path<String>,
) -> AppResult<Json<Vec<OperatingCost>>> {
    let rows =
        fleet_record::list_operating_costs(&state.pool, &identity.tenant_id, &vehicle_id).await?;
    Ok(Json(rows))
}

/// POST /api/vehicles/{id}/operating-costs
pub async fn add_operating_cost(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(vehicle_id): Path<String>,
    Json(payload): Json<OperatingCostInput>,
) -> AppResult<Json<OperatingCost>> {
    validate_cost(&payload.type_cout, payload.montant, &payload.description)?;
    validate_amount(payload.km_actuel, "km_actuel")?;
    let row =
        fleet::add_operating_cost(&state.pool, &identity.tenant_id, &vehicle_id, &payload).await?;
    Ok(Json(row))
}

/// GET /api/operating-costs/{id}
pub async fn get_operating_cost(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<OperatingCost>> {
    let row = fleet_record::find_operating_cost(&state.pool, &identity.tenant_id, id).await?;
    record_or_not_found(row, "Operating cost", id)
}

/// PUT /api/operating-costs/{id}
pub async fn update_operating_cost(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
    Json(payload): Json<OperatingCostInput>,
) -> AppResult<Json<OperatingCost>> {
    validate_cost(&payload.type_cout, payload.montant, &payload.description)?;
    validate_amount(payload.km_actuel, "km_actuel")?;
    let row = fleet::update_operating_cost(&state.pool, &identity.tenant_id, id, &payload).await?;
    Ok(Json(row))
}

/// GET /api/vehicles/{id}/financial-costs
pub async fn list_financial_costs(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(vehicle_id): Path<String>,
) -> AppResult<Json<Vec<FinancialCost>>> {
    let rows =
        fleet_record::list_financial_costs(&state.pool, &identity.tenant_id, &vehicle_id).await?;
    Ok(Json(rows))
}

/// POST /api/vehicles/{id}/financial-costs
pub async fn add_financial_cost(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(vehicle_id): Path<String>,
    Json(payload): Json<FinancialCostInput>,
) -> AppResult<Json<FinancialCost>> {
    validate_cost(&payload.type_cout, payload.montant, &payload.description)?;
    validate_amount(payload.kilometrage, "kilometrage")?;
    let row =
        fleet::add_financial_cost(&state.pool, &identity.tenant_id, &vehicle_id, &payload).await?;
    Ok(Json(row))
}

/// GET /api/financial-costs/{id}
pub async fn get_financial_cost(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<FinancialCost>> {
    let row = fleet_record::find_financial_cost(&state.pool, &identity.tenant_id, id).await?;
    record_or_not_found(row, "Financial cost", id)
}

/// PUT /api/financial-costs/{id}
pub async fn update_financial_cost(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
    Json(payload): Json<FinancialCostInput>,
) -> AppResult<Json<FinancialCost>> {
    validate_cost(&payload.type_cout, payload.montant, &payload.description)?;
    validate_amount(payload.kilometrage, "kilometrage")?;
    let row = fleet::update_financial_cost(&state.pool, &identity.tenant_id, id, &payload).await?;
    Ok(Json(row))
}

// ── Incidents and usage ─────────────────────────────────────────────

/// GET /api/vehicles/{id}/incidents
pub async fn list_incidents(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(vehicle_id): Path<String>,
) -> AppResult<Json<Vec<Incident>>> {
    let rows = fleet_record::list_incidents(&state.pool, &identity.tenant_id, &vehicle_id).await?;
    Ok(Json(rows))
}

/// POST /api/vehicles/{id}/incidents
pub async fn add_incident(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(vehicle_id): Path<String>,
    Json(payload): Json<IncidentInput>,
) -> AppResult<Json<Incident>> {
    validate_incident(&payload)?;
    let row = fleet::add_incident(&state.pool, &identity.tenant_id, &vehicle_id, &payload).await?;
    Ok(Json(row))
}

/// GET /api/incidents/{id}
pub async fn get_incident(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<Incident>> {
    let row = fleet_record::find_incident(&state.pool, &identity.tenant_id, id).await?;
    record_or_not_found(row, "Incident", id)
}

/// PUT /api/incidents/{id}
pub async fn update_incident(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
    Json(payload): Json<IncidentInput>,
) -> AppResult<Json<Incident>> {
    validate_incident(&payload)?;
    let row = fleet::update_incident(&state.pool, &identity.tenant_id, id, &payload).await?;
    Ok(Json(row))
}

/// GET /api/vehicles/{id}/usages
pub async fn list_usages(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(vehicle_id): Path<String>,
) -> AppResult<Json<Vec<VehicleUsage>>> {
    let rows = fleet_record::list_usages(&state.pool, &identity.tenant_id, &vehicle_id).await?;
    Ok(Json(rows))
}

/// POST /api/vehicles/{id}/usages
pub async fn add_usage(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(vehicle_id): Path<String>,
    Json(payload): Json<VehicleUsageInput>,
) -> AppResult<Json<VehicleUsage>> {
    validate_usage(&payload)?;
    let row = fleet::add_usage(&state.pool, &identity.tenant_id, &vehicle_id, &payload).await?;
    Ok(Json(row))
}

/// GET /api/usages/{id}
pub async fn get_usage(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<VehicleUsage>> {
    let row = fleet_record::find_usage(&state.pool, &identity.tenant_id, id).await?;
    record_or_not_found(row, "Usage", id)
}

/// PUT /api/usages/{id}
pub async fn update_usage(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
    Json(payload): Json<VehicleUsageInput>,
) -> AppResult<Json<VehicleUsage>> {
    validate_usage(&payload)?;
    let row = fleet::update_usage(&state.pool, &identity.tenant_id, id, &payload).await?;
    Ok(Json(row))
}

/// DELETE /api/<kind>/{id}
pub async fn delete_record(
    state: &AppState,
    identity: &TenantIdentity,
    kind: RecordKind,
    id: i64,
) -> AppResult<Json<bool>> {
    let (code, what) = match kind {
        RecordKind::Document => (ErrorCode::DocumentNotFound, "Document"),
        _ => (ErrorCode::FleetRecordNotFound, "Record"),
    };
    fleet_record::delete(&state.pool, kind, &identity.tenant_id, id)
        .await
        .map_err(not_found_as(code, format!("{what} {id}")))?;
    tracing::debug!(tenant_id = %identity.tenant_id, ?kind, id, "Fleet record deleted");
    Ok(Json(true))
}

/// GET /api/fleet/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    identity: TenantIdentity,
) -> AppResult<Json<FleetDashboard>> {
    let summary = fleet::dashboard(&state.pool, &identity.tenant_id).await?;
    Ok(Json(summary))
}

/// GET /api/fleet/compare?ids=&du=&au=
///
/// Without `ids`, compares the first vehicles of the fleet.
pub async fn compare(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Query(query): Query<CompareQuery>,
) -> AppResult<Json<VehicleComparison>> {
    let (du, au) = vehicle_stats::resolve_range(query.du, query.au)?;
    let ids: Vec<String> = query
        .ids
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_owned)
        .collect();
    let comparison =
        vehicle_stats::compare(&state.pool, &identity.tenant_id, &ids, du, au).await?;
    Ok(Json(comparison))
}
