//! Vehicle API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::ErrorCode;
use shared::models::{Vehicle, VehicleCreate, VehicleStats, VehicleStatus, VehicleUpdate};

use crate::api::{RangeQuery, not_found_as};
use crate::auth::TenantIdentity;
use crate::db::repository::vehicle;
use crate::services::{fleet, vehicle_stats};
use crate::state::AppState;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_amount, validate_optional_text,
    validate_required_text, validate_text_len,
};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct VehicleQuery {
    pub statut: Option<VehicleStatus>,
}

fn validate_create(payload: &VehicleCreate) -> AppResult<()> {
    validate_required_text(&payload.id_vehicule, "id_vehicule", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.immatriculation, "immatriculation", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.marque, "marque", MAX_NAME_LEN)?;
    validate_required_text(&payload.modele, "modele", MAX_NAME_LEN)?;
    validate_amount(payload.kilometrage_initial, "kilometrage_initial")?;
    validate_text_len(&payload.affectation, "affectation", MAX_NAME_LEN)?;
    validate_text_len(&payload.numero_chassis, "numero_chassis", MAX_SHORT_TEXT_LEN)?;
    validate_text_len(&payload.numero_moteur, "numero_moteur", MAX_SHORT_TEXT_LEN)?;
    validate_text_len(&payload.observations, "observations", MAX_NOTE_LEN)?;
    Ok(())
}

fn validate_update(payload: &VehicleUpdate) -> AppResult<()> {
    if let Some(immatriculation) = &payload.immatriculation {
        validate_required_text(immatriculation, "immatriculation", MAX_SHORT_TEXT_LEN)?;
    }
    if let Some(marque) = &payload.marque {
        validate_required_text(marque, "marque", MAX_NAME_LEN)?;
    }
    if let Some(modele) = &payload.modele {
        validate_required_text(modele, "modele", MAX_NAME_LEN)?;
    }
    if let Some(km) = payload.kilometrage_initial {
        validate_amount(km, "kilometrage_initial")?;
    }
    validate_optional_text(&payload.affectation, "affectation", MAX_NAME_LEN)?;
    validate_optional_text(&payload.observations, "observations", MAX_NOTE_LEN)?;
    Ok(())
}

/// GET /api/vehicles?statut=
pub async fn list(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Query(query): Query<VehicleQuery>,
) -> AppResult<Json<Vec<Vehicle>>> {
    let vehicles = vehicle::find_all(&state.pool, &identity.tenant_id, query.statut).await?;
    Ok(Json(vehicles))
}

/// GET /api/vehicles/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<String>,
) -> AppResult<Json<Vehicle>> {
    let item = vehicle::find_by_id(&state.pool, &identity.tenant_id, &id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::VehicleNotFound, format!("Vehicle {id} not found"))
        })?;
    Ok(Json(item))
}

/// POST /api/vehicles
pub async fn create(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Json(payload): Json<VehicleCreate>,
) -> AppResult<Json<Vehicle>> {
    validate_create(&payload)?;
    let item = fleet::create_vehicle(&state.pool, &identity.tenant_id, &payload).await?;
    Ok(Json(item))
}

/// PUT /api/vehicles/{id}
pub async fn update(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<String>,
    Json(payload): Json<VehicleUpdate>,
) -> AppResult<Json<Vehicle>> {
    validate_update(&payload)?;
    let item = fleet::update_vehicle(&state.pool, &identity.tenant_id, &id, payload).await?;
    Ok(Json(item))
}

/// DELETE /api/vehicles/{id}
pub async fn delete(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    vehicle::delete(&state.pool, &identity.tenant_id, &id)
        .await
        .map_err(not_found_as(ErrorCode::VehicleNotFound, format!("Vehicle {id}")))?;
    tracing::info!(tenant_id = %identity.tenant_id, vehicle_id = %id, "Vehicle deleted");
    Ok(Json(true))
}

/// GET /api/vehicles/{id}/stats?du=&au=
pub async fn stats(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<String>,
    Query(range): Query<RangeQuery>,
) -> AppResult<Json<VehicleStats>> {
    let (du, au) = vehicle_stats::resolve_range(range.du, range.au)?;
    let stats = vehicle_stats::vehicle_stats(&state.pool, &identity.tenant_id, &id, du, au).await?;
    Ok(Json(stats))
}
