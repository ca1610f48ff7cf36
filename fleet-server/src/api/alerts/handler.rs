//! Alert API Handlers
//!
//! Resolution stamping (`date_resolution`) happens in the repository update.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::ErrorCode;
use shared::models::{Alert, AlertCreate, AlertLevel, AlertStatus, AlertUpdate};

use crate::api::not_found_as;
use crate::auth::TenantIdentity;
use crate::db::repository::{alert, vehicle};
use crate::state::AppState;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text,
    validate_required_text, validate_text_len,
};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct AlertQuery {
    pub statut: Option<AlertStatus>,
    pub niveau: Option<AlertLevel>,
}

fn validate_create(payload: &AlertCreate) -> AppResult<()> {
    validate_required_text(&payload.titre, "titre", MAX_NAME_LEN)?;
    validate_text_len(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_text_len(&payload.type_alerte, "type_alerte", MAX_SHORT_TEXT_LEN)?;
    Ok(())
}

fn validate_update(payload: &AlertUpdate) -> AppResult<()> {
    if let Some(titre) = &payload.titre {
        validate_required_text(titre, "titre", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.type_alerte, "type_alerte", MAX_SHORT_TEXT_LEN)?;
    Ok(())
}

/// GET /api/alerts?statut=&niveau=
pub async fn list(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Query(query): Query<AlertQuery>,
) -> AppResult<Json<Vec<Alert>>> {
    let alerts = alert::find_all(&state.pool, &identity.tenant_id, query.statut, query.niveau).await?;
    Ok(Json(alerts))
}

/// GET /api/alerts/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<Alert>> {
    let item = alert::find_by_id(&state.pool, &identity.tenant_id, id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::AlertNotFound, format!("Alert {id} not found"))
        })?;
    Ok(Json(item))
}

/// POST /api/alerts
pub async fn create(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Json(payload): Json<AlertCreate>,
) -> AppResult<Json<Alert>> {
    validate_create(&payload)?;
    if let Some(vehicle_id) = &payload.vehicle_id
        && !vehicle::exists(&state.pool, &identity.tenant_id, vehicle_id).await?
    {
        return Err(AppError::with_message(
            ErrorCode::VehicleNotFound,
            format!("Vehicle {vehicle_id} not found"),
        ));
    }
    let item = alert::create(&state.pool, &identity.tenant_id, &payload).await?;
    tracing::info!(
        tenant_id = %identity.tenant_id,
        alert_id = item.id,
        niveau = ?item.niveau,
        "Alert raised"
    );
    Ok(Json(item))
}

/// PUT /api/alerts/{id}
pub async fn update(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
    Json(payload): Json<AlertUpdate>,
) -> AppResult<Json<Alert>> {
    validate_update(&payload)?;
    let item = alert::update(&state.pool, &identity.tenant_id, id, payload)
        .await
        .map_err(not_found_as(ErrorCode::AlertNotFound, format!("Alert {id}")))?;
    Ok(Json(item))
}

/// DELETE /api/alerts/{id}
pub async fn delete(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    alert::delete(&state.pool, &identity.tenant_id, id)
        .await
        .map_err(not_found_as(ErrorCode::AlertNotFound, format!("Alert {id}")))?;
    Ok(Json(true))
}
