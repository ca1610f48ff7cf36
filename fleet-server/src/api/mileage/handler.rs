//! Mileage API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::error::ErrorCode;
use shared::models::{Mileage, MileageInput};

use crate::api::EmployeePeriodQuery;
use crate::auth::TenantIdentity;
use crate::db::repository::mileage as repo;
use crate::services::mileage;
use crate::state::AppState;
use crate::utils::time::month_bounds;
use crate::utils::validation::{MAX_NOTE_LEN, validate_amount, validate_text_len};
use crate::utils::{AppError, AppResult};

fn validate_input(payload: &MileageInput) -> AppResult<()> {
    validate_amount(payload.km_parcourus, "km_parcourus")?;
    validate_amount(payload.valeur_km, "valeur_km")?;
    validate_text_len(&payload.description, "description", MAX_NOTE_LEN)
}

/// GET /api/mileage?employee_id=&mois=&annee=
pub async fn list(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Query(query): Query<EmployeePeriodQuery>,
) -> AppResult<Json<Vec<Mileage>>> {
    let (from, to) = month_bounds(query.mois, query.annee)?;
    let rows =
        repo::find_between(&state.pool, &identity.tenant_id, query.employee_id, from, to).await?;
    Ok(Json(rows))
}

/// GET /api/mileage/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<Mileage>> {
    let item = repo::find_by_id(&state.pool, &identity.tenant_id, id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::MileageNotFound, format!("Mileage {id} not found"))
        })?;
    Ok(Json(item))
}

/// POST /api/mileage
pub async fn create(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Json(payload): Json<MileageInput>,
) -> AppResult<Json<Mileage>> {
    validate_input(&payload)?;
    let item = mileage::create(&state.pool, &identity.tenant_id, &payload).await?;
    Ok(Json(item))
}

/// PUT /api/mileage/{id}
pub async fn update(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
    Json(payload): Json<MileageInput>,
) -> AppResult<Json<Mileage>> {
    validate_input(&payload)?;
    let item = mileage::update(&state.pool, &identity.tenant_id, id, &payload).await?;
    Ok(Json(item))
}

/// DELETE /api/mileage/{id}
pub async fn delete(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<Mileage>> {
    let removed = mileage::delete(&state.pool, &identity.tenant_id, id).await?;
    Ok(Json(removed))
}
