//! Overtime API Handlers
//!
//! Duration, rate and amount are computed by the service; clients send
//! only the clock times and an optional manual hourly rate.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::error::ErrorCode;
use shared::models::{Overtime, OvertimeInput};

use crate::api::EmployeePeriodQuery;
use crate::auth::TenantIdentity;
use crate::db::repository::overtime as repo;
use crate::services::overtime;
use crate::state::AppState;
use crate::utils::time::month_bounds;
use crate::utils::validation::validate_amount;
use crate::utils::{AppError, AppResult};

/// GET /api/overtime?employee_id=&mois=&annee=
pub async fn list(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Query(query): Query<EmployeePeriodQuery>,
) -> AppResult<Json<Vec<Overtime>>> {
    let (from, to) = month_bounds(query.mois, query.annee)?;
    let rows =
        repo::find_between(&state.pool, &identity.tenant_id, query.employee_id, from, to).await?;
    Ok(Json(rows))
}

/// GET /api/overtime/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<Overtime>> {
    let item = repo::find_by_id(&state.pool, &identity.tenant_id, id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::OvertimeNotFound, format!("Overtime {id} not found"))
        })?;
    Ok(Json(item))
}

/// POST /api/overtime
pub async fn create(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Json(payload): Json<OvertimeInput>,
) -> AppResult<Json<Overtime>> {
    validate_amount(payload.taux_horaire, "taux_horaire")?;
    let item = overtime::create(&state.pool, &identity.tenant_id, &payload).await?;
    Ok(Json(item))
}

/// PUT /api/overtime/{id}
pub async fn update(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
    Json(payload): Json<OvertimeInput>,
) -> AppResult<Json<Overtime>> {
    validate_amount(payload.taux_horaire, "taux_horaire")?;
    let item = overtime::update(&state.pool, &identity.tenant_id, id, &payload).await?;
    Ok(Json(item))
}

/// DELETE /api/overtime/{id}
pub async fn delete(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<Overtime>> {
    let removed = overtime::delete(&state.pool, &identity.tenant_id, id).await?;
    Ok(Json(removed))
}
