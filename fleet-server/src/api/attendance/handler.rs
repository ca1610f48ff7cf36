//! Attendance API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::models::{Attendance, AttendanceInput, BulkAttendanceInput};

use crate::api::EmployeePeriodQuery;
use crate::auth::TenantIdentity;
use crate::db::repository::attendance as repo;
use crate::services::attendance;
use crate::state::AppState;
use crate::utils::time::month_bounds;
use crate::utils::{AppError, AppResult};

const MAX_BULK_DAYS: usize = 31;

/// GET /api/attendance?employee_id=&mois=&annee=
pub async fn list(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Query(query): Query<EmployeePeriodQuery>,
) -> AppResult<Json<Vec<Attendance>>> {
    let (from, to) = month_bounds(query.mois, query.annee)?;
    let rows =
        repo::find_between(&state.pool, &identity.tenant_id, query.employee_id, from, to).await?;
    Ok(Json(rows))
}

/// POST /api/attendance
///
/// Upserts the (employee, date) entry.
pub async fn record(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Json(payload): Json<AttendanceInput>,
) -> AppResult<Json<Attendance>> {
    let row = attendance::record(&state.pool, &identity.tenant_id, &payload).await?;
    Ok(Json(row))
}

/// POST /api/attendance/bulk
pub async fn bulk_record(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Json(payload): Json<BulkAttendanceInput>,
) -> AppResult<Json<Vec<Attendance>>> {
    if payload.days.is_empty() {
        return Err(AppError::validation("days must not be empty"));
    }
    if payload.days.len() > MAX_BULK_DAYS {
        return Err(AppError::validation(format!(
            "Too many days ({}, max {MAX_BULK_DAYS})",
            payload.days.len()
        )));
    }
    let rows = attendance::bulk_record(&state.pool, &identity.tenant_id, &payload).await?;
    Ok(Json(rows))
}

/// DELETE /api/attendance/{id}
pub async fn delete(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<Attendance>> {
    let removed = attendance::delete(&state.pool, &identity.tenant_id, id).await?;
    Ok(Json(removed))
}
