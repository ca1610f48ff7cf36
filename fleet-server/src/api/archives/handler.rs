//! Monthly Archive API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Serialize;
use shared::models::{ArchiveCreate, ArchiveOutcome, MonthInfo, MonthlyArchive, ReferenceCheck};

use crate::api::PeriodQuery;
use crate::auth::TenantIdentity;
use crate::services::archive;
use crate::state::AppState;
use crate::utils::AppResult;
use crate::utils::validation::{MAX_NOTE_LEN, validate_text_len};

/// Month with its neighbours, for period pickers
#[derive(Debug, Serialize)]
pub struct MonthNavigation {
    pub courant: MonthInfo,
    pub precedent: MonthInfo,
    pub suivant: MonthInfo,
}

/// GET /api/archives
pub async fn list(
    State(state): State<AppState>,
    identity: TenantIdentity,
) -> AppResult<Json<Vec<MonthlyArchive>>> {
    Ok(Json(archive::list(&state.pool, &identity.tenant_id).await?))
}

/// GET /api/archives/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<MonthlyArchive>> {
    Ok(Json(archive::get(&state.pool, &identity.tenant_id, id).await?))
}

/// POST /api/archives
///
/// Snapshots the month then clears its attendance, payroll and overtime rows.
pub async fn create(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Json(payload): Json<ArchiveCreate>,
) -> AppResult<Json<ArchiveOutcome>> {
    validate_text_len(&payload.commentaires, "commentaires", MAX_NOTE_LEN)?;
    let outcome = archive::create_archive(&state.pool, &identity.tenant_id, &payload).await?;
    Ok(Json(outcome))
}

/// POST /api/archives/{id}/close
pub async fn close(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<MonthlyArchive>> {
    Ok(Json(archive::close_archive(&state.pool, &identity.tenant_id, id).await?))
}

/// POST /api/archives/{id}/archive
pub async fn archive_period(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<MonthlyArchive>> {
    Ok(Json(archive::archive_period(&state.pool, &identity.tenant_id, id).await?))
}

/// GET /api/archives/reference-check
pub async fn reference_check(
    State(state): State<AppState>,
    identity: TenantIdentity,
) -> AppResult<Json<ReferenceCheck>> {
    Ok(Json(archive::reference_check(&state.pool, &identity.tenant_id).await?))
}

/// GET /api/archives/months?mois=&annee=
pub async fn month_navigation(Query(period): Query<PeriodQuery>) -> AppResult<Json<MonthNavigation>> {
    Ok(Json(MonthNavigation {
        courant: archive::month_info(period.mois, period.annee)?,
        precedent: archive::previous_month_info(period.mois, period.annee)?,
        suivant: archive::next_month_info(period.mois, period.annee)?,
    }))
}
