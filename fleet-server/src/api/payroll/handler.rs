//! Payroll API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    response::Response,
};
use shared::error::ErrorCode;
use shared::models::{
    Charges, ChargesRequest, CoherenceReport, Payroll, PayrollUpdate, SyncReport, SyncRequest,
};

use crate::api::{PeriodQuery, csv_response};
use crate::auth::TenantIdentity;
use crate::db::repository::payroll as repo;
use crate::services::{charges, coherence, export, payroll};
use crate::state::AppState;
use crate::utils::time::month_bounds;
use crate::utils::validation::validate_amount;
use crate::utils::{AppError, AppResult};

fn validate_update(payload: &PayrollUpdate) -> AppResult<()> {
    let amounts = [
        (payload.salaire_base, "salaire_base"),
        (payload.indemnite_transport, "indemnite_transport"),
        (payload.indemnite_logement, "indemnite_logement"),
        (payload.cherete_vie, "cherete_vie"),
        (payload.prime_discipline, "prime_discipline"),
        (payload.prime_ferie, "prime_ferie"),
        (payload.avance_sur_salaire, "avance_sur_salaire"),
        (payload.sanction_vol_carburant, "sanction_vol_carburant"),
    ];
    for (value, field) in amounts {
        if let Some(v) = value {
            validate_amount(v, field)?;
        }
    }
    if let Some(conge) = payload.conge
        && conge < 0
    {
        return Err(AppError::validation(format!("conge must be non-negative, got {conge}")));
    }
    Ok(())
}

/// GET /api/payroll?mois=&annee=
pub async fn list(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Query(period): Query<PeriodQuery>,
) -> AppResult<Json<Vec<Payroll>>> {
    month_bounds(period.mois, period.annee)?;
    let rows =
        repo::list_for_period(&state.pool, &identity.tenant_id, period.mois, period.annee).await?;
    Ok(Json(rows))
}

/// GET /api/payroll/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<Payroll>> {
    let item = repo::find_by_id(&state.pool, &identity.tenant_id, id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::PayrollNotFound, format!("Payroll {id} not found"))
        })?;
    Ok(Json(item))
}

/// PUT /api/payroll/{id}
///
/// Edits the manual fields; gross, charges and net are recomputed.
pub async fn update(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
    Json(payload): Json<PayrollUpdate>,
) -> AppResult<Json<Payroll>> {
    validate_update(&payload)?;
    let item = payroll::update_payroll(&state.pool, &identity.tenant_id, id, payload).await?;
    Ok(Json(item))
}

/// POST /api/payroll/sync
pub async fn sync(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Json(payload): Json<SyncRequest>,
) -> AppResult<Json<SyncReport>> {
    let report = payroll::sync_all(&state.pool, &identity.tenant_id, &payload).await?;
    Ok(Json(report))
}

/// GET /api/payroll/coherence?mois=&annee=
pub async fn coherence(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Query(period): Query<PeriodQuery>,
) -> AppResult<Json<CoherenceReport>> {
    let report =
        coherence::check_coherence(&state.pool, &identity.tenant_id, period.mois, period.annee)
            .await?;
    Ok(Json(report))
}

/// POST /api/payroll/charges/simulate
pub async fn simulate_charges(Json(payload): Json<ChargesRequest>) -> AppResult<Json<Charges>> {
    validate_amount(payload.salaire_brut, "salaire_brut")?;
    validate_amount(payload.taux_cnss_salarie, "taux_cnss_salarie")?;
    validate_amount(payload.taux_cnss_employeur, "taux_cnss_employeur")?;
    validate_amount(payload.taux_vf, "taux_vf")?;
    Ok(Json(charges::compute_charges(&payload)))
}

/// GET /api/payroll/export.csv?mois=&annee=
pub async fn export_csv(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Query(period): Query<PeriodQuery>,
) -> AppResult<Response> {
    let body =
        export::export_payroll(&state.pool, &identity.tenant_id, period.mois, period.annee).await?;
    let filename = format!("paie_{:04}_{:02}.csv", period.annee, period.mois);
    Ok(csv_response(&filename, body))
}
