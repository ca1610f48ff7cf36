//! Employee API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::ErrorCode;
use shared::models::{
    AttendanceStats, Employee, EmployeeCreate, EmployeeStatus, EmployeeUpdate, SalaryConfig,
    SalaryConfigInput,
};

use crate::api::{PeriodQuery, SearchQuery, duplicate_as, not_found_as};
use crate::auth::TenantIdentity;
use crate::db::repository::{employee, salary_config};
use crate::services::{attendance, employee as employee_service};
use crate::state::AppState;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_amount, validate_optional_text,
    validate_required_text, validate_text_len,
};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct EmployeeQuery {
    pub statut: Option<EmployeeStatus>,
}

fn validate_rates(values: &[(Option<f64>, &str)]) -> AppResult<()> {
    for (value, field) in values {
        if let Some(v) = value {
            validate_amount(*v, field)?;
        }
    }
    Ok(())
}

fn validate_create(payload: &EmployeeCreate) -> AppResult<()> {
    validate_required_text(&payload.matricule, "matricule", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.prenom, "prenom", MAX_NAME_LEN)?;
    validate_required_text(&payload.nom, "nom", MAX_NAME_LEN)?;
    validate_text_len(&payload.fonction, "fonction", MAX_NAME_LEN)?;
    validate_optional_text(&payload.telephone, "telephone", MAX_SHORT_TEXT_LEN)?;
    validate_rates(&[
        (Some(payload.salaire_journalier), "salaire_journalier"),
        (Some(payload.avances), "avances"),
        (
            Some(payload.montant_heure_supp_jour_ouvrable),
            "montant_heure_supp_jour_ouvrable",
        ),
        (
            Some(payload.montant_heure_supp_dimanche_ferie),
            "montant_heure_supp_dimanche_ferie",
        ),
        (Some(payload.valeur_km), "valeur_km"),
        (Some(payload.taux_cnss_salarie_custom), "taux_cnss_salarie_custom"),
        (Some(payload.taux_cnss_employeur_custom), "taux_cnss_employeur_custom"),
        (Some(payload.taux_vf_custom), "taux_vf_custom"),
    ])
}

fn validate_update(payload: &EmployeeUpdate) -> AppResult<()> {
    if let Some(matricule) = &payload.matricule {
        validate_required_text(matricule, "matricule", MAX_SHORT_TEXT_LEN)?;
    }
    if let Some(prenom) = &payload.prenom {
        validate_required_text(prenom, "prenom", MAX_NAME_LEN)?;
    }
    if let Some(nom) = &payload.nom {
        validate_required_text(nom, "nom", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.fonction, "fonction", MAX_NAME_LEN)?;
    validate_optional_text(&payload.telephone, "telephone", MAX_SHORT_TEXT_LEN)?;
    validate_rates(&[
        (payload.salaire_journalier, "salaire_journalier"),
        (payload.avances, "avances"),
        (
            payload.montant_heure_supp_jour_ouvrable,
            "montant_heure_supp_jour_ouvrable",
        ),
        (
            payload.montant_heure_supp_dimanche_ferie,
            "montant_heure_supp_dimanche_ferie",
        ),
        (payload.valeur_km, "valeur_km"),
        (payload.taux_cnss_salarie_custom, "taux_cnss_salarie_custom"),
        (payload.taux_cnss_employeur_custom, "taux_cnss_employeur_custom"),
        (payload.taux_vf_custom, "taux_vf_custom"),
    ])
}

async fn require_employee(state: &AppState, tenant_id: &str, id: i64) -> AppResult<Employee> {
    employee::find_by_id(&state.pool, tenant_id, id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::EmployeeNotFound, format!("Employee {id} not found"))
        })
}

/// GET /api/employees?statut=
pub async fn list(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Query(query): Query<EmployeeQuery>,
) -> AppResult<Json<Vec<Employee>>> {
    let employees = employee::find_all(&state.pool, &identity.tenant_id, query.statut).await?;
    Ok(Json(employees))
}

/// GET /api/employees/search?q=
pub async fn search(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Employee>>> {
    let employees = employee::search(&state.pool, &identity.tenant_id, query.q.trim()).await?;
    Ok(Json(employees))
}

/// GET /api/employees/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<Employee>> {
    Ok(Json(require_employee(&state, &identity.tenant_id, id).await?))
}

/// POST /api/employees
pub async fn create(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Json(payload): Json<EmployeeCreate>,
) -> AppResult<Json<Employee>> {
    validate_create(&payload)?;
    let item = employee::create(&state.pool, &identity.tenant_id, payload)
        .await
        .map_err(duplicate_as(ErrorCode::MatriculeExists))?;
    tracing::info!(
        tenant_id = %identity.tenant_id,
        employee_id = item.id,
        matricule = %item.matricule,
        "Employee created"
    );
    Ok(Json(item))
}

/// PUT /api/employees/{id}
pub async fn update(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
    Json(payload): Json<EmployeeUpdate>,
) -> AppResult<Json<Employee>> {
    validate_update(&payload)?;
    let item = employee_service::update(&state.pool, &identity.tenant_id, id, payload).await?;
    Ok(Json(item))
}

/// DELETE /api/employees/{id}
pub async fn delete(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    employee::delete(&state.pool, &identity.tenant_id, id)
        .await
        .map_err(not_found_as(ErrorCode::EmployeeNotFound, format!("Employee {id}")))?;
    tracing::info!(tenant_id = %identity.tenant_id, employee_id = id, "Employee deleted");
    Ok(Json(true))
}

/// GET /api/employees/{id}/salary-config
pub async fn list_salary_config(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<SalaryConfig>>> {
    require_employee(&state, &identity.tenant_id, id).await?;
    let configs = salary_config::find_for_employee(&state.pool, &identity.tenant_id, id).await?;
    Ok(Json(configs))
}

/// PUT /api/employees/{id}/salary-config
///
/// One line per attendance status; an existing line for the status is replaced.
pub async fn upsert_salary_config(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
    Json(payload): Json<SalaryConfigInput>,
) -> AppResult<Json<SalaryConfig>> {
    validate_amount(payload.montant_journalier, "montant_journalier")?;
    let config =
        employee_service::upsert_salary_config(&state.pool, &identity.tenant_id, id, &payload)
            .await?;
    Ok(Json(config))
}

/// DELETE /api/employees/{id}/salary-config/{config_id}
pub async fn delete_salary_config(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path((id, config_id)): Path<(i64, i64)>,
) -> AppResult<Json<bool>> {
    employee_service::delete_salary_config(&state.pool, &identity.tenant_id, id, config_id).await?;
    Ok(Json(true))
}

/// GET /api/employees/{id}/attendance/stats?mois=&annee=
pub async fn attendance_stats(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
    Query(period): Query<PeriodQuery>,
) -> AppResult<Json<AttendanceStats>> {
    require_employee(&state, &identity.tenant_id, id).await?;
    let stats =
        attendance::monthly_stats(&state.pool, &identity.tenant_id, id, period.mois, period.annee)
            .await?;
    Ok(Json(stats))
}
