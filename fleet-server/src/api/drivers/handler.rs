//! Driver API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::ErrorCode;
use shared::models::{Driver, DriverInput};
use validator::ValidateEmail;

use crate::api::not_found_as;
use crate::auth::TenantIdentity;
use crate::db::repository::driver;
use crate::state::AppState;
use crate::utils::validation::{
    MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text,
    validate_required_text, validate_text_len,
};
use crate::utils::{AppError, AppResult};

fn validate_input(payload: &DriverInput) -> AppResult<()> {
    validate_required_text(&payload.nom, "nom", MAX_NAME_LEN)?;
    validate_required_text(&payload.prenom, "prenom", MAX_NAME_LEN)?;
    validate_required_text(&payload.numero_permis, "numero_permis", MAX_SHORT_TEXT_LEN)?;
    validate_text_len(&payload.telephone, "telephone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.email, "email", MAX_EMAIL_LEN)?;
    if let Some(email) = payload.email.as_deref().filter(|e| !e.is_empty())
        && !email.validate_email()
    {
        return Err(AppError::validation(format!("'{email}' is not a valid email")));
    }
    if let Some(expiration) = payload.date_expiration_permis
        && expiration < payload.date_embauche
    {
        return Err(AppError::validation(
            "date_expiration_permis is before date_embauche",
        ));
    }
    Ok(())
}

/// GET /api/drivers
pub async fn list(
    State(state): State<AppState>,
    identity: TenantIdentity,
) -> AppResult<Json<Vec<Driver>>> {
    let drivers = driver::find_all(&state.pool, &identity.tenant_id).await?;
    Ok(Json(drivers))
}

/// GET /api/drivers/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<Driver>> {
    let item = driver::find_by_id(&state.pool, &identity.tenant_id, id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::DriverNotFound, format!("Driver {id} not found"))
        })?;
    Ok(Json(item))
}

/// POST /api/drivers
pub async fn create(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Json(payload): Json<DriverInput>,
) -> AppResult<Json<Driver>> {
    validate_input(&payload)?;
    let item = driver::create(&state.pool, &identity.tenant_id, &payload).await?;
    tracing::info!(tenant_id = %identity.tenant_id, driver_id = item.id, "Driver registered");
    Ok(Json(item))
}

/// PUT /api/drivers/{id}
pub async fn update(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
    Json(payload): Json<DriverInput>,
) -> AppResult<Json<Driver>> {
    validate_input(&payload)?;
    let item = driver::update(&state.pool, &identity.tenant_id, id, &payload)
        .await
        .map_err(not_found_as(ErrorCode::DriverNotFound, format!("Driver {id}")))?;
    Ok(Json(item))
}

/// DELETE /api/drivers/{id}
pub async fn delete(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    driver::delete(&state.pool, &identity.tenant_id, id)
        .await
        .map_err(not_found_as(ErrorCode::DriverNotFound, format!("Driver {id}")))?;
    Ok(Json(true))
}
