//! Trip Sheet API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::ErrorCode;
use shared::models::{TripSheet, TripSheetInput};

use crate::api::not_found_as;
use crate::auth::TenantIdentity;
use crate::db::repository::trip_sheet;
use crate::services::fleet;
use crate::state::AppState;
use crate::utils::time::parse_clock;
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct TripSheetQuery {
    pub vehicle_id: Option<String>,
}

fn validate_input(payload: &TripSheetInput) -> AppResult<()> {
    validate_required_text(&payload.destination, "destination", MAX_NAME_LEN)?;
    parse_clock(&payload.heure_depart)?;
    if let Some(heure) = &payload.heure_retour {
        parse_clock(heure)?;
    }
    if let Some(retour) = payload.date_retour
        && retour < payload.date_depart
    {
        return Err(AppError::with_message(
            ErrorCode::InvalidPeriod,
            "date_retour is before date_depart",
        ));
    }
    Ok(())
}

/// GET /api/trip-sheets?vehicle_id=
pub async fn list(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Query(query): Query<TripSheetQuery>,
) -> AppResult<Json<Vec<TripSheet>>> {
    let sheets =
        trip_sheet::find_all(&state.pool, &identity.tenant_id, query.vehicle_id.as_deref()).await?;
    Ok(Json(sheets))
}

/// GET /api/trip-sheets/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<TripSheet>> {
    let item = trip_sheet::find_by_id(&state.pool, &identity.tenant_id, id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::TripSheetNotFound, format!("Trip sheet {id} not found"))
        })?;
    Ok(Json(item))
}

/// POST /api/trip-sheets
pub async fn create(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Json(payload): Json<TripSheetInput>,
) -> AppResult<Json<TripSheet>> {
    validate_input(&payload)?;
    let sheet = fleet::create_trip_sheet(
        &state.pool,
        &identity.tenant_id,
        &payload,
        state.overconsumption_rule(),
    )
    .await?;
    Ok(Json(sheet))
}

/// PUT /api/trip-sheets/{id}
pub async fn update(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
    Json(payload): Json<TripSheetInput>,
) -> AppResult<Json<TripSheet>> {
    validate_input(&payload)?;
    let sheet = fleet::update_trip_sheet(
        &state.pool,
        &identity.tenant_id,
        id,
        &payload,
        state.overconsumption_rule(),
    )
    .await?;
    Ok(Json(sheet))
}

/// DELETE /api/trip-sheets/{id}
pub async fn delete(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    trip_sheet::delete(&state.pool, &identity.tenant_id, id)
        .await
        .map_err(not_found_as(ErrorCode::TripSheetNotFound, format!("Trip sheet {id}")))?;
    Ok(Json(true))
}
