//! Authentication Handlers

use axum::{Json, extract::State};
use shared::models::{AccountInfo, LoginRequest, LoginResponse, RegisterRequest};

use crate::auth::TenantIdentity;
use crate::services::account;
use crate::state::AppState;
use crate::utils::AppResult;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<AccountInfo>> {
    let info = account::register(&state.pool, &req).await?;
    Ok(Json(info))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let response = account::login(&state.pool, &state.jwt, &req).await?;
    Ok(Json(response))
}

/// GET /api/me
pub async fn me(
    State(state): State<AppState>,
    identity: TenantIdentity,
) -> AppResult<Json<AccountInfo>> {
    let info = account::account_info(&state.pool, &identity).await?;
    Ok(Json(info))
}
