//! Authentication Routes

mod handler;

use axum::{Router, routing::get, routing::post};

use crate::state::AppState;

/// - /api/auth/register, /api/auth/login: public
/// - /api/me: authenticated (global `require_auth` layer)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(handler::register))
        .route("/api/auth/login", post(handler::login))
        .route("/api/me", get(handler::me))
}
