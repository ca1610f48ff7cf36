//! Monthly Archive API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::{Area, require_role};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/archives", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/reference-check", get(handler::reference_check))
        .route("/months", get(handler::month_navigation))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/close", post(handler::close))
        .route("/{id}/archive", post(handler::archive_period))
        .layer(middleware::from_fn(require_role(Area::Hr)))
}
