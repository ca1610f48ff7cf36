//! Payroll API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::{Area, require_role};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/payroll", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/sync", post(handler::sync))
        .route("/coherence", get(handler::coherence))
        .route("/charges/simulate", post(handler::simulate_charges))
        .route("/export.csv", get(handler::export_csv))
        .route("/{id}", get(handler::get_by_id).put(handler::update))
        .layer(middleware::from_fn(require_role(Area::Hr)))
}
