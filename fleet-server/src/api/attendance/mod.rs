//! Attendance API Module
//!
//! Every write re-synchronizes the employee's payroll for the month in
//! the same transaction.

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use crate::auth::{Area, require_role};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/attendance", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list).post(handler::record))
        .route("/bulk", post(handler::bulk_record))
        .route("/{id}", delete(handler::delete))
        .layer(middleware::from_fn(require_role(Area::Hr)))
}
