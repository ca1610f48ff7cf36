//! Employee API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get},
};

use crate::auth::{Area, require_role};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/employees", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/search", get(handler::search))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route(
            "/{id}/salary-config",
            get(handler::list_salary_config).put(handler::upsert_salary_config),
        )
        .route(
            "/{id}/salary-config/{config_id}",
            delete(handler::delete_salary_config),
        )
        .route("/{id}/attendance/stats", get(handler::attendance_stats))
        .layer(middleware::from_fn(require_role(Area::Hr)))
}
