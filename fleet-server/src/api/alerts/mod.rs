//! Alert API Module

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::{Area, require_role};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/alerts", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .layer(middleware::from_fn(require_role(Area::Fleet)))
}
