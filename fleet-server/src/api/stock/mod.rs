//! Stock ledger and inventory API Module
//!
//! Entries and exits write their stock movement in the same transaction.

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::{Area, require_role};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/api/stock", stock_routes())
        .nest("/api/inventory", inventory_routes())
        .layer(middleware::from_fn(require_role(Area::Inventory)))
}

fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/entries", get(handler::list_entries).post(handler::create_entry))
        .route(
            "/entries/{id}",
            get(handler::get_entry)
                .put(handler::update_entry)
                .delete(handler::delete_entry),
        )
        .route("/exits", get(handler::list_exits).post(handler::create_exit))
        .route(
            "/exits/{id}",
            get(handler::get_exit)
                .put(handler::update_exit)
                .delete(handler::delete_exit),
        )
        .route("/movements", get(handler::list_movements))
}

fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/state", get(handler::inventory_state))
        .route("/export.csv", get(handler::export_csv))
}
