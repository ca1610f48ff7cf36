//! Vehicle Rental API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::auth::{Area, require_role};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/rentals", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/dashboard", get(handler::dashboard))
        .route(
            "/suppliers",
            get(handler::list_suppliers).post(handler::create_supplier),
        )
        .route(
            "/suppliers/{id}",
            get(handler::get_supplier)
                .put(handler::update_supplier)
                .delete(handler::delete_supplier),
        )
        .route("/invoices", get(handler::list_invoices))
        .route("/invoices/generate", post(handler::generate_invoices))
        .route("/invoices/{id}/status", put(handler::change_invoice_status))
        .route("/logs/{id}", delete(handler::delete_log))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/logs", get(handler::list_logs).post(handler::record_log))
        .route("/{id}/invoice", post(handler::generate_invoice))
        .layer(middleware::from_fn(require_role(Area::Rentals)))
}
