//! Vehicle record API Module
//!
//! Records are listed and created under their vehicle
//! (`/api/vehicles/{id}/<kind>`) and read, edited or deleted by their own id
//! (`/api/<kind>/{id}`).

mod handler;

use axum::extract::{Path, State};
use axum::routing::{MethodRouter, delete, get};
use axum::{Router, middleware};

use crate::auth::{Area, TenantIdentity, require_role};
use crate::db::repository::fleet_record::RecordKind;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        // Documents
        .route(
            "/api/vehicles/{id}/documents",
            get(handler::list_documents).post(handler::add_document),
        )
        .route("/api/documents/expiring", get(handler::expiring_documents))
        .route(
            "/api/documents/{id}",
            delete_route(RecordKind::Document)
                .get(handler::get_document)
                .put(handler::update_document),
        )
        // Odometer and fuel
        .route(
            "/api/vehicles/{id}/distances",
            get(handler::list_distances).post(handler::add_distance),
        )
        .route(
            "/api/distances/{id}",
            delete_route(RecordKind::Distance)
                .get(handler::get_distance)
                .put(handler::update_distance),
        )
        .route(
            "/api/vehicles/{id}/fuel",
            get(handler::list_fuel).post(handler::add_fuel),
        )
        .route(
            "/api/fuel/{id}",
            delete_route(RecordKind::Fuel)
                .get(handler::get_fuel)
                .put(handler::update_fuel),
        )
        // Availability and costs
        .route(
            "/api/vehicles/{id}/availability",
            get(handler::list_availability).post(handler::add_availability),
        )
        .route(
            "/api/availability/{id}",
            delete_route(RecordKind::Availability)
                .get(handler::get_availability)
                .put(handler::update_availability),
        )
        .route(
            "/api/vehicles/{id}/operating-costs",
            get(handler::list_operating_costs).post(handler::add_operating_cost),
        )
        .route(
            "/api/operating-costs/{id}",
            delete_route(RecordKind::OperatingCost)
                .get(handler::get_operating_cost)
                .put(handler::update_operating_cost),
        )
        .route(
            "/api/vehicles/{id}/financial-costs",
            get(handler::list_financial_costs).post(handler::add_financial_cost),
        )
        .route(
            "/api/financial-costs/{id}",
            delete_route(RecordKind::FinancialCost)
                .get(handler::get_financial_cost)
                .put(handler::update_financial_cost),
        )
        // Incidents and usage
        .route(
            "/api/vehicles/{id}/incidents",
            get(handler::list_incidents).post(handler::add_incident),
        )
        .route(
            "/api/incidents/{id}",
            delete_route(RecordKind::Incident)
                .get(handler::get_incident)
                .put(handler::update_incident),
        )
        .route(
            "/api/vehicles/{id}/usages",
            get(handler::list_usages).post(handler::add_usage),
        )
        .route(
            "/api/usages/{id}",
            delete_route(RecordKind::Usage)
                .get(handler::get_usage)
                .put(handler::update_usage),
        )
        .route("/api/fleet/dashboard", get(handler::dashboard))
        .route("/api/fleet/compare", get(handler::compare))
        .layer(middleware::from_fn(require_role(Area::Fleet)))
}

fn delete_route(kind: RecordKind) -> MethodRouter<AppState> {
    delete(
        move |State(state): State<AppState>, identity: TenantIdentity, Path(id): Path<i64>| async move {
            handler::delete_record(&state, &identity, kind, id).await
        },
    )
}

