//! Router assembly and the middleware stack

use axum::Router;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::api;
use crate::auth::require_auth;
use crate::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Every route, without middleware or state
pub fn build_router() -> Router<AppState> {
    Router::new()
        // Public
        .merge(api::health::router())
        .merge(api::auth::router())
        // Fleet
        .merge(api::vehicles::router())
        .merge(api::drivers::router())
        .merge(api::fleet_records::router())
        .merge(api::trip_sheets::router())
        .merge(api::alerts::router())
        // HR & payroll
        .merge(api::employees::router())
        .merge(api::attendance::router())
        .merge(api::overtime::router())
        .merge(api::mileage::router())
        .merge(api::payroll::router())
        .merge(api::archives::router())
        // Inventory, purchasing & invoicing
        .merge(api::products::router())
        .merge(api::stock::router())
        .merge(api::purchase_orders::router())
        .merge(api::invoices::router())
        // Rentals
        .merge(api::rentals::router())
}

fn cors_layer(allow_origin: Option<&str>) -> CorsLayer {
    let Some(origin) = allow_origin else {
        return CorsLayer::permissive();
    };
    match HeaderValue::from_str(origin) {
        Ok(value) => CorsLayer::new()
            .allow_origin(value)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => {
            tracing::warn!(origin, "CORS_ALLOW_ORIGIN is not a valid header value, allowing any origin");
            CorsLayer::permissive()
        }
    }
}

/// Fully configured application: routes, tower-http layers and JWT authentication
pub fn build_app(state: &AppState) -> Router<AppState> {
    build_router()
        .layer(cors_layer(state.config.cors_allow_origin.as_deref()))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        // Outermost: injects TenantIdentity before any route runs
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use shared::error::ErrorCode;
    use shared::models::Role;
    use tower::ServiceExt;

    use crate::auth::TenantIdentity;
    use crate::config::Config;
    use crate::db::repository::testing::test_pool;

    async fn app() -> (Router, AppState) {
        let state = AppState::new(test_pool().await, Config::development());
        (build_app(&state).with_state(state.clone()), state)
    }

    fn token_for(state: &AppState, user_id: i64, role: Role, tenant_id: &str) -> String {
        state
            .jwt
            .generate_token(&TenantIdentity {
                user_id,
                username: format!("user{user_id}"),
                role,
                entreprise_id: None,
                tenant_id: tenant_id.to_string(),
            })
            .unwrap()
    }

    fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn vehicle_body(id: &str) -> Value {
        json!({
            "id_vehicule": id,
            "immatriculation": "RC-1234-A",
            "marque": "Toyota",
            "modele": "Hilux",
            "type_moteur": "Diesel",
            "categorie": "Voiture"
        })
    }

    #[tokio::test]
    async fn health_is_public_and_tagged() {
        let (app, _) = app().await;
        let response = app.oneshot(request("GET", "/health", None, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn api_requires_a_token() {
        let (app, _) = app().await;
        let response = app
            .oneshot(request("GET", "/api/vehicles", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["code"], json!(u16::from(ErrorCode::NotAuthenticated)));
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let (app, _) = app().await;
        let response = app
            .oneshot(request("GET", "/api/vehicles", Some("not-a-jwt"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn register_then_login_then_me() {
        let (app, _) = app().await;
        let register = json!({
            "username": "mamadou",
            "email": "mamadou@example.com",
            "password": "motdepasse1",
            "account_type": "personne"
        });
        let response = app
            .clone()
            .oneshot(request("POST", "/api/auth/register", None, Some(register)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let login = json!({ "username": "mamadou", "password": "motdepasse1" });
        let response = app
            .clone()
            .oneshot(request("POST", "/api/auth/login", None, Some(login)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let token = body["token"].as_str().unwrap().to_string();

        let response = app
            .oneshot(request("GET", "/api/me", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let me = body_json(response).await;
        assert_eq!(me["username"], "mamadou");
    }

    #[tokio::test]
    async fn other_tenant_sees_not_found() {
        let (app, state) = app().await;
        let owner = token_for(&state, 1, Role::Standard, "usr:1");
        let stranger = token_for(&state, 2, Role::Standard, "usr:2");

        let response = app
            .clone()
            .oneshot(request("POST", "/api/vehicles", Some(&owner), Some(vehicle_body("VH001"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(request("GET", "/api/vehicles/VH001", Some(&owner), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(request("GET", "/api/vehicles/VH001", Some(&stranger), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["code"], json!(u16::from(ErrorCode::VehicleNotFound)));
    }

    #[tokio::test]
    async fn role_gate_refuses_other_areas() {
        let (app, state) = app().await;
        let rh = token_for(&state, 3, Role::Rh, "usr:3");

        let response = app
            .clone()
            .oneshot(request("GET", "/api/invoices", Some(&rh), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .oneshot(request("GET", "/api/employees", Some(&rh), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn vehicle_record_edit_and_stats() {
        let (app, state) = app().await;
        let token = token_for(&state, 1, Role::Standard, "usr:1");
        let response = app
            .clone()
            .oneshot(request("POST", "/api/vehicles", Some(&token), Some(vehicle_body("VH001"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let availability = json!({
            "date_debut": "2025-06-01",
            "date_fin": "2025-06-30",
            "heures_disponibles": 18.0,
            "heures_totales": 24.0
        });
        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/vehicles/VH001/availability",
                Some(&token),
                Some(availability),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let created = body_json(response).await;
        let id = created["id"].as_i64().unwrap();
        assert_eq!(created["pourcentage"], json!(75.0));

        let edited = json!({
            "date_debut": "2025-06-01",
            "date_fin": "2025-06-30",
            "heures_disponibles": 12.0,
            "heures_totales": 24.0
        });
        let uri = format!("/api/availability/{id}");
        let response = app
            .clone()
            .oneshot(request("PUT", &uri, Some(&token), Some(edited)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(request("GET", &uri, Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["pourcentage"], json!(50.0));

        let response = app
            .clone()
            .oneshot(request(
                "GET",
                "/api/vehicles/VH001/stats?du=2025-06-01&au=2025-06-30",
                Some(&token),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let stats = body_json(response).await;
        assert_eq!(stats["jours_periode"], json!(30));
        assert_eq!(stats["disponibilite"], json!(50.0));

        let response = app
            .clone()
            .oneshot(request(
                "GET",
                "/api/fleet/compare?ids=VH001&du=2025-06-01&au=2025-06-30",
                Some(&token),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let comparison = body_json(response).await;
        assert_eq!(comparison["vehicules"].as_array().unwrap().len(), 1);

        let response = app
            .oneshot(request(
                "GET",
                "/api/vehicles/VH001/stats?du=2025-06-30&au=2025-06-01",
                Some(&token),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn inventory_export_is_csv() {
        let (app, state) = app().await;
        let token = token_for(&state, 1, Role::Stock, "usr:1");
        let response = app
            .oneshot(request("GET", "/api/inventory/export.csv", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/csv"));
    }
}
