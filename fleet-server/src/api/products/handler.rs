//! Product API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::ErrorCode;
use shared::models::{Product, ProductCategory, ProductCreate, ProductUpdate};

use crate::api::SearchQuery;
use crate::auth::TenantIdentity;
use crate::db::repository::product;
use crate::services::stock;
use crate::state::AppState;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub categorie: Option<ProductCategory>,
}

/// GET /api/products?categorie=
pub async fn list(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<Vec<Product>>> {
    let products = product::find_all(&state.pool, &identity.tenant_id, query.categorie).await?;
    Ok(Json(products))
}

/// GET /api/products/search?q=
pub async fn search(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Product>>> {
    let products = product::search(&state.pool, &identity.tenant_id, query.q.trim()).await?;
    Ok(Json(products))
}

/// GET /api/products/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let item = product::find_by_id(&state.pool, &identity.tenant_id, &id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::ProductNotFound, format!("Product {id} not found"))
        })?;
    Ok(Json(item))
}

/// POST /api/products
pub async fn create(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<Product>> {
    let item = stock::create_product(&state.pool, &identity.tenant_id, &payload).await?;
    Ok(Json(item))
}

/// PUT /api/products/{id}
pub async fn update(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<Product>> {
    let item = stock::update_product(&state.pool, &identity.tenant_id, &id, payload).await?;
    Ok(Json(item))
}

/// DELETE /api/products/{id}
///
/// Refused while the product has stock entries or exits.
pub async fn delete(
    State(state): State<AppState>,
    identity: TenantIdentity,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    stock::delete_product(&state.pool, &identity.tenant_id, &id).await?;
    Ok(Json(true))
}
