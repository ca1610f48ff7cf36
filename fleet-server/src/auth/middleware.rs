//! Authentication middleware and role gates

use std::future::Future;
use std::pin::Pin;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use shared::error::{AppError, ErrorCode};
use shared::models::Role;

use super::{JwtError, JwtService, TenantIdentity};
use crate::state::AppState;

const PUBLIC_ROUTES: [&str; 2] = ["/api/auth/login", "/api/auth/register"];

/// Validate the bearer token and inject the caller's [`TenantIdentity`].
///
/// Skipped for `OPTIONS`, non-`/api/` paths and the login/register routes.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();
    if req.method() == http::Method::OPTIONS
        || !path.starts_with("/api/")
        || PUBLIC_ROUTES.contains(&path)
    {
        return Ok(next.run(req).await);
    }

    let header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());
    let Some(header) = header else {
        tracing::warn!(uri = %req.uri(), "Missing authorization header");
        return Err(AppError::not_authenticated());
    };
    let token = JwtService::extract_from_header(header)
        .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?;

    let identity = state
        .jwt
        .validate_token(token)
        .and_then(TenantIdentity::try_from)
        .map_err(|e| {
            tracing::warn!(error = %e, uri = %req.uri(), "Token rejected");
            match e {
                JwtError::ExpiredToken => AppError::token_expired(),
                _ => AppError::invalid_token("Invalid token"),
            }
        })?;

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

impl<S: Send + Sync> FromRequestParts<S> for TenantIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantIdentity>()
            .cloned()
            .ok_or_else(AppError::not_authenticated)
    }
}

/// Functional area guarded by a role gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Area {
    /// Employees, attendance, overtime, payroll, archives
    Hr,
    /// Products, stock, purchase orders
    Inventory,
    Invoicing,
    /// Vehicles, drivers, records, trip sheets, alerts
    Fleet,
    Rentals,
}

impl Area {
    pub fn allows(self, role: Role) -> bool {
        match role {
            Role::Admin | Role::Standard => true,
            Role::Autre => false,
            Role::Rh => matches!(self, Area::Hr | Area::Fleet | Area::Rentals),
            Role::Stock => matches!(self, Area::Inventory | Area::Fleet | Area::Rentals),
            Role::Comptable => matches!(self, Area::Invoicing | Area::Fleet | Area::Rentals),
        }
    }
}

impl TenantIdentity {
    pub fn require(&self, area: Area) -> Result<(), AppError> {
        if area.allows(self.role) {
            return Ok(());
        }
        tracing::warn!(
            user_id = self.user_id,
            role = self.role.as_str(),
            ?area,
            "Role gate refused"
        );
        Err(AppError::with_message(
            ErrorCode::RoleRequired,
            format!("Role '{}' cannot access {area:?}", self.role.as_str()),
        ))
    }
}

/// Route layer refusing callers whose role does not cover `area`.
///
/// ```ignore
/// Router::new()
///     .route("/", get(handler::list))
///     .layer(middleware::from_fn(require_role(Area::Hr)));
/// ```
pub fn require_role(
    area: Area,
) -> impl Fn(Request, Next) -> Pin<Box<dyn Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let identity = req
                .extensions()
                .get::<TenantIdentity>()
                .ok_or_else(AppError::not_authenticated)?;
            identity.require(area)?;
            Ok(next.run(req).await)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_matrix() {
        assert!(Area::Hr.allows(Role::Standard));
        assert!(Area::Invoicing.allows(Role::Admin));
        assert!(Area::Hr.allows(Role::Rh));
        assert!(!Area::Inventory.allows(Role::Rh));
        assert!(Area::Inventory.allows(Role::Stock));
        assert!(!Area::Invoicing.allows(Role::Stock));
        assert!(Area::Invoicing.allows(Role::Comptable));
        assert!(!Area::Hr.allows(Role::Comptable));
        assert!(Area::Fleet.allows(Role::Comptable));
        assert!(!Area::Fleet.allows(Role::Autre));
        assert!(!Area::Rentals.allows(Role::Autre));
    }
}
