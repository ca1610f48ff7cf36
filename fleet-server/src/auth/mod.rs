//! Tenant authentication
//!
//! - [`JwtService`] - HS256 token issue and validation
//! - [`TenantIdentity`] - authenticated caller and its tenant key
//! - [`require_auth`] - bearer token middleware
//! - [`require_role`] - per-area role gate
//! - [`password`] - argon2 hashing

pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, JwtConfig, JwtError, JwtService, TenantIdentity};
pub use middleware::{Area, require_auth, require_role};
