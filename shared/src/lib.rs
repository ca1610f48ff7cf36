//! Shared types for the fleet management service
//!
//! Domain models, the error code system and small utilities used by the
//! server and the management CLI.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};
