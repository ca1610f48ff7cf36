//! Fleet server: fleet, HR/payroll, inventory, invoicing and rental management
//!
//! # Modules
//!
//! - [`config`] - environment configuration
//! - [`state`] - shared application state
//! - [`db`] - SQLite pool, migrations and repositories
//! - [`services`] - domain computations and transactional workflows
//! - [`auth`] - JWT tenant authentication and role gates
//! - [`api`] - HTTP handlers
//! - [`routes`] - router assembly and middleware stack

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use config::Config;
pub use state::AppState;
