//! Data models
//!
//! Shared between the HTTP server and the management CLI.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! Most IDs are `i64` snowflakes; vehicles and products keep their
//! user-facing string identifiers.

pub mod account;
pub mod alert;
pub mod archive;
pub mod attendance;
pub mod employee;
pub mod fleet_record;
pub mod invoice;
pub mod overtime;
pub mod payroll;
pub mod product;
pub mod purchase_order;
pub mod rental;
pub mod trip_sheet;
pub mod vehicle;

// Re-exports
pub use account::*;
pub use alert::*;
pub use archive::*;
pub use attendance::*;
pub use employee::*;
pub use fleet_record::*;
pub use invoice::*;
pub use overtime::*;
pub use payroll::*;
pub use product::*;
pub use purchase_order::*;
pub use rental::*;
pub use trip_sheet::*;
pub use vehicle::*;
