//! Domain computations and transactional workflows
//!
//! Pure calculations (charges, overtime duration, trip figures, rental
//! overlaps) are plain functions. Workflows that touch several tables open
//! one transaction and call the repositories with `&mut *tx`; functions
//! meant to run inside a caller's transaction take `&mut SqliteConnection`.

pub mod account;
pub mod archive;
pub mod attendance;
pub mod charges;
pub mod coherence;
pub mod employee;
pub mod export;
pub mod fleet;
pub mod invoicing;
pub mod maintenance;
pub mod mileage;
pub mod overtime;
pub mod payroll;
pub mod purchase_order;
pub mod rental;
pub mod stock;
pub mod vehicle_stats;

use shared::error::{AppError, ErrorCode};

use crate::error::{ServiceError, ServiceResult};

/// `None` → typed not-found error
pub(crate) fn found<T>(value: Option<T>, code: ErrorCode, what: String) -> ServiceResult<T> {
    value.ok_or_else(|| ServiceError::App(AppError::with_message(code, format!("{what} not found"))))
}
