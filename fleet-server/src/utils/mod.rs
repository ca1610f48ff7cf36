//! Utility functions shared by handlers and services
//!
//! - [`validation`] - text length limits and request field checks
//! - [`time`] - clock-time and month-period parsing
//! - [`money`] - Decimal money arithmetic (2 dp, half-up)
//! - [`logger`] - tracing subscriber setup

pub mod logger;
pub mod money;
pub mod time;
pub mod validation;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCode};
