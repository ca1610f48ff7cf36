//! HTTP API
//!
//! One module per area; each exposes a `router()` merged by
//! [`crate::routes::build_app`]. Handlers extract the caller's
//! [`crate::auth::TenantIdentity`] and pass its tenant key down to the
//! services, so a record of another tenant is never visible.
//!
//! - [`health`] - liveness check (public)
//! - [`auth`] - register, login, current account
//! - [`vehicles`], [`drivers`], [`fleet_records`], [`trip_sheets`], [`alerts`] - fleet
//! - [`employees`], [`attendance`], [`overtime`], [`mileage`] - HR
//! - [`payroll`], [`archives`] - payroll and monthly archive
//! - [`products`], [`stock`], [`purchase_orders`] - inventory and purchasing
//! - [`invoices`] - invoicing
//! - [`rentals`] - vehicle rentals

pub mod auth;
pub mod health;

// Fleet
pub mod alerts;
pub mod drivers;
pub mod fleet_records;
pub mod trip_sheets;
pub mod vehicles;

// HR & payroll
pub mod archives;
pub mod attendance;
pub mod employees;
pub mod mileage;
pub mod overtime;
pub mod payroll;

// Inventory, purchasing & invoicing
pub mod invoices;
pub mod products;
pub mod purchase_orders;
pub mod stock;

// Rentals
pub mod rentals;

use axum::http::header;
use axum::response::{IntoResponse, Response};
use chrono::NaiveDate;
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};

use crate::db::repository::RepoError;

pub use crate::utils::AppResult;

/// `?mois=&annee=` query
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PeriodQuery {
    pub mois: u32,
    pub annee: i32,
}

/// `?employee_id=&mois=&annee=` listing filter for HR records
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct EmployeePeriodQuery {
    pub employee_id: Option<i64>,
    pub mois: u32,
    pub annee: i32,
}

/// `?du=&au=` date range, both optional
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RangeQuery {
    pub du: Option<NaiveDate>,
    pub au: Option<NaiveDate>,
}

/// `?q=` search query
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Map a repository "not found" to the area's typed code.
pub(crate) fn not_found_as(
    code: ErrorCode,
    what: impl Into<String>,
) -> impl FnOnce(RepoError) -> AppError {
    let what = what.into();
    move |e| match e {
        RepoError::NotFound(_) => AppError::with_message(code, format!("{what} not found")),
        other => other.into(),
    }
}

/// Map a repository unique violation to the area's typed code.
pub(crate) fn duplicate_as(code: ErrorCode) -> impl FnOnce(RepoError) -> AppError {
    move |e| match e {
        RepoError::Duplicate(msg) => AppError::with_message(code, msg),
        other => other.into(),
    }
}

/// `text/csv` download
pub(crate) fn csv_response(filename: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}
