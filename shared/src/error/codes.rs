//! Unified error codes for the fleet management service
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Tenant / account errors
//! - 4xxx: HR and payroll errors
//! - 5xxx: Inventory errors
//! - 6xxx: Purchasing and invoicing errors
//! - 7xxx: Vehicle rental errors
//! - 8xxx: Fleet errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Serialized as its `u16` value so API clients can switch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format (dates, times, numbers)
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1007,
    /// Password too short
    PasswordTooShort = 1008,
    /// Username already taken
    UsernameTaken = 1009,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,
    /// Admin role required
    AdminRequired = 2003,

    // ==================== 3xxx: Tenant ====================
    /// Tenant not found
    TenantNotFound = 3002,
    /// Entreprise details required for an entreprise account
    EntrepriseRequired = 3003,

    // ==================== 4xxx: HR / Payroll ====================
    /// Employee not found
    EmployeeNotFound = 4001,
    /// Employee matricule already used
    MatriculeExists = 4002,
    /// Attendance record not found
    AttendanceNotFound = 4003,
    /// Unknown attendance status code
    InvalidAttendanceStatus = 4004,
    /// Overtime record not found
    OvertimeNotFound = 4005,
    /// Overtime already recorded for this start time
    OvertimeDuplicate = 4006,
    /// Overtime start and end are identical
    InvalidOvertimePeriod = 4007,
    /// Payroll record not found
    PayrollNotFound = 4008,
    /// Monthly archive not found
    ArchiveNotFound = 4009,
    /// Monthly archive already exists for the period
    ArchiveExists = 4010,
    /// Archive status does not allow the operation
    ArchiveStateInvalid = 4011,
    /// Mileage allowance not found
    MileageNotFound = 4012,
    /// Month or year out of range
    InvalidPeriod = 4013,

    // ==================== 5xxx: Inventory ====================
    /// Product not found
    ProductNotFound = 5001,
    /// Not enough stock for the exit
    InsufficientStock = 5002,
    /// Product still has stock rows
    ProductHasStock = 5003,
    /// Stock entry not found
    StockEntryNotFound = 5004,
    /// Stock exit not found
    StockExitNotFound = 5005,
    /// Quantity must be at least 1
    InvalidQuantity = 5006,

    // ==================== 6xxx: Purchasing / Invoicing ====================
    /// Purchase order not found
    PurchaseOrderNotFound = 6001,
    /// Status transition is not allowed
    InvalidStatusTransition = 6002,
    /// Purchase order can no longer be edited
    OrderNotEditable = 6003,
    /// Invoice not found
    InvoiceNotFound = 6004,
    /// Invoice can no longer be edited
    InvoiceNotEditable = 6005,
    /// Discount outside the allowed range
    InvalidDiscount = 6006,
    /// Purchase order has no lines
    OrderEmpty = 6007,

    // ==================== 7xxx: Rentals ====================
    /// Rental not found
    RentalNotFound = 7001,
    /// Rental supplier not found
    SupplierNotFound = 7002,
    /// Rental has no work days to invoice
    NoWorkDays = 7003,
    /// Rental end date precedes start date
    InvalidRentalPeriod = 7004,
    /// Rental invoice not found
    RentalInvoiceNotFound = 7005,

    // ==================== 8xxx: Fleet ====================
    /// Vehicle not found
    VehicleNotFound = 8001,
    /// Vehicle identifier already used
    VehicleIdExists = 8002,
    /// Driver not found
    DriverNotFound = 8003,
    /// Administrative document not found
    DocumentNotFound = 8004,
    /// Alert not found
    AlertNotFound = 8005,
    /// Odometer readings are inconsistent
    InvalidOdometer = 8006,
    /// Trip sheet not found
    TripSheetNotFound = 8007,
    /// Fleet record (cost, fuel, usage...) not found
    FleetRecordNotFound = 8008,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::TokenExpired => "Token has expired",
            ErrorCode::TokenInvalid => "Token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",
            ErrorCode::PasswordTooShort => "Password must be at least 8 characters",
            ErrorCode::UsernameTaken => "Username is already taken",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Required role is missing",
            ErrorCode::AdminRequired => "Admin role required",

            // Tenant
            ErrorCode::TenantNotFound => "Tenant not found",
            ErrorCode::EntrepriseRequired => "Entreprise details are required",

            // HR / Payroll
            ErrorCode::EmployeeNotFound => "Employee not found",
            ErrorCode::MatriculeExists => "Matricule already exists",
            ErrorCode::AttendanceNotFound => "Attendance record not found",
            ErrorCode::InvalidAttendanceStatus => "Unknown attendance status",
            ErrorCode::OvertimeNotFound => "Overtime record not found",
            ErrorCode::OvertimeDuplicate => "Overtime already recorded for this start time",
            ErrorCode::InvalidOvertimePeriod => "Overtime start and end must differ",
            ErrorCode::PayrollNotFound => "Payroll record not found",
            ErrorCode::ArchiveNotFound => "Monthly archive not found",
            ErrorCode::ArchiveExists => "An archive already exists for this period",
            ErrorCode::ArchiveStateInvalid => "Archive status does not allow this operation",
            ErrorCode::MileageNotFound => "Mileage allowance not found",
            ErrorCode::InvalidPeriod => "Invalid month or year",

            // Inventory
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::InsufficientStock => "Stock insuffisant",
            ErrorCode::ProductHasStock => "Product still has stock movements",
            ErrorCode::StockEntryNotFound => "Stock entry not found",
            ErrorCode::StockExitNotFound => "Stock exit not found",
            ErrorCode::InvalidQuantity => "Quantity must be at least 1",

            // Purchasing / Invoicing
            ErrorCode::PurchaseOrderNotFound => "Purchase order not found",
            ErrorCode::InvalidStatusTransition => "Status transition not allowed",
            ErrorCode::OrderNotEditable => "Purchase order can no longer be edited",
            ErrorCode::InvoiceNotFound => "Invoice not found",
            ErrorCode::InvoiceNotEditable => "Invoice can no longer be edited",
            ErrorCode::InvalidDiscount => "Discount is out of range",
            ErrorCode::OrderEmpty => "Purchase order has no lines",

            // Rentals
            ErrorCode::RentalNotFound => "Rental not found",
            ErrorCode::SupplierNotFound => "Rental supplier not found",
            ErrorCode::NoWorkDays => "No work days to invoice",
            ErrorCode::InvalidRentalPeriod => "Rental end date precedes start date",
            ErrorCode::RentalInvoiceNotFound => "Rental invoice not found",

            // Fleet
            ErrorCode::VehicleNotFound => "Vehicle not found",
            ErrorCode::VehicleIdExists => "Vehicle identifier already exists",
            ErrorCode::DriverNotFound => "Driver not found",
            ErrorCode::DocumentNotFound => "Document not found",
            ErrorCode::AlertNotFound => "Alert not found",
            ErrorCode::InvalidOdometer => "Odometer readings are inconsistent",
            ErrorCode::TripSheetNotFound => "Trip sheet not found",
            ErrorCode::FleetRecordNotFound => "Fleet record not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code as u16
    }
}

/// Error returned when converting an unknown `u16` into an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1007 => Ok(ErrorCode::AccountDisabled),
            1008 => Ok(ErrorCode::PasswordTooShort),
            1009 => Ok(ErrorCode::UsernameTaken),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::RoleRequired),
            2003 => Ok(ErrorCode::AdminRequired),

            // Tenant
            3002 => Ok(ErrorCode::TenantNotFound),
            3003 => Ok(ErrorCode::EntrepriseRequired),

            // HR / Payroll
            4001 => Ok(ErrorCode::EmployeeNotFound),
            4002 => Ok(ErrorCode::MatriculeExists),
            4003 => Ok(ErrorCode::AttendanceNotFound),
            4004 => Ok(ErrorCode::InvalidAttendanceStatus),
            4005 => Ok(ErrorCode::OvertimeNotFound),
            4006 => Ok(ErrorCode::OvertimeDuplicate),
            4007 => Ok(ErrorCode::InvalidOvertimePeriod),
            4008 => Ok(ErrorCode::PayrollNotFound),
            4009 => Ok(ErrorCode::ArchiveNotFound),
            4010 => Ok(ErrorCode::ArchiveExists),
            4011 => Ok(ErrorCode::ArchiveStateInvalid),
            4012 => Ok(ErrorCode::MileageNotFound),
            4013 => Ok(ErrorCode::InvalidPeriod),

            // Inventory
            5001 => Ok(ErrorCode::ProductNotFound),
            5002 => Ok(ErrorCode::InsufficientStock),
            5003 => Ok(ErrorCode::ProductHasStock),
            5004 => Ok(ErrorCode::StockEntryNotFound),
            5005 => Ok(ErrorCode::StockExitNotFound),
            5006 => Ok(ErrorCode::InvalidQuantity),

            // Purchasing / Invoicing
            6001 => Ok(ErrorCode::PurchaseOrderNotFound),
            6002 => Ok(ErrorCode::InvalidStatusTransition),
            6003 => Ok(ErrorCode::OrderNotEditable),
            6004 => Ok(ErrorCode::InvoiceNotFound),
            6005 => Ok(ErrorCode::InvoiceNotEditable),
            6006 => Ok(ErrorCode::InvalidDiscount),
            6007 => Ok(ErrorCode::OrderEmpty),

            // Rentals
            7001 => Ok(ErrorCode::RentalNotFound),
            7002 => Ok(ErrorCode::SupplierNotFound),
            7003 => Ok(ErrorCode::NoWorkDays),
            7004 => Ok(ErrorCode::InvalidRentalPeriod),
            7005 => Ok(ErrorCode::RentalInvoiceNotFound),

            // Fleet
            8001 => Ok(ErrorCode::VehicleNotFound),
            8002 => Ok(ErrorCode::VehicleIdExists),
            8003 => Ok(ErrorCode::DriverNotFound),
            8004 => Ok(ErrorCode::DocumentNotFound),
            8005 => Ok(ErrorCode::AlertNotFound),
            8006 => Ok(ErrorCode::InvalidOdometer),
            8007 => Ok(ErrorCode::TripSheetNotFound),
            8008 => Ok(ErrorCode::FleetRecordNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::InvalidCredentials.code(), 1002);
        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::EmployeeNotFound.code(), 4001);
        assert_eq!(ErrorCode::InsufficientStock.code(), 5002);
        assert_eq!(ErrorCode::InvalidStatusTransition.code(), 6002);
        assert_eq!(ErrorCode::NoWorkDays.code(), 7003);
        assert_eq!(ErrorCode::VehicleNotFound.code(), 8001);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::NotFound.is_success());
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(4007), Ok(ErrorCode::InvalidOvertimePeriod));
        assert_eq!(ErrorCode::try_from(5002), Ok(ErrorCode::InsufficientStock));
        assert_eq!(ErrorCode::try_from(9003), Ok(ErrorCode::ConfigError));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(4999), Err(InvalidErrorCode(4999)));
        assert_eq!(ErrorCode::try_from(1005), Err(InvalidErrorCode(1005)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::ArchiveExists).unwrap();
        assert_eq!(json, "4010");
        let back: ErrorCode = serde_json::from_str("7003").unwrap();
        assert_eq!(back, ErrorCode::NoWorkDays);
        assert!(serde_json::from_str::<ErrorCode>("12345").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::NotFound.to_string(), "E0003");
        assert_eq!(ErrorCode::InsufficientStock.to_string(), "E5002");
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::InsufficientStock.message(), "Stock insuffisant");
        assert_eq!(
            ErrorCode::InvalidCredentials.message(),
            "Invalid username or password"
        );
    }
}
