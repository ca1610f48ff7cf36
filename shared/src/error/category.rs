//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 2xxx: Permission errors
/// - 3xxx: Tenant errors
/// - 4xxx: HR / payroll errors
/// - 5xxx: Inventory errors
/// - 6xxx: Purchasing / invoicing errors
/// - 7xxx: Rental errors
/// - 8xxx: Fleet errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Tenant errors (3xxx)
    Tenant,
    /// HR / payroll errors (4xxx)
    Payroll,
    /// Inventory errors (5xxx)
    Inventory,
    /// Purchasing / invoicing errors (6xxx)
    Billing,
    /// Rental errors (7xxx)
    Rental,
    /// Fleet errors (8xxx)
    Fleet,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Tenant,
            4000..5000 => Self::Payroll,
            5000..6000 => Self::Inventory,
            6000..7000 => Self::Billing,
            7000..8000 => Self::Rental,
            8000..9000 => Self::Fleet,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Tenant => "tenant",
            Self::Payroll => "payroll",
            Self::Inventory => "inventory",
            Self::Billing => "billing",
            Self::Rental => "rental",
            Self::Fleet => "fleet",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1001), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_code(2001), ErrorCategory::Permission);
        assert_eq!(ErrorCategory::from_code(3002), ErrorCategory::Tenant);
        assert_eq!(ErrorCategory::from_code(4001), ErrorCategory::Payroll);
        assert_eq!(ErrorCategory::from_code(5001), ErrorCategory::Inventory);
        assert_eq!(ErrorCategory::from_code(6001), ErrorCategory::Billing);
        assert_eq!(ErrorCategory::from_code(7001), ErrorCategory::Rental);
        assert_eq!(ErrorCategory::from_code(8001), ErrorCategory::Fleet);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(10000), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::TokenExpired.category(), ErrorCategory::Auth);
        assert_eq!(ErrorCode::ArchiveExists.category(), ErrorCategory::Payroll);
        assert_eq!(ErrorCode::InsufficientStock.category(), ErrorCategory::Inventory);
        assert_eq!(ErrorCode::InvoiceNotFound.category(), ErrorCategory::Billing);
        assert_eq!(ErrorCode::NoWorkDays.category(), ErrorCategory::Rental);
        assert_eq!(ErrorCode::DriverNotFound.category(), ErrorCategory::Fleet);
        assert_eq!(ErrorCode::DatabaseError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_serialize() {
        let json = serde_json::to_string(&ErrorCategory::Payroll).unwrap();
        assert_eq!(json, "\"payroll\"");
    }
}
