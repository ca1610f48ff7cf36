//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            // 404 Not Found (also used for records owned by another tenant)
            Self::NotFound
            | Self::TenantNotFound
            | Self::EmployeeNotFound
            | Self::AttendanceNotFound
            | Self::OvertimeNotFound
            | Self::PayrollNotFound
            | Self::ArchiveNotFound
            | Self::MileageNotFound
            | Self::ProductNotFound
            | Self::StockEntryNotFound
            | Self::StockExitNotFound
            | Self::PurchaseOrderNotFound
            | Self::InvoiceNotFound
            | Self::RentalNotFound
            | Self::SupplierNotFound
            | Self::RentalInvoiceNotFound
            | Self::VehicleNotFound
            | Self::DriverNotFound
            | Self::DocumentNotFound
            | Self::AlertNotFound
            | Self::TripSheetNotFound
            | Self::FleetRecordNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::UsernameTaken
            | Self::MatriculeExists
            | Self::OvertimeDuplicate
            | Self::ArchiveExists
            | Self::ProductHasStock
            | Self::VehicleIdExists => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::AccountDisabled => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied | Self::RoleRequired | Self::AdminRequired => {
                StatusCode::FORBIDDEN
            }

            // 422 Unprocessable: request is well-formed but violates a business rule
            Self::InsufficientStock
            | Self::InvalidStatusTransition
            | Self::OrderNotEditable
            | Self::InvoiceNotEditable
            | Self::ArchiveStateInvalid
            | Self::NoWorkDays
            | Self::OrderEmpty => StatusCode::UNPROCESSABLE_ENTITY,

            // 500 Internal Server Error
            Self::InternalError | Self::DatabaseError | Self::ConfigError | Self::Unknown => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request (default for validation errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_status() {
        assert_eq!(ErrorCode::NotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::EmployeeNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::VehicleNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::RentalNotFound.http_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_conflict_status() {
        assert_eq!(ErrorCode::AlreadyExists.http_status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::ArchiveExists.http_status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::OvertimeDuplicate.http_status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_auth_statuses() {
        assert_eq!(
            ErrorCode::InvalidCredentials.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ErrorCode::TokenExpired.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::RoleRequired.http_status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_business_rule_status() {
        assert_eq!(
            ErrorCode::InsufficientStock.http_status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ErrorCode::InvalidStatusTransition.http_status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ErrorCode::NoWorkDays.http_status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_bad_request_default() {
        assert_eq!(ErrorCode::ValidationFailed.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::InvalidOvertimePeriod.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ErrorCode::InvalidQuantity.http_status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_status() {
        assert_eq!(
            ErrorCode::InternalError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::DatabaseError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
