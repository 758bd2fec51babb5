//! Ledger error types.
//!
//! Validation failures block the write and are shown inline; store failures
//! are surfaced verbatim; inconsistencies point at corrupted upstream data and
//! are never clamped away.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use super::types::DonationStatus;
use super::validation::AllocationRejection;
use crate::workflow::WorkflowError;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Lookup Errors ==========
    /// Record absent.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Record kind.
        entity: &'static str,
        /// Requested ID.
        id: Uuid,
    },

    // ========== Store Errors ==========
    /// The backing store failed or could not be reached.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Another writer changed the donation between read and write.
    #[error("Donation {donation_id} was modified concurrently, reload and retry")]
    ConcurrentModification {
        /// The contended donation.
        donation_id: Uuid,
    },

    // ========== Integrity Errors ==========
    /// Handovers for a donation add up to more than its amount.
    #[error(
        "Ledger inconsistency on donation {donation_id}: handed over {handed_over} exceeds amount {amount}"
    )]
    LedgerInconsistency {
        /// The over-allocated donation.
        donation_id: Uuid,
        /// Donation amount.
        amount: Decimal,
        /// Sum of its handovers.
        handed_over: Decimal,
    },

    /// Case target is not positive.
    #[error(
        "Case {case_id} has no positive funding target (monthly cost {monthly_cost}, months needed {months_needed:?})"
    )]
    InvalidCaseConfig {
        /// The misconfigured case.
        case_id: Uuid,
        /// Stored monthly cost.
        monthly_cost: Decimal,
        /// Stored months needed.
        months_needed: Option<i32>,
    },

    // ========== Request Errors ==========
    /// Only confirmed donations can be handed over.
    #[error("Donation {donation_id} is {status}, only confirmed donations can be handed over")]
    DonationNotConfirmed {
        /// The donation.
        donation_id: Uuid,
        /// Its current status.
        status: DonationStatus,
    },

    /// The donation belongs to another case.
    #[error("Donation {donation_id} does not belong to case {case_id}")]
    DonationCaseMismatch {
        /// The donation.
        donation_id: Uuid,
        /// The case named in the request.
        case_id: Uuid,
    },

    /// Malformed calendar month.
    #[error("Invalid month: {0}")]
    InvalidMonth(String),

    /// Allocation rejected by the validator.
    #[error(transparent)]
    Allocation(#[from] AllocationRejection),

    /// Status transition rejected.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Caller lacks the required role.
    #[error("Access denied: {0}")]
    Forbidden(String),
}

impl LedgerError {
    /// Shorthand for a missing record.
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl Into<Uuid>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::ConcurrentModification { .. } => "CONCURRENT_MODIFICATION",
            Self::LedgerInconsistency { .. } => "LEDGER_INCONSISTENCY",
            Self::InvalidCaseConfig { .. } => "INVALID_CASE_CONFIG",
            Self::DonationNotConfirmed { .. } => "DONATION_NOT_CONFIRMED",
            Self::DonationCaseMismatch { .. } => "DONATION_CASE_MISMATCH",
            Self::InvalidMonth(_) => "INVALID_MONTH",
            Self::Allocation(rejection) => rejection.error_code(),
            Self::Workflow(err) => err.error_code(),
            Self::Forbidden(_) => "FORBIDDEN",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Self::DonationCaseMismatch { .. } | Self::InvalidMonth(_) => 400,

            // 403 Forbidden
            Self::Forbidden(_) => 403,

            // 404 Not Found
            Self::NotFound { .. } => 404,

            // 409 Conflict
            Self::ConcurrentModification { .. } => 409,

            // 422 Unprocessable
            Self::InvalidCaseConfig { .. } | Self::DonationNotConfirmed { .. } => 422,

            Self::Allocation(rejection) => rejection.http_status_code(),
            Self::Workflow(err) => err.status_code(),

            // 500 Internal Server Error
            Self::LedgerInconsistency { .. } => 500,

            // 503 Service Unavailable
            Self::StoreUnavailable(_) => 503,
        }
    }

    /// Returns true if a user-initiated retry may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConcurrentModification { .. } | Self::StoreUnavailable(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LedgerError::not_found("case", Uuid::nil()).error_code(),
            "NOT_FOUND"
        );
        assert_eq!(
            LedgerError::LedgerInconsistency {
                donation_id: Uuid::nil(),
                amount: dec!(100),
                handed_over: dec!(150),
            }
            .error_code(),
            "LEDGER_INCONSISTENCY"
        );
        assert_eq!(
            LedgerError::Allocation(AllocationRejection::ExceedsRemainingBalance {
                remaining: dec!(200)
            })
            .error_code(),
            "EXCEEDS_REMAINING_BALANCE"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(
            LedgerError::not_found("donation", Uuid::nil()).http_status_code(),
            404
        );
        assert_eq!(
            LedgerError::StoreUnavailable("down".into()).http_status_code(),
            503
        );
        assert_eq!(
            LedgerError::ConcurrentModification {
                donation_id: Uuid::nil()
            }
            .http_status_code(),
            409
        );
        assert_eq!(
            LedgerError::Allocation(AllocationRejection::NonPositiveAmount).http_status_code(),
            400
        );
        assert_eq!(
            LedgerError::InvalidCaseConfig {
                case_id: Uuid::nil(),
                monthly_cost: Decimal::ZERO,
                months_needed: Some(3),
            }
            .http_status_code(),
            422
        );
    }

    #[test]
    fn test_retryable_errors() {
        assert!(
            LedgerError::ConcurrentModification {
                donation_id: Uuid::nil()
            }
            .is_retryable()
        );
        assert!(!LedgerError::Allocation(AllocationRejection::MissingReportAttachment).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::LedgerInconsistency {
            donation_id: Uuid::nil(),
            amount: dec!(1000.00),
            handed_over: dec!(1200.00),
        };
        assert_eq!(
            err.to_string(),
            "Ledger inconsistency on donation 00000000-0000-0000-0000-000000000000: handed over 1200.00 exceeds amount 1000.00"
        );
    }
}
