//! Allocation rules for new and edited handovers.
//!
//! The store does not enforce `Σ handovers ≤ donation.amount`, so every
//! handover write goes through [`validate_allocation`] first.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use thiserror::Error;

use kafala_shared::types::HandoverId;

use super::error::LedgerError;
use super::funding::reservable_remaining;
use super::month::MonthKey;
use super::types::{Donation, Handover};

/// Largest amount a `NUMERIC(12,2)` money column holds: 9 999 999 999.99.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Why a proposed handover was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationRejection {
    /// Amount is zero or negative after rounding to cents.
    #[error("Handover amount must be positive")]
    NonPositiveAmount,

    /// Amount is larger than what is left on the donation.
    #[error("Handover amount exceeds the donation's remaining balance of {remaining}")]
    ExceedsRemainingBalance {
        /// What is actually left.
        remaining: Decimal,
    },

    /// Report checkpoints need a verification image.
    #[error("Report checkpoint requires an attached image")]
    MissingReportAttachment,
}

impl AllocationRejection {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            Self::ExceedsRemainingBalance { .. } => "EXCEEDS_REMAINING_BALANCE",
            Self::MissingReportAttachment => "MISSING_REPORT_ATTACHMENT",
        }
    }

    /// Returns the HTTP status code for this rejection.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::NonPositiveAmount | Self::MissingReportAttachment => 400,
            Self::ExceedsRemainingBalance { .. } => 422,
        }
    }
}

/// A proposed handover against one donation.
#[derive(Debug, Clone)]
pub struct AllocationRequest<'a> {
    /// Donation drawn from.
    pub donation: &'a Donation,
    /// Every handover already recorded against the donation.
    pub handovers: &'a [Handover],
    /// Proposed amount.
    pub amount: Decimal,
    /// Proposed date; only its month matters.
    pub date: NaiveDate,
    /// Whether the handover is a report checkpoint.
    pub is_report_checkpoint: bool,
    /// Image attached to the checkpoint, new or previously stored.
    pub report_image_url: Option<&'a str>,
    /// Handover being edited, whose current amount is given back first.
    pub replacing: Option<HandoverId>,
}

/// An allocation that passed every rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedAllocation {
    /// Amount rounded to cents.
    pub amount: Decimal,
    /// Month bucket of the handover.
    pub month: MonthKey,
    /// Canonical handover date within the month.
    pub handover_date: NaiveDate,
    /// Remaining balance before this allocation.
    pub remaining_before: Decimal,
    /// Remaining balance after this allocation.
    pub remaining_after: Decimal,
}

/// Rounds a money amount to cents, half away from zero.
#[must_use]
pub fn round_amount(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Validates a proposed handover.
///
/// Rules, in order:
/// 1. amount > 0, else `NonPositiveAmount`
/// 2. amount ≤ remaining balance, else `ExceedsRemainingBalance`; the
///    balance honours reservations already stored on the donation
/// 3. checkpoints carry a non-blank image, else `MissingReportAttachment`
///
/// # Errors
///
/// Returns `LedgerError::Allocation` with the first failing rule, or
/// `LedgerError::LedgerInconsistency` if the donation is already
/// over-allocated.
pub fn validate_allocation(
    request: &AllocationRequest<'_>,
) -> Result<ValidatedAllocation, LedgerError> {
    let amount = round_amount(request.amount);
    if amount <= Decimal::ZERO {
        return Err(AllocationRejection::NonPositiveAmount.into());
    }

    let remaining = reservable_remaining(request.donation, request.handovers, request.replacing)?;
    if amount > remaining {
        return Err(AllocationRejection::ExceedsRemainingBalance { remaining }.into());
    }

    let has_image = request
        .report_image_url
        .is_some_and(|url| !url.trim().is_empty());
    if request.is_report_checkpoint && !has_image {
        return Err(AllocationRejection::MissingReportAttachment.into());
    }

    let month = MonthKey::from_date(request.date);
    Ok(ValidatedAllocation {
        amount,
        month,
        handover_date: month.handover_date(),
        remaining_before: remaining,
        remaining_after: remaining - amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::funding::fixtures::{case, date, donation, handover};
    use crate::ledger::types::DonationStatus;
    use rust_decimal_macros::dec;

    fn request<'a>(
        donation: &'a Donation,
        handovers: &'a [Handover],
        amount: Decimal,
    ) -> AllocationRequest<'a> {
        AllocationRequest {
            donation,
            handovers,
            amount,
            date: date(2024, 5, 3),
            is_report_checkpoint: false,
            report_image_url: None,
            replacing: None,
        }
    }

    #[test]
    fn test_max_amount_matches_column_precision() {
        assert_eq!(MAX_AMOUNT, dec!(9999999999.99));
        assert_eq!(MAX_AMOUNT.scale(), 2);
    }

    #[test]
    fn test_rejects_zero_and_negative() {
        let case = case(dec!(1000), Some(1));
        let d = donation(case.id, dec!(1000), DonationStatus::Confirmed);

        for amount in [dec!(0), dec!(-10), dec!(0.004)] {
            let err = validate_allocation(&request(&d, &[], amount)).unwrap_err();
            assert!(matches!(
                err,
                LedgerError::Allocation(AllocationRejection::NonPositiveAmount)
            ));
        }
    }

    #[test]
    fn test_exceeds_remaining_carries_remaining() {
        let case = case(dec!(1000), Some(1));
        let d = donation(case.id, dec!(1000), DonationStatus::Confirmed);
        let handovers = vec![
            handover(&d, dec!(500), date(2024, 2, 15)),
            handover(&d, dec!(300), date(2024, 3, 15)),
        ];

        let err = validate_allocation(&request(&d, &handovers, dec!(300))).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Allocation(AllocationRejection::ExceedsRemainingBalance { remaining })
                if remaining == dec!(200)
        ));

        let ok = validate_allocation(&request(&d, &handovers, dec!(200))).unwrap();
        assert_eq!(ok.remaining_before, dec!(200));
        assert_eq!(ok.remaining_after, Decimal::ZERO);
    }

    #[test]
    fn test_checkpoint_requires_image() {
        let case = case(dec!(1000), Some(1));
        let d = donation(case.id, dec!(1000), DonationStatus::Confirmed);

        let mut req = request(&d, &[], dec!(100));
        req.is_report_checkpoint = true;
        assert!(matches!(
            validate_allocation(&req).unwrap_err(),
            LedgerError::Allocation(AllocationRejection::MissingReportAttachment)
        ));

        req.report_image_url = Some("   ");
        assert!(validate_allocation(&req).is_err());

        req.report_image_url = Some("https://cdn.example.org/reports/a.jpg");
        assert!(validate_allocation(&req).is_ok());
    }

    #[test]
    fn test_rules_checked_in_order() {
        let case = case(dec!(1000), Some(1));
        let d = donation(case.id, dec!(100), DonationStatus::Confirmed);

        // Over the balance and missing an image: balance wins.
        let mut req = request(&d, &[], dec!(150));
        req.is_report_checkpoint = true;
        assert!(matches!(
            validate_allocation(&req).unwrap_err(),
            LedgerError::Allocation(AllocationRejection::ExceedsRemainingBalance { .. })
        ));
    }

    #[test]
    fn test_date_normalized_to_fifteenth() {
        let case = case(dec!(1000), Some(1));
        let d = donation(case.id, dec!(1000), DonationStatus::Confirmed);

        let ok = validate_allocation(&request(&d, &[], dec!(99.999))).unwrap();
        assert_eq!(ok.amount, dec!(100.00));
        assert_eq!(ok.month, MonthKey::new(2024, 5).unwrap());
        assert_eq!(ok.handover_date, date(2024, 5, 15));
    }

    #[test]
    fn test_edit_gives_back_replaced_amount() {
        let case = case(dec!(1000), Some(1));
        let d = donation(case.id, dec!(1000), DonationStatus::Confirmed);
        let existing = handover(&d, dec!(900), date(2024, 2, 15));
        let handovers = vec![existing.clone()];

        let mut req = request(&d, &handovers, dec!(1000));
        assert!(validate_allocation(&req).is_err());

        req.replacing = Some(existing.id);
        let ok = validate_allocation(&req).unwrap();
        assert_eq!(ok.remaining_before, dec!(1000));
    }

    #[test]
    fn test_stored_reservation_counts_against_balance() {
        let case = case(dec!(1000), Some(1));
        let mut d = donation(case.id, dec!(1000), DonationStatus::Confirmed);
        // Another write reserved 600 and has not inserted its row yet.
        d.total_handed_over = dec!(600);
        d.version = 1;

        let err = validate_allocation(&request(&d, &[], dec!(600))).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Allocation(AllocationRejection::ExceedsRemainingBalance { remaining })
                if remaining == dec!(400)
        ));

        let ok = validate_allocation(&request(&d, &[], dec!(400))).unwrap();
        assert_eq!(ok.remaining_after, Decimal::ZERO);
    }

    #[test]
    fn test_edit_under_reservation_gives_back_only_its_own_amount() {
        let case = case(dec!(1000), Some(1));
        let mut d = donation(case.id, dec!(1000), DonationStatus::Confirmed);
        let existing = handover(&d, dec!(300), date(2024, 2, 15));
        d.total_handed_over = dec!(800);
        let handovers = vec![existing.clone()];

        let mut req = request(&d, &handovers, dec!(600));
        req.replacing = Some(existing.id);
        let err = validate_allocation(&req).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Allocation(AllocationRejection::ExceedsRemainingBalance { remaining })
                if remaining == dec!(500)
        ));
    }

    #[test]
    fn test_over_allocated_donation_is_inconsistent() {
        let case = case(dec!(1000), Some(1));
        let d = donation(case.id, dec!(100), DonationStatus::Confirmed);
        let handovers = vec![handover(&d, dec!(120), date(2024, 2, 15))];

        assert!(matches!(
            validate_allocation(&request(&d, &handovers, dec!(1))).unwrap_err(),
            LedgerError::LedgerInconsistency { .. }
        ));
    }
}
