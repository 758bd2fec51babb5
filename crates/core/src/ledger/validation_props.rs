//! Property-based tests for allocation validation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::funding::compute_donation_remaining;
use super::funding::fixtures::{case, date, donation, handover};
use super::types::DonationStatus;
use super::validation::{AllocationRejection, AllocationRequest, validate_allocation};

/// Strategy to generate a valid positive amount (> 0).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    // 0.01 to 100,000.00
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a zero or negative amount.
fn non_positive_amount() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|cents| Decimal::new(-cents, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Applying only validated allocations never pushes the handed-over total
    /// past the donation amount.
    #[test]
    fn prop_validated_allocations_preserve_invariant(
        amount in positive_amount(),
        proposals in prop::collection::vec(positive_amount(), 1..20),
    ) {
        let case = case(Decimal::ONE_HUNDRED, Some(1));
        let d = donation(case.id, amount, DonationStatus::Confirmed);
        let mut handovers = Vec::new();

        for (i, proposed) in proposals.into_iter().enumerate() {
            let month = u32::try_from(i % 12).unwrap() + 1;
            let request = AllocationRequest {
                donation: &d,
                handovers: &handovers,
                amount: proposed,
                date: date(2024, month, 1),
                is_report_checkpoint: false,
                report_image_url: None,
                replacing: None,
            };

            if let Ok(accepted) = validate_allocation(&request) {
                handovers.push(handover(&d, accepted.amount, accepted.handover_date));
            }

            let handed_over: Decimal = handovers.iter().map(|h| h.handover_amount).sum();
            prop_assert!(handed_over <= d.amount);
            prop_assert!(compute_donation_remaining(&d, &handovers).is_ok());
        }
    }

    /// Zero and negative amounts are always rejected as non-positive.
    #[test]
    fn prop_non_positive_rejected(
        donation_amount in positive_amount(),
        proposed in non_positive_amount(),
    ) {
        let case = case(Decimal::ONE_HUNDRED, Some(1));
        let d = donation(case.id, donation_amount, DonationStatus::Confirmed);
        let request = AllocationRequest {
            donation: &d,
            handovers: &[],
            amount: proposed,
            date: date(2024, 6, 1),
            is_report_checkpoint: false,
            report_image_url: None,
            replacing: None,
        };

        prop_assert!(matches!(
            validate_allocation(&request),
            Err(LedgerError::Allocation(AllocationRejection::NonPositiveAmount))
        ));
    }

    /// Exactly the remaining balance is accepted and anything above is refused
    /// with the remaining balance attached.
    #[test]
    fn prop_boundary_at_remaining(
        donation_amount in positive_amount(),
        spent_ratio in 0u32..100,
        excess in positive_amount(),
    ) {
        let case = case(Decimal::ONE_HUNDRED, Some(1));
        let d = donation(case.id, donation_amount, DonationStatus::Confirmed);
        let spent = (donation_amount * Decimal::from(spent_ratio) / Decimal::ONE_HUNDRED).round_dp(2);
        let handovers = if spent > Decimal::ZERO {
            vec![handover(&d, spent, date(2024, 1, 15))]
        } else {
            Vec::new()
        };
        let remaining = donation_amount - spent;

        let mut request = AllocationRequest {
            donation: &d,
            handovers: &handovers,
            amount: remaining + excess,
            date: date(2024, 2, 1),
            is_report_checkpoint: false,
            report_image_url: None,
            replacing: None,
        };
        let rejected = matches!(
            validate_allocation(&request),
            Err(LedgerError::Allocation(AllocationRejection::ExceedsRemainingBalance { remaining: r }))
                if r == remaining
        );
        prop_assert!(rejected);

        if remaining > Decimal::ZERO {
            request.amount = remaining;
            prop_assert!(validate_allocation(&request).is_ok());
        }
    }

    /// Remaining balance computation is idempotent and leaves inputs untouched.
    #[test]
    fn prop_remaining_idempotent(
        donation_amount in positive_amount(),
        parts in prop::collection::vec(1u32..50, 0..10),
    ) {
        let case = case(Decimal::ONE_HUNDRED, Some(1));
        let d = donation(case.id, donation_amount, DonationStatus::Confirmed);
        let total_parts: u32 = parts.iter().sum::<u32>().max(100);
        let handovers: Vec<_> = parts
            .iter()
            .map(|p| {
                let share = (donation_amount * Decimal::from(*p) / Decimal::from(total_parts)).round_dp(2);
                handover(&d, share, date(2024, 3, 15))
            })
            .filter(|h| h.handover_amount > Decimal::ZERO)
            .collect();

        let d_before = d.clone();
        let handovers_before = handovers.clone();

        let first = compute_donation_remaining(&d, &handovers).ok();
        let second = compute_donation_remaining(&d, &handovers).ok();

        prop_assert_eq!(first, second);
        prop_assert_eq!(&d, &d_before);
        prop_assert_eq!(&handovers, &handovers_before);
    }
}
