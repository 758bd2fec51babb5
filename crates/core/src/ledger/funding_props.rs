//! Property-based tests for funding aggregation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::funding::compute_case_funding;
use super::funding::fixtures::{case, date, donation, handover};
use super::types::DonationStatus;

/// Strategy to generate a valid positive amount (> 0).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn status_strategy() -> impl Strategy<Value = DonationStatus> {
    prop_oneof![
        Just(DonationStatus::Pending),
        Just(DonationStatus::Confirmed),
        Just(DonationStatus::Cancelled),
        Just(DonationStatus::Redeemed),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Funding percentage stays within 0..=100 and remaining never goes negative.
    #[test]
    fn prop_summary_bounds(
        monthly_cost in positive_amount(),
        months_needed in prop::option::of(0i32..36),
        donations in prop::collection::vec((positive_amount(), status_strategy()), 0..15),
        handover_amounts in prop::collection::vec(positive_amount(), 0..10),
    ) {
        let case = case(monthly_cost, months_needed);
        let donations: Vec<_> = donations
            .into_iter()
            .map(|(amount, status)| donation(case.id, amount, status))
            .collect();
        let handovers: Vec<_> = donations
            .iter()
            .zip(handover_amounts)
            .map(|(d, amount)| handover(d, amount, date(2024, 4, 15)))
            .collect();

        let summary = compute_case_funding(&case, &donations, &handovers).unwrap();

        prop_assert!(summary.funding_percentage >= Decimal::ZERO);
        prop_assert!(summary.funding_percentage <= Decimal::ONE_HUNDRED);
        prop_assert!(summary.remaining_to_handover >= Decimal::ZERO);

        let confirmed: Decimal = donations
            .iter()
            .filter(|d| d.status == DonationStatus::Confirmed)
            .map(|d| d.amount)
            .sum();
        prop_assert_eq!(summary.total_pledged, confirmed);
    }

    /// Same inputs, same summary.
    #[test]
    fn prop_summary_idempotent(
        monthly_cost in positive_amount(),
        amounts in prop::collection::vec(positive_amount(), 0..10),
    ) {
        let case = case(monthly_cost, Some(12));
        let donations: Vec<_> = amounts
            .into_iter()
            .map(|amount| donation(case.id, amount, DonationStatus::Confirmed))
            .collect();

        let first = compute_case_funding(&case, &donations, &[]).unwrap();
        let second = compute_case_funding(&case, &donations, &[]).unwrap();
        prop_assert_eq!(first, second);
    }
}
