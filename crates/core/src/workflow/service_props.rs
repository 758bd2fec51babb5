//! Property-based tests for WorkflowService.
//!
//! Transition tables for donations and followups over every status.

use proptest::prelude::*;

use kafala_shared::types::UserId;

use crate::ledger::DonationStatus;
use crate::workflow::error::WorkflowError;
use crate::workflow::service::WorkflowService;
use crate::workflow::types::FollowupStatus;

/// Strategy for generating random DonationStatus values.
fn arb_donation_status() -> impl Strategy<Value = DonationStatus> {
    prop_oneof![
        Just(DonationStatus::Pending),
        Just(DonationStatus::Confirmed),
        Just(DonationStatus::Cancelled),
        Just(DonationStatus::Redeemed),
    ]
}

/// Strategy for generating random FollowupStatus values.
fn arb_followup_status() -> impl Strategy<Value = FollowupStatus> {
    prop_oneof![
        Just(FollowupStatus::Pending),
        Just(FollowupStatus::Completed),
        Just(FollowupStatus::Cancelled),
    ]
}

/// Strategy for generating optional notes, blank ones included.
fn arb_notes() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[a-zA-Z0-9 ]{0,40}")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Only pending donations can be confirmed.
    #[test]
    fn prop_confirm_only_from_pending(status in arb_donation_status(), notes in arb_notes()) {
        let result = WorkflowService::confirm_donation(status, UserId::new(), None, notes);
        if status == DonationStatus::Pending {
            let action = result.unwrap();
            prop_assert_eq!(action.new_status(), DonationStatus::Confirmed);
            if let Some(n) = action.admin_notes() {
                prop_assert!(!n.is_empty());
                prop_assert_eq!(n, n.trim());
            }
        } else {
            prop_assert_eq!(
                result,
                Err(WorkflowError::InvalidDonationTransition { from: status, to: DonationStatus::Confirmed })
            );
        }
    }

    /// Only pending donations can be cancelled.
    #[test]
    fn prop_cancel_only_from_pending(status in arb_donation_status()) {
        let result = WorkflowService::cancel_donation(status, UserId::new(), None);
        prop_assert_eq!(result.is_ok(), status == DonationStatus::Pending);
        if let Ok(action) = result {
            prop_assert_eq!(action.new_status(), DonationStatus::Cancelled);
        }
    }

    /// Terminal followups reject every further transition.
    #[test]
    fn prop_followup_terminal_states(status in arb_followup_status()) {
        let result = WorkflowService::cancel_followup(status);
        prop_assert_eq!(result.is_err(), status.is_terminal());
        if let Err(err) = result {
            prop_assert_eq!(err.status_code(), 409);
        }
    }
}
