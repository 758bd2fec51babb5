//! Workflow error types for donation and followup lifecycles.
//!
//! This module defines all error types that can occur during
//! workflow operations such as status transitions, pledges and the
//! donor-facing payment dialog.

use thiserror::Error;

use kafala_shared::types::CaseId;

use crate::ledger::DonationStatus;
use crate::workflow::types::FollowupStatus;

/// Errors that can occur during workflow operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// Attempted an invalid donation status transition.
    #[error("Invalid donation status transition from {from} to {to}")]
    InvalidDonationTransition {
        /// The current status.
        from: DonationStatus,
        /// The attempted target status.
        to: DonationStatus,
    },

    /// Attempted an invalid followup status transition.
    #[error("Invalid followup status transition from {from} to {to}")]
    InvalidFollowupTransition {
        /// The current status.
        from: FollowupStatus,
        /// The attempted target status.
        to: FollowupStatus,
    },

    /// The case is unpublished or no longer sponsored.
    #[error("Case {0} is not accepting donations")]
    CaseNotAcceptingDonations(CaseId),

    /// The pledge amount could not be determined.
    #[error("Invalid pledge: {0}")]
    InvalidPledge(String),

    /// Donor name missing in the payment dialog.
    #[error("Donor name is required")]
    DonorNameRequired,

    /// Dialog action not allowed in the current step.
    #[error("Cannot {action} while {step}")]
    InvalidDialogStep {
        /// The current step.
        step: &'static str,
        /// The attempted action.
        action: &'static str,
    },

    /// Title of a followup or case missing.
    #[error("Title is required")]
    TitleRequired,

    /// Case fields out of range.
    #[error("Invalid case: {0}")]
    InvalidCase(String),

    /// The followup expects an answer.
    #[error("An answer is required to complete this followup")]
    AnswerRequired,

    /// The answer does not fit the followup's answer type.
    #[error("Invalid answer: {0}")]
    InvalidAnswer(String),
}

impl WorkflowError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidDonationTransition { .. }
            | Self::InvalidFollowupTransition { .. }
            | Self::InvalidDialogStep { .. } => 409,

            Self::CaseNotAcceptingDonations(_) => 422,

            Self::InvalidPledge(_)
            | Self::DonorNameRequired
            | Self::TitleRequired
            | Self::InvalidCase(_)
            | Self::AnswerRequired
            | Self::InvalidAnswer(_) => 400,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDonationTransition { .. } | Self::InvalidFollowupTransition { .. } => {
                "INVALID_TRANSITION"
            }
            Self::CaseNotAcceptingDonations(_) => "CASE_NOT_ACCEPTING_DONATIONS",
            Self::InvalidPledge(_) => "INVALID_PLEDGE",
            Self::DonorNameRequired => "DONOR_NAME_REQUIRED",
            Self::InvalidDialogStep { .. } => "INVALID_DIALOG_STEP",
            Self::TitleRequired => "TITLE_REQUIRED",
            Self::InvalidCase(_) => "INVALID_CASE",
            Self::AnswerRequired => "ANSWER_REQUIRED",
            Self::InvalidAnswer(_) => "INVALID_ANSWER",
        }
    }
}
