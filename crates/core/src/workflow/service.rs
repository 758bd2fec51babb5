//! Workflow service for donation and followup state transitions.
//!
//! This module implements the state machine logic for confirming and
//! cancelling donations and for resolving followup actions.

use chrono::Utc;

use kafala_shared::types::UserId;

use crate::ledger::DonationStatus;
use crate::workflow::error::WorkflowError;
use crate::workflow::types::{AnswerType, DonationAction, Followup, FollowupResolution, FollowupStatus};

/// Stateless service for managing donation and followup transitions.
///
/// All methods are associated functions that validate a transition and
/// return the resulting action with its audit trail.
pub struct WorkflowService;

impl WorkflowService {
    /// Confirm payment of a pending donation.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::InvalidDonationTransition` unless the
    /// donation is pending.
    pub fn confirm_donation(
        current_status: DonationStatus,
        confirmed_by: UserId,
        payment_reference: Option<String>,
        admin_notes: Option<String>,
    ) -> Result<DonationAction, WorkflowError> {
        match current_status {
            DonationStatus::Pending => Ok(DonationAction::Confirm {
                new_status: DonationStatus::Confirmed,
                confirmed_by,
                confirmed_at: Utc::now(),
                payment_reference: non_blank(payment_reference),
                admin_notes: non_blank(admin_notes),
            }),
            _ => Err(WorkflowError::InvalidDonationTransition {
                from: current_status,
                to: DonationStatus::Confirmed,
            }),
        }
    }

    /// Cancel a pending donation.
    ///
    /// Confirmed donations are money already received and cannot be
    /// cancelled.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::InvalidDonationTransition` unless the
    /// donation is pending.
    pub fn cancel_donation(
        current_status: DonationStatus,
        cancelled_by: UserId,
        admin_notes: Option<String>,
    ) -> Result<DonationAction, WorkflowError> {
        match current_status {
            DonationStatus::Pending => Ok(DonationAction::Cancel {
                new_status: DonationStatus::Cancelled,
                cancelled_by,
                admin_notes: non_blank(admin_notes),
            }),
            _ => Err(WorkflowError::InvalidDonationTransition {
                from: current_status,
                to: DonationStatus::Cancelled,
            }),
        }
    }

    /// Complete a pending followup, checking the answer against its type.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::InvalidFollowupTransition` if the followup is
    /// already resolved, or an answer error if the answer does not fit.
    pub fn complete_followup(
        followup: &Followup,
        completed_by: UserId,
        answer: Option<String>,
        completion_notes: Option<String>,
    ) -> Result<FollowupResolution, WorkflowError> {
        if followup.status != FollowupStatus::Pending {
            return Err(WorkflowError::InvalidFollowupTransition {
                from: followup.status,
                to: FollowupStatus::Completed,
            });
        }

        let answer = Self::validate_answer(followup.answer_type, &followup.answer_options, answer)?;

        Ok(FollowupResolution::Complete {
            new_status: FollowupStatus::Completed,
            completed_by,
            completed_at: Utc::now(),
            answer,
            completion_notes: non_blank(completion_notes),
        })
    }

    /// Cancel a pending followup.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::InvalidFollowupTransition` if the followup is
    /// already resolved.
    pub fn cancel_followup(
        current_status: FollowupStatus,
    ) -> Result<FollowupResolution, WorkflowError> {
        match current_status {
            FollowupStatus::Pending => Ok(FollowupResolution::Cancel {
                new_status: FollowupStatus::Cancelled,
            }),
            _ => Err(WorkflowError::InvalidFollowupTransition {
                from: current_status,
                to: FollowupStatus::Cancelled,
            }),
        }
    }

    /// Checks an answer against the expected answer type.
    ///
    /// Returns the trimmed answer, or `None` for followups that take no
    /// answer.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::AnswerRequired` when an answer is expected but
    /// blank, and `WorkflowError::InvalidAnswer` when it does not fit.
    pub fn validate_answer(
        answer_type: AnswerType,
        options: &[String],
        answer: Option<String>,
    ) -> Result<Option<String>, WorkflowError> {
        if answer_type == AnswerType::None {
            return Ok(None);
        }

        let answer = non_blank(answer).ok_or(WorkflowError::AnswerRequired)?;

        match answer_type {
            AnswerType::SingleChoice if !options.iter().any(|o| o.trim() == answer) => Err(
                WorkflowError::InvalidAnswer(format!("'{answer}' is not one of the options")),
            ),
            AnswerType::Photo if !is_http_url(&answer) => Err(WorkflowError::InvalidAnswer(
                "photo answer must be an http(s) URL".to_string(),
            )),
            _ => Ok(Some(answer)),
        }
    }
}

/// Trims the value and drops it if nothing is left.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("https://") || value.starts_with("http://")
}
