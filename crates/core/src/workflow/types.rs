//! Workflow domain types for donation and followup lifecycles.
//!
//! This module defines the followup record, its status and answer types,
//! and the actions produced by valid status transitions.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kafala_shared::types::{CaseId, FollowupActionId, UserId};

use crate::ledger::{DonationStatus, DonationType};

/// Followup action status.
///
/// The valid transitions are:
/// - Pending → Completed (complete)
/// - Pending → Cancelled (cancel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowupStatus {
    /// Waiting for the case or a volunteer.
    Pending,
    /// Done.
    Completed,
    /// Dropped.
    Cancelled,
}

impl FollowupStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if no further transitions are allowed.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for FollowupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of answer closes a followup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerType {
    /// No answer needed.
    #[default]
    None,
    /// Free text.
    Text,
    /// One of `answer_options`.
    SingleChoice,
    /// Link to an uploaded photo.
    Photo,
}

impl AnswerType {
    /// Returns the string representation of the answer type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Text => "text",
            Self::SingleChoice => "single_choice",
            Self::Photo => "photo",
        }
    }

    /// Parses an answer type. Unknown values map to `None`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "text" => Self::Text,
            "single_choice" => Self::SingleChoice,
            "photo" => Self::Photo,
            _ => Self::None,
        }
    }
}

/// A task scheduled against a case after a visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Followup {
    /// Followup ID.
    pub id: FollowupActionId,
    /// The case.
    pub case_id: CaseId,
    /// Short title.
    pub title: String,
    /// Longer description.
    pub description: Option<String>,
    /// Due date.
    pub action_date: NaiveDate,
    /// The family has to act.
    pub requires_case_action: bool,
    /// A volunteer has to act.
    pub requires_volunteer_action: bool,
    /// Expected answer.
    pub answer_type: AnswerType,
    /// Choices for `SingleChoice`.
    pub answer_options: Vec<String>,
    /// Recorded answer.
    pub answer: Option<String>,
    /// Status.
    pub status: FollowupStatus,
    /// When it was completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Who completed it.
    pub completed_by: Option<UserId>,
    /// Notes left on completion.
    pub completion_notes: Option<String>,
    /// Author.
    pub created_by: Option<UserId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Donation status change with audit data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DonationAction {
    /// Payment received.
    Confirm {
        /// The new status after confirmation.
        new_status: DonationStatus,
        /// The admin who confirmed the payment.
        confirmed_by: UserId,
        /// When the payment was confirmed.
        confirmed_at: DateTime<Utc>,
        /// Bank or wallet reference.
        payment_reference: Option<String>,
        /// Admin notes.
        admin_notes: Option<String>,
    },
    /// Pledge withdrawn or never paid.
    Cancel {
        /// The new status after cancellation.
        new_status: DonationStatus,
        /// The admin who cancelled.
        cancelled_by: UserId,
        /// Admin notes.
        admin_notes: Option<String>,
    },
}

impl DonationAction {
    /// Returns the new status resulting from this action.
    #[must_use]
    pub const fn new_status(&self) -> DonationStatus {
        match self {
            Self::Confirm { new_status, .. } | Self::Cancel { new_status, .. } => *new_status,
        }
    }

    /// Admin notes carried by the action.
    #[must_use]
    pub fn admin_notes(&self) -> Option<&str> {
        match self {
            Self::Confirm { admin_notes, .. } | Self::Cancel { admin_notes, .. } => {
                admin_notes.as_deref()
            }
        }
    }
}

/// Followup status change with audit data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowupResolution {
    /// Followup done.
    Complete {
        /// The new status after completion.
        new_status: FollowupStatus,
        /// Who completed it.
        completed_by: UserId,
        /// When it was completed.
        completed_at: DateTime<Utc>,
        /// Normalized answer.
        answer: Option<String>,
        /// Completion notes.
        completion_notes: Option<String>,
    },
    /// Followup dropped.
    Cancel {
        /// The new status after cancellation.
        new_status: FollowupStatus,
    },
}

impl FollowupResolution {
    /// Returns the new status resulting from this resolution.
    #[must_use]
    pub const fn new_status(&self) -> FollowupStatus {
        match self {
            Self::Complete { new_status, .. } | Self::Cancel { new_status } => *new_status,
        }
    }
}

/// A donor's pledge request.
#[derive(Debug, Clone, Deserialize)]
pub struct PledgeInput {
    /// Monthly or custom; defaults to monthly.
    #[serde(default = "default_donation_type")]
    pub donation_type: DonationType,
    /// Months pledged, for monthly donations.
    pub months: Option<i32>,
    /// Amount, for custom donations.
    pub custom_amount: Option<Decimal>,
    /// Donor display name.
    pub donor_name: Option<String>,
    /// Donor contact email.
    pub donor_email: Option<String>,
}

const fn default_donation_type() -> DonationType {
    DonationType::Monthly
}

/// A pledge ready to be stored as a pending donation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pledge {
    /// Receiving case.
    pub case_id: CaseId,
    /// Donor display name.
    pub donor_name: Option<String>,
    /// Donor contact email.
    pub donor_email: Option<String>,
    /// Monthly or custom.
    pub donation_type: DonationType,
    /// Months pledged (1 for custom donations).
    pub months_pledged: i32,
    /// Amount pledged.
    pub amount: Decimal,
    /// Token the donor quotes when paying.
    pub payment_code: String,
}
