//! Ledger repository contract.
//!
//! The service layer talks to storage only through [`LedgerRepository`].
//! Every donation write carries the version the caller read; a write against
//! a stale version fails with [`RepositoryError::ConcurrentModification`]
//! instead of silently overwriting a concurrent change.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

use kafala_core::ledger::{
    Case, CaseStatus, Donation, DonationStatus, Handover, LedgerError, LifecycleStatus,
};
use kafala_core::workflow::{
    AnswerType, CaseDraft, DonationAction, Followup, FollowupResolution, Pledge,
};
use kafala_shared::auth::Role;
use kafala_shared::types::{CaseId, DonationId, FollowupActionId, HandoverId, UserId};

/// Repository errors.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity name.
        entity: &'static str,
        /// Requested ID.
        id: Uuid,
    },

    /// The donation version moved since it was read.
    #[error("Donation {0} was modified concurrently")]
    ConcurrentModification(DonationId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl RepositoryError {
    /// Shorthand for a missing record.
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl Into<Uuid>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

impl From<RepositoryError> for LedgerError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => Self::NotFound { entity, id },
            RepositoryError::ConcurrentModification(id) => Self::ConcurrentModification {
                donation_id: id.into(),
            },
            RepositoryError::Database(e) => Self::StoreUnavailable(e.to_string()),
        }
    }
}

/// Result alias for repository calls.
pub type RepoResult<T> = Result<T, RepositoryError>;

/// Input for creating a case.
#[derive(Debug, Clone)]
pub struct NewCase {
    /// Display title.
    pub title: String,
    /// Arabic title.
    pub title_ar: Option<String>,
    /// Cost of one month of sponsorship.
    pub monthly_cost: Decimal,
    /// Months of sponsorship needed.
    pub months_needed: Option<i32>,
    /// Legacy coverage status.
    pub status: CaseStatus,
    /// Lifecycle status.
    pub lifecycle_status: LifecycleStatus,
    /// Visible to the public.
    pub is_published: bool,
}

/// Replacement values for the editable fields of a case.
#[derive(Debug, Clone)]
pub struct CasePatch {
    /// Display title.
    pub title: String,
    /// Arabic title.
    pub title_ar: Option<String>,
    /// Cost of one month of sponsorship.
    pub monthly_cost: Decimal,
    /// Months of sponsorship needed.
    pub months_needed: Option<i32>,
    /// Legacy coverage status.
    pub status: CaseStatus,
    /// Lifecycle status.
    pub lifecycle_status: LifecycleStatus,
    /// Visible to the public.
    pub is_published: bool,
}

impl From<CaseDraft> for NewCase {
    fn from(draft: CaseDraft) -> Self {
        Self {
            title: draft.title,
            title_ar: draft.title_ar,
            monthly_cost: draft.monthly_cost,
            months_needed: draft.months_needed,
            status: draft.status,
            lifecycle_status: draft.lifecycle_status,
            is_published: draft.is_published,
        }
    }
}

impl From<CaseDraft> for CasePatch {
    fn from(draft: CaseDraft) -> Self {
        Self {
            title: draft.title,
            title_ar: draft.title_ar,
            monthly_cost: draft.monthly_cost,
            months_needed: draft.months_needed,
            status: draft.status,
            lifecycle_status: draft.lifecycle_status,
            is_published: draft.is_published,
        }
    }
}

/// Input for recording a handover.
#[derive(Debug, Clone)]
pub struct NewHandover {
    /// Case receiving the money.
    pub case_id: CaseId,
    /// Donation drawn from.
    pub donation_id: DonationId,
    /// Amount, already validated and rounded.
    pub handover_amount: Decimal,
    /// Canonical date within the handover month.
    pub handover_date: NaiveDate,
    /// Free-text notes.
    pub handover_notes: Option<String>,
    /// Report checkpoint flag.
    pub is_report_checkpoint: bool,
    /// Report image URL.
    pub report_image_url: Option<String>,
    /// Admin who recorded it.
    pub created_by: UserId,
}

/// Replacement values for an existing handover.
#[derive(Debug, Clone)]
pub struct HandoverPatch {
    /// Donation drawn from, possibly a different one of the same case.
    pub donation_id: DonationId,
    /// New amount, already validated and rounded.
    pub handover_amount: Decimal,
    /// New canonical date.
    pub handover_date: NaiveDate,
    /// New notes.
    pub handover_notes: Option<String>,
    /// New checkpoint flag.
    pub is_report_checkpoint: bool,
    /// New image URL.
    pub report_image_url: Option<String>,
}

/// Input for creating a followup action.
#[derive(Debug, Clone)]
pub struct NewFollowup {
    /// Case the followup belongs to.
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
    /// Choices for single-choice answers.
    pub answer_options: Vec<String>,
    /// Admin who created it.
    pub created_by: UserId,
}

/// Storage for cases, donations, handovers, followups and roles.
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Loads a case.
    async fn find_case(&self, id: CaseId) -> RepoResult<Case>;

    /// Lists every case, newest first.
    async fn list_cases(&self) -> RepoResult<Vec<Case>>;

    /// Lists published cases, newest first.
    async fn list_published_cases(&self) -> RepoResult<Vec<Case>>;

    /// Creates a case.
    async fn insert_case(&self, new: NewCase) -> RepoResult<Case>;

    /// Replaces the editable fields of a case and stamps `updated_at`.
    async fn update_case(&self, id: CaseId, patch: CasePatch) -> RepoResult<Case>;

    /// Loads a donation.
    async fn find_donation(&self, id: DonationId) -> RepoResult<Donation>;

    /// Lists every donation, newest first.
    async fn list_donations(&self) -> RepoResult<Vec<Donation>>;

    /// Lists the donations of one case, newest first.
    async fn list_donations_by_case(&self, case_id: CaseId) -> RepoResult<Vec<Donation>>;

    /// Lists donations in one status, newest first.
    async fn list_donations_by_status(&self, status: DonationStatus) -> RepoResult<Vec<Donation>>;

    /// Stores a pending pledge.
    async fn insert_donation(&self, pledge: Pledge) -> RepoResult<Donation>;

    /// Applies a confirm or cancel action if the donation is still at
    /// `expected_version`.
    async fn update_donation_status(
        &self,
        id: DonationId,
        action: &DonationAction,
        expected_version: i64,
    ) -> RepoResult<Donation>;

    /// Sets the stored handed-over total if the donation is still at
    /// `expected_version`.
    async fn update_donation_handed_over(
        &self,
        id: DonationId,
        total_handed_over: Decimal,
        expected_version: i64,
    ) -> RepoResult<Donation>;

    /// Loads a handover.
    async fn find_handover(&self, id: HandoverId) -> RepoResult<Handover>;

    /// Lists the handovers of one case, latest date first.
    async fn list_handovers_by_case(&self, case_id: CaseId) -> RepoResult<Vec<Handover>>;

    /// Lists the handovers drawn from one donation, latest date first.
    async fn list_handovers_by_donation(&self, donation_id: DonationId)
    -> RepoResult<Vec<Handover>>;

    /// Lists handovers dated within `[from, to]`, latest date first.
    async fn list_handovers_in_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepoResult<Vec<Handover>>;

    /// Stores a handover.
    async fn insert_handover(&self, new: NewHandover) -> RepoResult<Handover>;

    /// Replaces the editable fields of a handover.
    async fn update_handover(&self, id: HandoverId, patch: HandoverPatch) -> RepoResult<Handover>;

    /// Stores a followup action.
    async fn insert_followup(&self, new: NewFollowup) -> RepoResult<Followup>;

    /// Loads a followup action.
    async fn find_followup(&self, id: FollowupActionId) -> RepoResult<Followup>;

    /// Lists the followups of one case, earliest action date first.
    async fn list_followups_by_case(&self, case_id: CaseId) -> RepoResult<Vec<Followup>>;

    /// Applies a complete or cancel resolution.
    async fn update_followup_status(
        &self,
        id: FollowupActionId,
        resolution: &FollowupResolution,
    ) -> RepoResult<Followup>;

    /// Roles granted to a user. Unknown role names are skipped.
    async fn roles_for_user(&self, user_id: UserId) -> RepoResult<Vec<Role>>;

    /// Grants a role to a user. Granting a held role is a no-op.
    async fn grant_role(&self, user_id: UserId, role: Role) -> RepoResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_errors_map_to_ledger_errors() {
        let id = DonationId::new();
        let err: LedgerError = RepositoryError::ConcurrentModification(id).into();
        assert_eq!(err.error_code(), "CONCURRENT_MODIFICATION");
        assert!(err.is_retryable());

        let err: LedgerError = RepositoryError::not_found("case", Uuid::nil()).into();
        assert_eq!(err.http_status_code(), 404);

        let err: LedgerError =
            RepositoryError::Database(DbErr::Custom("connection reset".to_string())).into();
        assert_eq!(err.error_code(), "STORE_UNAVAILABLE");
    }
}
