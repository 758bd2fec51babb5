//! Ledger service: core rules applied over a [`LedgerRepository`].
//!
//! Reads fetch their inputs concurrently and hand them to the pure
//! functions in `kafala_core`. Handover writes reserve the balance on the
//! donation first (a version-checked update of `total_handed_over`) and only
//! then write the handover row, so two admins allocating from the same
//! donation cannot both succeed against the same remaining balance.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::try_join;

use kafala_core::ledger::{
    AllocationRequest, AvailableDonation, Case, CaseFundingSummary, Donation, DonationStats,
    DonationStatus, Handover, LedgerError, available_donations, compute_case_funding,
    compute_donation_remaining, donation_status_stats, handed_over_total, validate_allocation,
};
use kafala_core::reports::{
    CaseRedemptionSummary, LegacyRedemption, MonthHandovers, MonthWindow, MonthlyDonationSummary,
    MonthlyRollup, ReportService, RollupInput,
};
use kafala_core::workflow::{
    AnswerType, CaseChanges, CaseDraft, CaseInput, Followup, PledgeInput, WorkflowError,
    WorkflowService, generate_payment_code, prepare_pledge,
};
use kafala_shared::auth::{AuthContext, Role};
use kafala_shared::types::{CaseId, DonationId, FollowupActionId, HandoverId};

use crate::repositories::{
    CasePatch, HandoverPatch, LedgerRepository, NewCase, NewFollowup, NewHandover,
};

/// A handover as submitted by an admin.
#[derive(Debug, Clone, Deserialize)]
pub struct HandoverInput {
    /// Donation drawn from.
    pub donation_id: DonationId,
    /// Amount to hand over.
    pub amount: Decimal,
    /// Any date in the handover month.
    pub handover_date: NaiveDate,
    /// Free-text notes.
    #[serde(default)]
    pub handover_notes: Option<String>,
    /// Marks the monthly report checkpoint.
    #[serde(default)]
    pub is_report_checkpoint: bool,
    /// Uploaded report image.
    #[serde(default)]
    pub report_image_url: Option<String>,
}

/// New values for an existing handover.
#[derive(Debug, Clone, Deserialize)]
pub struct HandoverUpdate {
    /// Another confirmed donation of the same case to draw from instead.
    #[serde(default)]
    pub donation_id: Option<DonationId>,
    /// New amount.
    pub amount: Decimal,
    /// Any date in the new handover month.
    pub handover_date: NaiveDate,
    /// New notes.
    #[serde(default)]
    pub handover_notes: Option<String>,
    /// New checkpoint flag.
    #[serde(default)]
    pub is_report_checkpoint: bool,
    /// New image; the stored one is kept when absent.
    #[serde(default)]
    pub report_image_url: Option<String>,
}

/// A followup action as submitted by an admin.
#[derive(Debug, Clone, Deserialize)]
pub struct FollowupInput {
    /// Short title.
    pub title: String,
    /// Longer description.
    #[serde(default)]
    pub description: Option<String>,
    /// Due date.
    pub action_date: NaiveDate,
    /// The family has to act.
    #[serde(default)]
    pub requires_case_action: bool,
    /// A volunteer has to act.
    #[serde(default)]
    pub requires_volunteer_action: bool,
    /// Expected answer.
    #[serde(default)]
    pub answer_type: AnswerType,
    /// Choices for single-choice answers.
    #[serde(default)]
    pub answer_options: Vec<String>,
}

/// Remaining balance of one donation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DonationBalance {
    /// The donation.
    pub donation_id: DonationId,
    /// Donation amount.
    pub amount: Decimal,
    /// Sum of its handovers.
    pub handed_over: Decimal,
    /// Amount still available.
    pub remaining: Decimal,
}

/// Donation stats of one published case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseDonationOverview {
    /// The case.
    pub case_id: CaseId,
    /// Case title.
    pub title: String,
    /// Per-status counts and sums.
    pub stats: DonationStats,
}

/// Ledger operations for the API layer.
#[derive(Clone)]
pub struct LedgerService {
    repo: Arc<dyn LedgerRepository>,
}

impl LedgerService {
    /// Creates a service over `repo`.
    #[must_use]
    pub fn new(repo: Arc<dyn LedgerRepository>) -> Self {
        Self { repo }
    }

    /// The underlying repository.
    #[must_use]
    pub fn repository(&self) -> &Arc<dyn LedgerRepository> {
        &self.repo
    }

    // ========== Reads ==========

    /// Funding progress of a case.
    ///
    /// Unpublished cases are only visible to admins.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for missing or hidden cases, `InvalidCaseConfig`
    /// for a non-positive target, or a store error.
    pub async fn case_funding(
        &self,
        ctx: Option<&AuthContext>,
        case_id: CaseId,
    ) -> Result<CaseFundingSummary, LedgerError> {
        let (case, donations, handovers) = try_join!(
            self.repo.find_case(case_id),
            self.repo.list_donations_by_case(case_id),
            self.repo.list_handovers_by_case(case_id),
        )?;

        if !case.is_published && !ctx.is_some_and(AuthContext::is_admin) {
            return Err(LedgerError::not_found("case", case_id));
        }

        compute_case_funding(&case, &donations, &handovers).inspect_err(|e| {
            tracing::warn!(case_id = %case_id, error = %e, "Case funding target is not positive");
        })
    }

    /// Remaining balance of a donation, computed from its handovers.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins, `LedgerInconsistency` if the
    /// donation is over-allocated, or a store error.
    pub async fn donation_remaining(
        &self,
        ctx: &AuthContext,
        donation_id: DonationId,
    ) -> Result<DonationBalance, LedgerError> {
        require_admin(ctx)?;
        let (donation, handovers) = try_join!(
            self.repo.find_donation(donation_id),
            self.repo.list_handovers_by_donation(donation_id),
        )?;

        let remaining = compute_donation_remaining(&donation, &handovers).map_err(flag)?;
        Ok(DonationBalance {
            donation_id,
            amount: donation.amount,
            handed_over: donation.amount - remaining,
            remaining,
        })
    }

    /// Confirmed donations of a case that still have money to hand over.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins, `LedgerInconsistency` if any
    /// donation is over-allocated, or a store error.
    pub async fn available_donations(
        &self,
        ctx: &AuthContext,
        case_id: CaseId,
    ) -> Result<Vec<AvailableDonation>, LedgerError> {
        require_admin(ctx)?;
        let (donations, handovers) = try_join!(
            self.repo.list_donations_by_case(case_id),
            self.repo.list_handovers_by_case(case_id),
        )?;

        available_donations(&donations, &handovers).map_err(flag)
    }

    /// Donation stats for every published case.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins, or a store error.
    pub async fn donations_by_case(
        &self,
        ctx: &AuthContext,
    ) -> Result<Vec<CaseDonationOverview>, LedgerError> {
        require_admin(ctx)?;
        let (cases, donations) = try_join!(
            self.repo.list_published_cases(),
            self.repo.list_donations(),
        )?;

        Ok(cases
            .into_iter()
            .map(|case| {
                let own: Vec<Donation> = donations
                    .iter()
                    .filter(|d| d.case_id == case.id)
                    .cloned()
                    .collect();
                CaseDonationOverview {
                    case_id: case.id,
                    title: case.title,
                    stats: donation_status_stats(&own),
                }
            })
            .collect())
    }

    /// Monthly rollup of lifecycle events and spending over `window`.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins, or a store error.
    pub async fn monthly_rollup(
        &self,
        ctx: &AuthContext,
        window: &MonthWindow,
    ) -> Result<MonthlyRollup, LedgerError> {
        require_admin(ctx)?;
        let (cases, confirmed, redeemed, handovers) = try_join!(
            self.repo.list_cases(),
            self.repo.list_donations_by_status(DonationStatus::Confirmed),
            self.repo.list_donations_by_status(DonationStatus::Redeemed),
            self.repo
                .list_handovers_in_range(window.start().first_day(), window.end().last_day()),
        )?;

        let legacy: Vec<LegacyRedemption> =
            redeemed.iter().filter_map(LegacyRedemption::from_donation).collect();

        let input = RollupInput {
            cases: &cases,
            confirmed_donations: &confirmed,
            handovers: &handovers,
            legacy_redemptions: &legacy,
        };
        Ok(ReportService::rollup_by_month(&input, window))
    }

    /// Confirmed donations grouped by confirmation month, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins, or a store error.
    pub async fn monthly_donations(
        &self,
        ctx: &AuthContext,
    ) -> Result<Vec<MonthlyDonationSummary>, LedgerError> {
        require_admin(ctx)?;
        let confirmed = self
            .repo
            .list_donations_by_status(DonationStatus::Confirmed)
            .await?;
        Ok(ReportService::confirmed_donations_by_month(&confirmed))
    }

    /// Legacy redeemed donations grouped per case.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins, or a store error.
    pub async fn legacy_redemptions(
        &self,
        ctx: &AuthContext,
    ) -> Result<Vec<CaseRedemptionSummary>, LedgerError> {
        require_admin(ctx)?;
        let redeemed = self
            .repo
            .list_donations_by_status(DonationStatus::Redeemed)
            .await?;
        let legacy: Vec<LegacyRedemption> =
            redeemed.iter().filter_map(LegacyRedemption::from_donation).collect();
        Ok(ReportService::legacy_redemptions_by_case(&legacy))
    }

    /// Handovers of a case grouped by month, optionally for one year.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins, `NotFound` for a missing case,
    /// or a store error.
    pub async fn case_handovers(
        &self,
        ctx: &AuthContext,
        case_id: CaseId,
        year: Option<i32>,
    ) -> Result<Vec<MonthHandovers>, LedgerError> {
        require_admin(ctx)?;
        let (_, handovers) = try_join!(
            self.repo.find_case(case_id),
            self.repo.list_handovers_by_case(case_id),
        )?;
        Ok(ReportService::handovers_by_month(&handovers, year))
    }

    // ========== Cases ==========

    /// Every case, published or not, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins, or a store error.
    pub async fn all_cases(&self, ctx: &AuthContext) -> Result<Vec<Case>, LedgerError> {
        require_admin(ctx)?;
        Ok(self.repo.list_cases().await?)
    }

    /// Creates an active case.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins, a workflow error for invalid
    /// fields, or a store error.
    pub async fn create_case(
        &self,
        ctx: &AuthContext,
        input: CaseInput,
    ) -> Result<Case, LedgerError> {
        require_admin(ctx)?;
        let draft = CaseDraft::create(input)?;
        let case = self.repo.insert_case(NewCase::from(draft)).await?;

        tracing::info!(case_id = %case.id, created_by = %ctx.user_id, "Case created");
        Ok(case)
    }

    /// Edits a case. Lifecycle changes are stamped with the edit time.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins, `NotFound` for a missing case, a
    /// workflow error for invalid fields, or a store error.
    pub async fn update_case(
        &self,
        ctx: &AuthContext,
        case_id: CaseId,
        changes: CaseChanges,
    ) -> Result<Case, LedgerError> {
        require_admin(ctx)?;
        let case = self.repo.find_case(case_id).await?;
        let draft = CaseDraft::edit(&case, changes)?;
        let updated = self.repo.update_case(case_id, CasePatch::from(draft)).await?;

        if updated.lifecycle_status != case.lifecycle_status {
            tracing::info!(
                case_id = %case_id,
                from = %case.lifecycle_status,
                to = %updated.lifecycle_status,
                updated_by = %ctx.user_id,
                "Case lifecycle changed"
            );
        }
        Ok(updated)
    }

    // ========== Donations ==========

    /// Stores a pending pledge for a published, active case.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing case, a workflow error for a case
    /// that does not take donations or a bad amount, or a store error.
    pub async fn pledge(&self, case_id: CaseId, input: PledgeInput) -> Result<Donation, LedgerError> {
        let case = self.repo.find_case(case_id).await?;
        let pledge = prepare_pledge(&case, input, generate_payment_code())?;
        let donation = self.repo.insert_donation(pledge).await?;

        tracing::info!(
            donation_id = %donation.id,
            case_id = %case_id,
            amount = %donation.amount,
            "Pledge recorded"
        );
        Ok(donation)
    }

    /// Confirms payment of a pending donation.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins, a workflow error unless the
    /// donation is pending, `ConcurrentModification` on a lost race, or a
    /// store error.
    pub async fn confirm_donation(
        &self,
        ctx: &AuthContext,
        donation_id: DonationId,
        payment_reference: Option<String>,
        admin_notes: Option<String>,
    ) -> Result<Donation, LedgerError> {
        require_admin(ctx)?;
        let donation = self.repo.find_donation(donation_id).await?;
        let action = WorkflowService::confirm_donation(
            donation.status,
            ctx.user_id,
            payment_reference,
            admin_notes,
        )?;

        let donation = self
            .repo
            .update_donation_status(donation_id, &action, donation.version)
            .await?;
        tracing::info!(donation_id = %donation_id, confirmed_by = %ctx.user_id, "Donation confirmed");
        Ok(donation)
    }

    /// Cancels a pending donation.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins, a workflow error unless the
    /// donation is pending, `ConcurrentModification` on a lost race, or a
    /// store error.
    pub async fn cancel_donation(
        &self,
        ctx: &AuthContext,
        donation_id: DonationId,
        admin_notes: Option<String>,
    ) -> Result<Donation, LedgerError> {
        require_admin(ctx)?;
        let donation = self.repo.find_donation(donation_id).await?;
        let action = WorkflowService::cancel_donation(donation.status, ctx.user_id, admin_notes)?;

        let donation = self
            .repo
            .update_donation_status(donation_id, &action, donation.version)
            .await?;
        tracing::info!(donation_id = %donation_id, cancelled_by = %ctx.user_id, "Donation cancelled");
        Ok(donation)
    }

    // ========== Handovers ==========

    /// Records a handover from a confirmed donation of `case_id`.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins, `DonationCaseMismatch`,
    /// `DonationNotConfirmed`, an allocation rejection,
    /// `ConcurrentModification` if the donation changed since it was read,
    /// or a store error.
    pub async fn record_handover(
        &self,
        ctx: &AuthContext,
        case_id: CaseId,
        input: HandoverInput,
    ) -> Result<Handover, LedgerError> {
        require_admin(ctx)?;
        let (donation, handovers) = try_join!(
            self.repo.find_donation(input.donation_id),
            self.repo.list_handovers_by_donation(input.donation_id),
        )?;
        check_donation(&donation, case_id)?;

        let allocation = validate_allocation(&AllocationRequest {
            donation: &donation,
            handovers: &handovers,
            amount: input.amount,
            date: input.handover_date,
            is_report_checkpoint: input.is_report_checkpoint,
            report_image_url: input.report_image_url.as_deref(),
            replacing: None,
        })
        .map_err(flag)?;

        let reserved = self
            .repo
            .update_donation_handed_over(
                donation.id,
                donation.amount - allocation.remaining_after,
                donation.version,
            )
            .await?;

        let written = self
            .repo
            .insert_handover(NewHandover {
                case_id,
                donation_id: donation.id,
                handover_amount: allocation.amount,
                handover_date: allocation.handover_date,
                handover_notes: input.handover_notes,
                is_report_checkpoint: input.is_report_checkpoint,
                report_image_url: input.report_image_url,
                created_by: ctx.user_id,
            })
            .await;

        match written {
            Ok(handover) => {
                tracing::info!(
                    handover_id = %handover.id,
                    donation_id = %donation.id,
                    amount = %handover.handover_amount,
                    month = %allocation.month,
                    "Handover recorded"
                );
                Ok(handover)
            }
            Err(e) => {
                self.release(&donation, &reserved).await;
                Err(e.into())
            }
        }
    }

    /// Edits a handover, re-validating against the donation with the old
    /// amount given back first.
    ///
    /// A checkpoint edit without a new image keeps the stored one. Naming
    /// another donation moves the handover there, see
    /// [`Self::move_handover`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::record_handover`], plus `NotFound` for a missing
    /// handover.
    pub async fn update_handover(
        &self,
        ctx: &AuthContext,
        handover_id: HandoverId,
        update: HandoverUpdate,
    ) -> Result<Handover, LedgerError> {
        require_admin(ctx)?;
        let existing = self.repo.find_handover(handover_id).await?;
        if let Some(target) = update.donation_id.filter(|id| *id != existing.donation_id) {
            return self.move_handover(existing, target, update).await;
        }

        let (donation, handovers) = try_join!(
            self.repo.find_donation(existing.donation_id),
            self.repo.list_handovers_by_donation(existing.donation_id),
        )?;
        check_donation(&donation, existing.case_id)?;

        let report_image_url = update.report_image_url.or(existing.report_image_url);
        let allocation = validate_allocation(&AllocationRequest {
            donation: &donation,
            handovers: &handovers,
            amount: update.amount,
            date: update.handover_date,
            is_report_checkpoint: update.is_report_checkpoint,
            report_image_url: report_image_url.as_deref(),
            replacing: Some(handover_id),
        })
        .map_err(flag)?;

        let reserved = self
            .repo
            .update_donation_handed_over(
                donation.id,
                donation.amount - allocation.remaining_after,
                donation.version,
            )
            .await?;

        let written = self
            .repo
            .update_handover(
                handover_id,
                HandoverPatch {
                    donation_id: donation.id,
                    handover_amount: allocation.amount,
                    handover_date: allocation.handover_date,
                    handover_notes: update.handover_notes,
                    is_report_checkpoint: update.is_report_checkpoint,
                    report_image_url,
                },
            )
            .await;

        match written {
            Ok(handover) => {
                tracing::info!(
                    handover_id = %handover_id,
                    donation_id = %donation.id,
                    amount = %handover.handover_amount,
                    "Handover updated"
                );
                Ok(handover)
            }
            Err(e) => {
                self.release(&donation, &reserved).await;
                Err(e.into())
            }
        }
    }

    /// Moves a handover to another confirmed donation of its case.
    ///
    /// The target is reserved first, then the source gives back the old
    /// amount, then the row is rewritten. A failure at any step restores
    /// whatever was already changed.
    async fn move_handover(
        &self,
        existing: Handover,
        target_id: DonationId,
        update: HandoverUpdate,
    ) -> Result<Handover, LedgerError> {
        let (source, target, source_rows, target_rows) = try_join!(
            self.repo.find_donation(existing.donation_id),
            self.repo.find_donation(target_id),
            self.repo.list_handovers_by_donation(existing.donation_id),
            self.repo.list_handovers_by_donation(target_id),
        )?;
        check_donation(&target, existing.case_id)?;

        let report_image_url = update.report_image_url.or(existing.report_image_url);
        let allocation = validate_allocation(&AllocationRequest {
            donation: &target,
            handovers: &target_rows,
            amount: update.amount,
            date: update.handover_date,
            is_report_checkpoint: update.is_report_checkpoint,
            report_image_url: report_image_url.as_deref(),
            replacing: None,
        })
        .map_err(flag)?;

        let reserved = self
            .repo
            .update_donation_handed_over(
                target.id,
                target.amount - allocation.remaining_after,
                target.version,
            )
            .await?;

        let committed =
            handed_over_total(&source, &source_rows, None).max(source.total_handed_over);
        let freed = match self
            .repo
            .update_donation_handed_over(
                source.id,
                (committed - existing.handover_amount).max(Decimal::ZERO),
                source.version,
            )
            .await
        {
            Ok(freed) => freed,
            Err(e) => {
                self.release(&target, &reserved).await;
                return Err(e.into());
            }
        };

        let written = self
            .repo
            .update_handover(
                existing.id,
                HandoverPatch {
                    donation_id: target.id,
                    handover_amount: allocation.amount,
                    handover_date: allocation.handover_date,
                    handover_notes: update.handover_notes,
                    is_report_checkpoint: update.is_report_checkpoint,
                    report_image_url,
                },
            )
            .await;

        match written {
            Ok(handover) => {
                tracing::info!(
                    handover_id = %existing.id,
                    from_donation = %source.id,
                    to_donation = %target.id,
                    amount = %handover.handover_amount,
                    "Handover moved"
                );
                Ok(handover)
            }
            Err(e) => {
                self.release(&target, &reserved).await;
                self.release(&source, &freed).await;
                Err(e.into())
            }
        }
    }

    /// Gives back a reservation whose handover write failed.
    async fn release(&self, before: &Donation, reserved: &Donation) {
        let restored = self
            .repo
            .update_donation_handed_over(before.id, before.total_handed_over, reserved.version)
            .await;

        if let Err(e) = restored {
            tracing::error!(
                donation_id = %before.id,
                reserved_total = %reserved.total_handed_over,
                original_total = %before.total_handed_over,
                error = %e,
                "Failed to release handover reservation"
            );
        }
    }

    // ========== Followups ==========

    /// Creates a pending followup for a case.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins, `TitleRequired`, `InvalidAnswer`
    /// for a single-choice followup without options, `NotFound` for a
    /// missing case, or a store error.
    pub async fn create_followup(
        &self,
        ctx: &AuthContext,
        case_id: CaseId,
        input: FollowupInput,
    ) -> Result<Followup, LedgerError> {
        require_admin(ctx)?;

        let title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(WorkflowError::TitleRequired.into());
        }

        let answer_options: Vec<String> = input
            .answer_options
            .iter()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();
        if input.answer_type == AnswerType::SingleChoice && answer_options.is_empty() {
            return Err(WorkflowError::InvalidAnswer(
                "single choice followups need at least one option".to_string(),
            )
            .into());
        }

        self.repo.find_case(case_id).await?;
        let followup = self
            .repo
            .insert_followup(NewFollowup {
                case_id,
                title,
                description: input.description,
                action_date: input.action_date,
                requires_case_action: input.requires_case_action,
                requires_volunteer_action: input.requires_volunteer_action,
                answer_type: input.answer_type,
                answer_options,
                created_by: ctx.user_id,
            })
            .await?;
        Ok(followup)
    }

    /// Followups of a case, earliest action date first.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` unless the caller is an admin or volunteer, or a
    /// store error.
    pub async fn followups_for_case(
        &self,
        ctx: &AuthContext,
        case_id: CaseId,
    ) -> Result<Vec<Followup>, LedgerError> {
        require_field_staff(ctx)?;
        Ok(self.repo.list_followups_by_case(case_id).await?)
    }

    /// Completes a pending followup with an answer.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` unless the caller is an admin or volunteer, a
    /// workflow error for a resolved followup or a bad answer, or a store
    /// error.
    pub async fn complete_followup(
        &self,
        ctx: &AuthContext,
        followup_id: FollowupActionId,
        answer: Option<String>,
        completion_notes: Option<String>,
    ) -> Result<Followup, LedgerError> {
        require_field_staff(ctx)?;
        let followup = self.repo.find_followup(followup_id).await?;
        let resolution =
            WorkflowService::complete_followup(&followup, ctx.user_id, answer, completion_notes)?;
        Ok(self
            .repo
            .update_followup_status(followup_id, &resolution)
            .await?)
    }

    /// Cancels a pending followup.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins, a workflow error for a resolved
    /// followup, or a store error.
    pub async fn cancel_followup(
        &self,
        ctx: &AuthContext,
        followup_id: FollowupActionId,
    ) -> Result<Followup, LedgerError> {
        require_admin(ctx)?;
        let followup = self.repo.find_followup(followup_id).await?;
        let resolution = WorkflowService::cancel_followup(followup.status)?;
        Ok(self
            .repo
            .update_followup_status(followup_id, &resolution)
            .await?)
    }

    /// Published cases, newest first.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn published_cases(&self) -> Result<Vec<Case>, LedgerError> {
        Ok(self.repo.list_published_cases().await?)
    }
}

fn require_admin(ctx: &AuthContext) -> Result<(), LedgerError> {
    if ctx.is_admin() {
        Ok(())
    } else {
        Err(LedgerError::Forbidden("admin role required".to_string()))
    }
}

fn require_field_staff(ctx: &AuthContext) -> Result<(), LedgerError> {
    if ctx.is_admin() || ctx.has_role(Role::Volunteer) {
        Ok(())
    } else {
        Err(LedgerError::Forbidden(
            "admin or volunteer role required".to_string(),
        ))
    }
}

fn check_donation(donation: &Donation, case_id: CaseId) -> Result<(), LedgerError> {
    if donation.case_id != case_id {
        return Err(LedgerError::DonationCaseMismatch {
            donation_id: donation.id.into_inner(),
            case_id: case_id.into_inner(),
        });
    }
    if !donation.is_confirmed() {
        return Err(LedgerError::DonationNotConfirmed {
            donation_id: donation.id.into_inner(),
            status: donation.status,
        });
    }
    Ok(())
}

/// Logs over-allocation, which means the stored data is already corrupt.
fn flag(err: LedgerError) -> LedgerError {
    if let LedgerError::LedgerInconsistency {
        donation_id,
        amount,
        handed_over,
    } = &err
    {
        tracing::error!(
            donation_id = %donation_id,
            amount = %amount,
            handed_over = %handed_over,
            "Ledger inconsistency: donation is over-allocated"
        );
    }
    err
}
