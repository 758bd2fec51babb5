//! In-memory [`LedgerRepository`] for tests and local tooling.
//!
//! Applies the same version check as the `SeaORM` implementation and can be
//! told to fail handover writes, so callers can exercise their compensation
//! paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::DbErr;
use tokio::sync::RwLock;

use kafala_core::ledger::{Case, Donation, DonationStatus, Handover};
use kafala_core::workflow::{DonationAction, Followup, FollowupResolution, FollowupStatus, Pledge};
use kafala_shared::auth::Role;
use kafala_shared::types::{CaseId, DonationId, FollowupActionId, HandoverId, UserId};

use super::ledger::{
    CasePatch, HandoverPatch, LedgerRepository, NewCase, NewFollowup, NewHandover, RepoResult,
    RepositoryError,
};

#[derive(Debug, Default)]
struct State {
    cases: HashMap<CaseId, Case>,
    donations: HashMap<DonationId, Donation>,
    handovers: HashMap<HandoverId, Handover>,
    followups: HashMap<FollowupActionId, Followup>,
    roles: HashMap<UserId, Vec<Role>>,
}

/// Ledger repository holding everything in process memory.
#[derive(Debug, Default)]
pub struct InMemoryLedgerRepository {
    state: RwLock<State>,
    fail_handover_writes: AtomicBool,
}

impl InMemoryLedgerRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following handover insert or update fail until reset.
    pub fn fail_handover_writes(&self, fail: bool) {
        self.fail_handover_writes.store(fail, Ordering::SeqCst);
    }

    /// Stores a donation as is, bypassing the pledge flow.
    pub async fn put_donation(&self, donation: Donation) {
        self.state.write().await.donations.insert(donation.id, donation);
    }

    /// Stores a handover as is, bypassing validation.
    pub async fn put_handover(&self, handover: Handover) {
        self.state.write().await.handovers.insert(handover.id, handover);
    }

    fn check_handover_write(&self) -> RepoResult<()> {
        if self.fail_handover_writes.load(Ordering::SeqCst) {
            return Err(DbErr::Custom("handover write failed".to_string()).into());
        }
        Ok(())
    }
}

/// Newest first by the given key.
fn sorted_desc<T, K: Ord>(mut items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
    items
}

fn bump(donation: &mut Donation, expected_version: i64) -> RepoResult<()> {
    if donation.version != expected_version {
        return Err(RepositoryError::ConcurrentModification(donation.id));
    }
    donation.version += 1;
    Ok(())
}

#[async_trait]
impl LedgerRepository for InMemoryLedgerRepository {
    async fn find_case(&self, id: CaseId) -> RepoResult<Case> {
        let state = self.state.read().await;
        state
            .cases
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("case", id))
    }

    async fn list_cases(&self) -> RepoResult<Vec<Case>> {
        let state = self.state.read().await;
        let cases = state.cases.values().cloned().collect();
        Ok(sorted_desc(cases, |c: &Case| (c.created_at, c.id)))
    }

    async fn list_published_cases(&self) -> RepoResult<Vec<Case>> {
        let cases = self.list_cases().await?;
        Ok(cases.into_iter().filter(|c| c.is_published).collect())
    }

    async fn insert_case(&self, new: NewCase) -> RepoResult<Case> {
        let now = Utc::now();
        let case = Case {
            id: CaseId::new(),
            title: new.title,
            title_ar: new.title_ar,
            monthly_cost: new.monthly_cost,
            months_needed: new.months_needed,
            months_covered: 0,
            status: new.status,
            lifecycle_status: new.lifecycle_status,
            is_published: new.is_published,
            created_at: now,
            updated_at: now,
        };
        self.state.write().await.cases.insert(case.id, case.clone());
        Ok(case)
    }

    async fn update_case(&self, id: CaseId, patch: CasePatch) -> RepoResult<Case> {
        let mut state = self.state.write().await;
        let case = state
            .cases
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found("case", id))?;
        case.title = patch.title;
        case.title_ar = patch.title_ar;
        case.monthly_cost = patch.monthly_cost;
        case.months_needed = patch.months_needed;
        case.status = patch.status;
        case.lifecycle_status = patch.lifecycle_status;
        case.is_published = patch.is_published;
        case.updated_at = Utc::now();
        Ok(case.clone())
    }

    async fn find_donation(&self, id: DonationId) -> RepoResult<Donation> {
        let state = self.state.read().await;
        state
            .donations
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("donation", id))
    }

    async fn list_donations(&self) -> RepoResult<Vec<Donation>> {
        let state = self.state.read().await;
        let donations = state.donations.values().cloned().collect();
        Ok(sorted_desc(donations, |d: &Donation| (d.created_at, d.id)))
    }

    async fn list_donations_by_case(&self, case_id: CaseId) -> RepoResult<Vec<Donation>> {
        let donations = self.list_donations().await?;
        Ok(donations.into_iter().filter(|d| d.case_id == case_id).collect())
    }

    async fn list_donations_by_status(&self, status: DonationStatus) -> RepoResult<Vec<Donation>> {
        let donations = self.list_donations().await?;
        Ok(donations.into_iter().filter(|d| d.status == status).collect())
    }

    async fn insert_donation(&self, pledge: Pledge) -> RepoResult<Donation> {
        let mut state = self.state.write().await;
        if !state.cases.contains_key(&pledge.case_id) {
            return Err(RepositoryError::not_found("case", pledge.case_id));
        }

        let donation = Donation {
            id: DonationId::new(),
            case_id: pledge.case_id,
            donor_name: pledge.donor_name,
            donor_email: pledge.donor_email,
            amount: pledge.amount,
            donation_type: pledge.donation_type,
            months_pledged: pledge.months_pledged,
            status: DonationStatus::Pending,
            payment_code: pledge.payment_code,
            payment_reference: None,
            admin_notes: None,
            total_handed_over: Decimal::ZERO,
            version: 0,
            created_at: Utc::now(),
            confirmed_at: None,
        };
        state.donations.insert(donation.id, donation.clone());
        Ok(donation)
    }

    async fn update_donation_status(
        &self,
        id: DonationId,
        action: &DonationAction,
        expected_version: i64,
    ) -> RepoResult<Donation> {
        let mut state = self.state.write().await;
        let donation = state
            .donations
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found("donation", id))?;
        bump(donation, expected_version)?;

        donation.status = action.new_status();
        if let Some(notes) = action.admin_notes() {
            donation.admin_notes = Some(notes.to_string());
        }
        if let DonationAction::Confirm {
            confirmed_at,
            payment_reference,
            ..
        } = action
        {
            donation.confirmed_at = Some(*confirmed_at);
            donation.payment_reference.clone_from(payment_reference);
        }
        Ok(donation.clone())
    }

    async fn update_donation_handed_over(
        &self,
        id: DonationId,
        total_handed_over: Decimal,
        expected_version: i64,
    ) -> RepoResult<Donation> {
        let mut state = self.state.write().await;
        let donation = state
            .donations
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found("donation", id))?;
        bump(donation, expected_version)?;

        donation.total_handed_over = total_handed_over;
        Ok(donation.clone())
    }

    async fn find_handover(&self, id: HandoverId) -> RepoResult<Handover> {
        let state = self.state.read().await;
        state
            .handovers
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("handover", id))
    }

    async fn list_handovers_by_case(&self, case_id: CaseId) -> RepoResult<Vec<Handover>> {
        let state = self.state.read().await;
        let handovers = state
            .handovers
            .values()
            .filter(|h| h.case_id == case_id)
            .cloned()
            .collect();
        Ok(sorted_desc(handovers, |h: &Handover| (h.handover_date, h.created_at)))
    }

    async fn list_handovers_by_donation(
        &self,
        donation_id: DonationId,
    ) -> RepoResult<Vec<Handover>> {
        let state = self.state.read().await;
        let handovers = state
            .handovers
            .values()
            .filter(|h| h.donation_id == donation_id)
            .cloned()
            .collect();
        Ok(sorted_desc(handovers, |h: &Handover| (h.handover_date, h.created_at)))
    }

    async fn list_handovers_in_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepoResult<Vec<Handover>> {
        let state = self.state.read().await;
        let handovers = state
            .handovers
            .values()
            .filter(|h| (from..=to).contains(&h.handover_date))
            .cloned()
            .collect();
        Ok(sorted_desc(handovers, |h: &Handover| (h.handover_date, h.created_at)))
    }

    async fn insert_handover(&self, new: NewHandover) -> RepoResult<Handover> {
        self.check_handover_write()?;

        let handover = Handover {
            id: HandoverId::new(),
            case_id: new.case_id,
            donation_id: new.donation_id,
            handover_amount: new.handover_amount,
            handover_date: new.handover_date,
            handover_notes: new.handover_notes,
            is_report_checkpoint: new.is_report_checkpoint,
            report_image_url: new.report_image_url,
            created_at: Utc::now(),
        };
        self.state
            .write()
            .await
            .handovers
            .insert(handover.id, handover.clone());
        Ok(handover)
    }

    async fn update_handover(&self, id: HandoverId, patch: HandoverPatch) -> RepoResult<Handover> {
        self.check_handover_write()?;

        let mut state = self.state.write().await;
        let handover = state
            .handovers
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found("handover", id))?;
        handover.donation_id = patch.donation_id;
        handover.handover_amount = patch.handover_amount;
        handover.handover_date = patch.handover_date;
        handover.handover_notes = patch.handover_notes;
        handover.is_report_checkpoint = patch.is_report_checkpoint;
        handover.report_image_url = patch.report_image_url;
        Ok(handover.clone())
    }

    async fn insert_followup(&self, new: NewFollowup) -> RepoResult<Followup> {
        let mut state = self.state.write().await;
        if !state.cases.contains_key(&new.case_id) {
            return Err(RepositoryError::not_found("case", new.case_id));
        }

        let followup = Followup {
            id: FollowupActionId::new(),
            case_id: new.case_id,
            title: new.title,
            description: new.description,
            action_date: new.action_date,
            requires_case_action: new.requires_case_action,
            requires_volunteer_action: new.requires_volunteer_action,
            answer_type: new.answer_type,
            answer_options: new.answer_options,
            answer: None,
            status: FollowupStatus::Pending,
            completed_at: None,
            completed_by: None,
            completion_notes: None,
            created_by: Some(new.created_by),
            created_at: Utc::now(),
        };
        state.followups.insert(followup.id, followup.clone());
        Ok(followup)
    }

    async fn find_followup(&self, id: FollowupActionId) -> RepoResult<Followup> {
        let state = self.state.read().await;
        state
            .followups
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("followup", id))
    }

    async fn list_followups_by_case(&self, case_id: CaseId) -> RepoResult<Vec<Followup>> {
        let state = self.state.read().await;
        let mut followups: Vec<Followup> = state
            .followups
            .values()
            .filter(|f| f.case_id == case_id)
            .cloned()
            .collect();
        followups.sort_by_key(|f| (f.action_date, f.created_at));
        Ok(followups)
    }

    async fn update_followup_status(
        &self,
        id: FollowupActionId,
        resolution: &FollowupResolution,
    ) -> RepoResult<Followup> {
        let mut state = self.state.write().await;
        let followup = state
            .followups
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found("followup", id))?;

        followup.status = resolution.new_status();
        if let FollowupResolution::Complete {
            completed_by,
            completed_at,
            answer,
            completion_notes,
            ..
        } = resolution
        {
            followup.completed_by = Some(*completed_by);
            followup.completed_at = Some(*completed_at);
            followup.answer.clone_from(answer);
            followup.completion_notes.clone_from(completion_notes);
        }
        Ok(followup.clone())
    }

    async fn roles_for_user(&self, user_id: UserId) -> RepoResult<Vec<Role>> {
        let state = self.state.read().await;
        Ok(state.roles.get(&user_id).cloned().unwrap_or_default())
    }

    async fn grant_role(&self, user_id: UserId, role: Role) -> RepoResult<()> {
        let mut state = self.state.write().await;
        let roles = state.roles.entry(user_id).or_default();
        if !roles.contains(&role) {
            roles.push(role);
        }
        Ok(())
    }
}
