//! `SeaORM` implementation of [`LedgerRepository`].

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde_json::json;
use uuid::Uuid;

use kafala_core::ledger::{Case, Donation, DonationStatus, Handover};
use kafala_core::workflow::{DonationAction, Followup, FollowupResolution, Pledge};
use kafala_shared::auth::Role;
use kafala_shared::types::{CaseId, DonationId, FollowupActionId, HandoverId, UserId};

use crate::entities::{
    cases, donation_handovers, donations, followup_actions, sea_orm_active_enums as db, user_roles,
};

use super::ledger::{
    CasePatch, HandoverPatch, LedgerRepository, NewCase, NewFollowup, NewHandover, RepoResult,
    RepositoryError,
};

/// Ledger repository backed by a `SeaORM` connection.
#[derive(Debug, Clone)]
pub struct SeaLedgerRepository {
    db: DatabaseConnection,
}

impl SeaLedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Resolves a zero-row conditional update into the right error.
    async fn stale_or_missing(&self, id: DonationId) -> RepositoryError {
        match donations::Entity::find_by_id(Uuid::from(id)).one(&self.db).await {
            Ok(Some(_)) => RepositoryError::ConcurrentModification(id),
            Ok(None) => RepositoryError::not_found("donation", id),
            Err(e) => e.into(),
        }
    }
}

#[async_trait]
impl LedgerRepository for SeaLedgerRepository {
    async fn find_case(&self, id: CaseId) -> RepoResult<Case> {
        cases::Entity::find_by_id(Uuid::from(id))
            .one(&self.db)
            .await?
            .map(Case::from)
            .ok_or_else(|| RepositoryError::not_found("case", id))
    }

    async fn list_cases(&self) -> RepoResult<Vec<Case>> {
        let models = cases::Entity::find()
            .order_by_desc(cases::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Case::from).collect())
    }

    async fn list_published_cases(&self) -> RepoResult<Vec<Case>> {
        let models = cases::Entity::find()
            .filter(cases::Column::IsPublished.eq(true))
            .order_by_desc(cases::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Case::from).collect())
    }

    async fn insert_case(&self, new: NewCase) -> RepoResult<Case> {
        let now = Utc::now().into();
        let case = cases::ActiveModel {
            id: Set(CaseId::new().into()),
            title: Set(new.title),
            title_ar: Set(new.title_ar),
            monthly_cost: Set(new.monthly_cost),
            months_needed: Set(new.months_needed),
            months_covered: Set(0),
            status: Set(new.status.as_str().to_string()),
            lifecycle_status: Set(new.lifecycle_status.into()),
            is_published: Set(new.is_published),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(case.insert(&self.db).await?.into())
    }

    async fn update_case(&self, id: CaseId, patch: CasePatch) -> RepoResult<Case> {
        let existing = cases::Entity::find_by_id(Uuid::from(id))
            .one(&self.db)
            .await?
            .ok_or_else(|| RepositoryError::not_found("case", id))?;

        let mut case: cases::ActiveModel = existing.into();
        case.title = Set(patch.title);
        case.title_ar = Set(patch.title_ar);
        case.monthly_cost = Set(patch.monthly_cost);
        case.months_needed = Set(patch.months_needed);
        case.status = Set(patch.status.as_str().to_string());
        case.lifecycle_status = Set(patch.lifecycle_status.into());
        case.is_published = Set(patch.is_published);
        case.updated_at = Set(Utc::now().into());

        Ok(case.update(&self.db).await?.into())
    }

    async fn find_donation(&self, id: DonationId) -> RepoResult<Donation> {
        donations::Entity::find_by_id(Uuid::from(id))
            .one(&self.db)
            .await?
            .map(Donation::from)
            .ok_or_else(|| RepositoryError::not_found("donation", id))
    }

    async fn list_donations(&self) -> RepoResult<Vec<Donation>> {
        let models = donations::Entity::find()
            .order_by_desc(donations::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Donation::from).collect())
    }

    async fn list_donations_by_case(&self, case_id: CaseId) -> RepoResult<Vec<Donation>> {
        let models = donations::Entity::find()
            .filter(donations::Column::CaseId.eq(Uuid::from(case_id)))
            .order_by_desc(donations::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Donation::from).collect())
    }

    async fn list_donations_by_status(&self, status: DonationStatus) -> RepoResult<Vec<Donation>> {
        let models = donations::Entity::find()
            .filter(donations::Column::Status.eq(db::DonationStatus::from(status)))
            .order_by_desc(donations::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Donation::from).collect())
    }

    async fn insert_donation(&self, pledge: Pledge) -> RepoResult<Donation> {
        let now = Utc::now().into();
        let donation = donations::ActiveModel {
            id: Set(DonationId::new().into()),
            case_id: Set(pledge.case_id.into()),
            donor_name: Set(pledge.donor_name),
            donor_email: Set(pledge.donor_email),
            amount: Set(pledge.amount),
            donation_type: Set(pledge.donation_type.into()),
            months_pledged: Set(pledge.months_pledged),
            status: Set(db::DonationStatus::Pending),
            payment_code: Set(pledge.payment_code),
            payment_reference: Set(None),
            admin_notes: Set(None),
            total_handed_over: Set(Decimal::ZERO),
            version: Set(0),
            confirmed_by: Set(None),
            created_at: Set(now),
            confirmed_at: Set(None),
            updated_at: Set(now),
        };
        Ok(donation.insert(&self.db).await?.into())
    }

    async fn update_donation_status(
        &self,
        id: DonationId,
        action: &DonationAction,
        expected_version: i64,
    ) -> RepoResult<Donation> {
        let now = Utc::now().fixed_offset();
        let mut update = donations::Entity::update_many()
            .col_expr(
                donations::Column::Status,
                Expr::value(db::DonationStatus::from(action.new_status())),
            )
            .col_expr(
                donations::Column::Version,
                Expr::col(donations::Column::Version).add(1),
            )
            .col_expr(donations::Column::UpdatedAt, Expr::value(now));

        if let Some(notes) = action.admin_notes() {
            update = update.col_expr(
                donations::Column::AdminNotes,
                Expr::value(notes.to_string()),
            );
        }

        if let DonationAction::Confirm {
            confirmed_by,
            confirmed_at,
            payment_reference,
            ..
        } = action
        {
            update = update
                .col_expr(
                    donations::Column::ConfirmedBy,
                    Expr::value(Uuid::from(*confirmed_by)),
                )
                .col_expr(donations::Column::ConfirmedAt, Expr::value(confirmed_at.fixed_offset()))
                .col_expr(
                    donations::Column::PaymentReference,
                    Expr::value(payment_reference.clone()),
                );
        }

        let result = update
            .filter(donations::Column::Id.eq(Uuid::from(id)))
            .filter(donations::Column::Version.eq(expected_version))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(self.stale_or_missing(id).await);
        }

        self.find_donation(id).await
    }

    async fn update_donation_handed_over(
        &self,
        id: DonationId,
        total_handed_over: Decimal,
        expected_version: i64,
    ) -> RepoResult<Donation> {
        let result = donations::Entity::update_many()
            .col_expr(
                donations::Column::TotalHandedOver,
                Expr::value(total_handed_over),
            )
            .col_expr(
                donations::Column::Version,
                Expr::col(donations::Column::Version).add(1),
            )
            .col_expr(donations::Column::UpdatedAt, Expr::value(Utc::now().fixed_offset()))
            .filter(donations::Column::Id.eq(Uuid::from(id)))
            .filter(donations::Column::Version.eq(expected_version))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(self.stale_or_missing(id).await);
        }

        self.find_donation(id).await
    }

    async fn find_handover(&self, id: HandoverId) -> RepoResult<Handover> {
        donation_handovers::Entity::find_by_id(Uuid::from(id))
            .one(&self.db)
            .await?
            .map(Handover::from)
            .ok_or_else(|| RepositoryError::not_found("handover", id))
    }

    async fn list_handovers_by_case(&self, case_id: CaseId) -> RepoResult<Vec<Handover>> {
        let models = donation_handovers::Entity::find()
            .filter(donation_handovers::Column::CaseId.eq(Uuid::from(case_id)))
            .order_by_desc(donation_handovers::Column::HandoverDate)
            .order_by_desc(donation_handovers::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Handover::from).collect())
    }

    async fn list_handovers_by_donation(
        &self,
        donation_id: DonationId,
    ) -> RepoResult<Vec<Handover>> {
        let models = donation_handovers::Entity::find()
            .filter(donation_handovers::Column::DonationId.eq(Uuid::from(donation_id)))
            .order_by_desc(donation_handovers::Column::HandoverDate)
            .order_by_desc(donation_handovers::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Handover::from).collect())
    }

    async fn list_handovers_in_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepoResult<Vec<Handover>> {
        let models = donation_handovers::Entity::find()
            .filter(donation_handovers::Column::HandoverDate.gte(from))
            .filter(donation_handovers::Column::HandoverDate.lte(to))
            .order_by_desc(donation_handovers::Column::HandoverDate)
            .order_by_desc(donation_handovers::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Handover::from).collect())
    }

    async fn insert_handover(&self, new: NewHandover) -> RepoResult<Handover> {
        let now = Utc::now().into();
        let handover = donation_handovers::ActiveModel {
            id: Set(HandoverId::new().into()),
            case_id: Set(new.case_id.into()),
            donation_id: Set(new.donation_id.into()),
            handover_amount: Set(new.handover_amount),
            handover_date: Set(new.handover_date),
            handover_notes: Set(new.handover_notes),
            is_report_checkpoint: Set(new.is_report_checkpoint),
            report_image_url: Set(new.report_image_url),
            created_by: Set(Some(new.created_by.into())),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(handover.insert(&self.db).await?.into())
    }

    async fn update_handover(&self, id: HandoverId, patch: HandoverPatch) -> RepoResult<Handover> {
        let existing = donation_handovers::Entity::find_by_id(Uuid::from(id))
            .one(&self.db)
            .await?
            .ok_or_else(|| RepositoryError::not_found("handover", id))?;

        let mut handover: donation_handovers::ActiveModel = existing.into();
        handover.donation_id = Set(patch.donation_id.into());
        handover.handover_amount = Set(patch.handover_amount);
        handover.handover_date = Set(patch.handover_date);
        handover.handover_notes = Set(patch.handover_notes);
        handover.is_report_checkpoint = Set(patch.is_report_checkpoint);
        handover.report_image_url = Set(patch.report_image_url);
        handover.updated_at = Set(Utc::now().into());

        Ok(handover.update(&self.db).await?.into())
    }

    async fn insert_followup(&self, new: NewFollowup) -> RepoResult<Followup> {
        let now = Utc::now().into();
        let answer_options = (!new.answer_options.is_empty()).then(|| json!(new.answer_options));
        let followup = followup_actions::ActiveModel {
            id: Set(FollowupActionId::new().into()),
            case_id: Set(new.case_id.into()),
            title: Set(new.title),
            description: Set(new.description),
            action_date: Set(new.action_date),
            requires_case_action: Set(new.requires_case_action),
            requires_volunteer_action: Set(new.requires_volunteer_action),
            answer_type: Set(new.answer_type.into()),
            answer_options: Set(answer_options),
            answer: Set(None),
            status: Set(db::FollowupStatus::Pending),
            completed_at: Set(None),
            completed_by: Set(None),
            completion_notes: Set(None),
            created_by: Set(Some(new.created_by.into())),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(followup.insert(&self.db).await?.into())
    }

    async fn find_followup(&self, id: FollowupActionId) -> RepoResult<Followup> {
        followup_actions::Entity::find_by_id(Uuid::from(id))
            .one(&self.db)
            .await?
            .map(Followup::from)
            .ok_or_else(|| RepositoryError::not_found("followup", id))
    }

    async fn list_followups_by_case(&self, case_id: CaseId) -> RepoResult<Vec<Followup>> {
        let models = followup_actions::Entity::find()
            .filter(followup_actions::Column::CaseId.eq(Uuid::from(case_id)))
            .order_by_asc(followup_actions::Column::ActionDate)
            .order_by_asc(followup_actions::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Followup::from).collect())
    }

    async fn update_followup_status(
        &self,
        id: FollowupActionId,
        resolution: &FollowupResolution,
    ) -> RepoResult<Followup> {
        let existing = followup_actions::Entity::find_by_id(Uuid::from(id))
            .one(&self.db)
            .await?
            .ok_or_else(|| RepositoryError::not_found("followup", id))?;

        let mut followup: followup_actions::ActiveModel = existing.into();
        followup.status = Set(resolution.new_status().into());
        if let FollowupResolution::Complete {
            completed_by,
            completed_at,
            answer,
            completion_notes,
            ..
        } = resolution
        {
            followup.completed_by = Set(Some((*completed_by).into()));
            followup.completed_at = Set(Some((*completed_at).into()));
            followup.answer = Set(answer.clone());
            followup.completion_notes = Set(completion_notes.clone());
        }
        followup.updated_at = Set(Utc::now().into());

        Ok(followup.update(&self.db).await?.into())
    }

    async fn roles_for_user(&self, user_id: UserId) -> RepoResult<Vec<Role>> {
        let rows = user_roles::Entity::find()
            .filter(user_roles::Column::UserId.eq(Uuid::from(user_id)))
            .all(&self.db)
            .await?;
        Ok(rows.iter().filter_map(|row| Role::parse(&row.role)).collect())
    }

    async fn grant_role(&self, user_id: UserId, role: Role) -> RepoResult<()> {
        if self.roles_for_user(user_id).await?.contains(&role) {
            return Ok(());
        }

        let row = user_roles::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(user_id.into()),
            role: Set(role.as_str().to_string()),
            created_at: Set(Utc::now().into()),
        };
        row.insert(&self.db).await?;
        Ok(())
    }
}
