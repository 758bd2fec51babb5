//! Stored models to domain records.
//!
//! Amounts are re-rounded to cents on the way out: `SQLite` hands decimals
//! back through `f64`.

use chrono::Utc;

use kafala_core::ledger::{Case, CaseStatus, Donation, Handover, round_amount};
use kafala_core::workflow::Followup;
use kafala_shared::types::UserId;

use crate::entities::{cases, donation_handovers, donations, followup_actions};

impl From<cases::Model> for Case {
    fn from(model: cases::Model) -> Self {
        Self {
            id: model.id.into(),
            title: model.title,
            title_ar: model.title_ar,
            monthly_cost: round_amount(model.monthly_cost),
            months_needed: model.months_needed,
            months_covered: model.months_covered,
            status: CaseStatus::parse(&model.status),
            lifecycle_status: model.lifecycle_status.into(),
            is_published: model.is_published,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<donations::Model> for Donation {
    fn from(model: donations::Model) -> Self {
        Self {
            id: model.id.into(),
            case_id: model.case_id.into(),
            donor_name: model.donor_name,
            donor_email: model.donor_email,
            amount: round_amount(model.amount),
            donation_type: model.donation_type.into(),
            months_pledged: model.months_pledged,
            status: model.status.into(),
            payment_code: model.payment_code,
            payment_reference: model.payment_reference,
            admin_notes: model.admin_notes,
            total_handed_over: round_amount(model.total_handed_over),
            version: model.version,
            created_at: model.created_at.with_timezone(&Utc),
            confirmed_at: model.confirmed_at.map(|at| at.with_timezone(&Utc)),
        }
    }
}

impl From<donation_handovers::Model> for Handover {
    fn from(model: donation_handovers::Model) -> Self {
        Self {
            id: model.id.into(),
            case_id: model.case_id.into(),
            donation_id: model.donation_id.into(),
            handover_amount: round_amount(model.handover_amount),
            handover_date: model.handover_date,
            handover_notes: model.handover_notes,
            is_report_checkpoint: model.is_report_checkpoint,
            report_image_url: model.report_image_url,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<followup_actions::Model> for Followup {
    fn from(model: followup_actions::Model) -> Self {
        let answer_options = model
            .answer_options
            .and_then(|options| serde_json::from_value(options).ok())
            .unwrap_or_default();

        Self {
            id: model.id.into(),
            case_id: model.case_id.into(),
            title: model.title,
            description: model.description,
            action_date: model.action_date,
            requires_case_action: model.requires_case_action,
            requires_volunteer_action: model.requires_volunteer_action,
            answer_type: model.answer_type.into(),
            answer_options,
            answer: model.answer,
            status: model.status.into(),
            completed_at: model.completed_at.map(|at| at.with_timezone(&Utc)),
            completed_by: model.completed_by.map(UserId::from),
            completion_notes: model.completion_notes,
            created_by: model.created_by.map(UserId::from),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
