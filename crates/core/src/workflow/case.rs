//! Admin edits to cases: field validation and lifecycle changes.
//!
//! Any lifecycle status may follow any other. The store stamps
//! `updated_at` on every edit, and the monthly rollup reads that stamp as
//! the month a case dropped out or completed.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::ledger::{Case, CaseStatus, LifecycleStatus, MAX_AMOUNT, round_amount};
use crate::workflow::error::WorkflowError;
use crate::workflow::service::non_blank;

/// A new case as submitted by an admin.
#[derive(Debug, Clone, Deserialize)]
pub struct CaseInput {
    /// Display title.
    pub title: String,
    /// Arabic title.
    #[serde(default)]
    pub title_ar: Option<String>,
    /// Cost of one month of sponsorship.
    pub monthly_cost: Decimal,
    /// Months of sponsorship needed.
    #[serde(default)]
    pub months_needed: Option<i32>,
    /// Visible to donors.
    #[serde(default)]
    pub is_published: bool,
}

/// Changes to an existing case. Absent fields keep their stored value; a
/// blank Arabic title clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaseChanges {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New Arabic title.
    #[serde(default)]
    pub title_ar: Option<String>,
    /// New monthly cost.
    #[serde(default)]
    pub monthly_cost: Option<Decimal>,
    /// New months needed.
    #[serde(default)]
    pub months_needed: Option<i32>,
    /// New coverage status.
    #[serde(default)]
    pub status: Option<CaseStatus>,
    /// New lifecycle status.
    #[serde(default)]
    pub lifecycle_status: Option<LifecycleStatus>,
    /// Publish or unpublish.
    #[serde(default)]
    pub is_published: Option<bool>,
}

/// Validated case fields, ready to store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseDraft {
    /// Trimmed title.
    pub title: String,
    /// Trimmed Arabic title.
    pub title_ar: Option<String>,
    /// Monthly cost rounded to cents.
    pub monthly_cost: Decimal,
    /// Months of sponsorship needed.
    pub months_needed: Option<i32>,
    /// Coverage status.
    pub status: CaseStatus,
    /// Lifecycle status.
    pub lifecycle_status: LifecycleStatus,
    /// Visible to donors.
    pub is_published: bool,
}

impl CaseDraft {
    /// Validates a new case. New cases start active.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::TitleRequired` for a blank title, or
    /// `WorkflowError::InvalidCase` for a cost or duration out of range.
    pub fn create(input: CaseInput) -> Result<Self, WorkflowError> {
        Self {
            title: input.title,
            title_ar: non_blank(input.title_ar),
            monthly_cost: input.monthly_cost,
            months_needed: input.months_needed,
            status: CaseStatus::Active,
            lifecycle_status: LifecycleStatus::Active,
            is_published: input.is_published,
        }
        .validated()
    }

    /// Applies `changes` over the stored `case` and validates the result.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create`].
    pub fn edit(case: &Case, changes: CaseChanges) -> Result<Self, WorkflowError> {
        Self {
            title: changes.title.unwrap_or_else(|| case.title.clone()),
            title_ar: match changes.title_ar {
                Some(title_ar) => non_blank(Some(title_ar)),
                None => case.title_ar.clone(),
            },
            monthly_cost: changes.monthly_cost.unwrap_or(case.monthly_cost),
            months_needed: changes.months_needed.or(case.months_needed),
            status: changes.status.unwrap_or(case.status),
            lifecycle_status: changes.lifecycle_status.unwrap_or(case.lifecycle_status),
            is_published: changes.is_published.unwrap_or(case.is_published),
        }
        .validated()
    }

    fn validated(mut self) -> Result<Self, WorkflowError> {
        self.title = self.title.trim().to_string();
        if self.title.is_empty() {
            return Err(WorkflowError::TitleRequired);
        }

        self.monthly_cost = round_amount(self.monthly_cost);
        if self.monthly_cost <= Decimal::ZERO || self.monthly_cost > MAX_AMOUNT {
            return Err(WorkflowError::InvalidCase(format!(
                "monthly cost must be between 0.01 and {MAX_AMOUNT}"
            )));
        }

        if self.months_needed.is_some_and(|months| months < 1) {
            return Err(WorkflowError::InvalidCase(
                "months needed must be at least 1".to_string(),
            ));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::ledger::funding::fixtures::case;

    fn input(title: &str, monthly_cost: Decimal, months_needed: Option<i32>) -> CaseInput {
        CaseInput {
            title: title.to_string(),
            title_ar: Some("  ".to_string()),
            monthly_cost,
            months_needed,
            is_published: true,
        }
    }

    #[test]
    fn test_create_trims_and_starts_active() {
        let draft = CaseDraft::create(input("  Family of four ", dec!(420.555), Some(6))).unwrap();

        assert_eq!(draft.title, "Family of four");
        assert_eq!(draft.title_ar, None);
        assert_eq!(draft.monthly_cost, dec!(420.56));
        assert_eq!(draft.status, CaseStatus::Active);
        assert_eq!(draft.lifecycle_status, LifecycleStatus::Active);
    }

    #[rstest]
    #[case("   ", dec!(100), None, "TITLE_REQUIRED")]
    #[case("Family", dec!(0), None, "INVALID_CASE")]
    #[case("Family", dec!(-1), None, "INVALID_CASE")]
    #[case("Family", dec!(10000000000), None, "INVALID_CASE")]
    #[case("Family", dec!(100), Some(0), "INVALID_CASE")]
    fn test_create_rejects(
        #[case] title: &str,
        #[case] monthly_cost: Decimal,
        #[case] months_needed: Option<i32>,
        #[case] code: &str,
    ) {
        let err = CaseDraft::create(input(title, monthly_cost, months_needed)).unwrap_err();
        assert_eq!(err.error_code(), code);
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_edit_keeps_absent_fields() {
        let mut stored = case(dec!(300), Some(10));
        stored.title_ar = Some("عائلة".to_string());

        let draft = CaseDraft::edit(
            &stored,
            CaseChanges {
                lifecycle_status: Some(LifecycleStatus::Removed),
                ..CaseChanges::default()
            },
        )
        .unwrap();

        assert_eq!(draft.title, stored.title);
        assert_eq!(draft.title_ar, stored.title_ar);
        assert_eq!(draft.monthly_cost, dec!(300));
        assert_eq!(draft.months_needed, Some(10));
        assert_eq!(draft.lifecycle_status, LifecycleStatus::Removed);
        assert!(draft.is_published);
    }

    #[test]
    fn test_edit_clears_blank_arabic_title() {
        let mut stored = case(dec!(300), Some(10));
        stored.title_ar = Some("عائلة".to_string());

        let draft = CaseDraft::edit(
            &stored,
            CaseChanges {
                title_ar: Some(String::new()),
                is_published: Some(false),
                ..CaseChanges::default()
            },
        )
        .unwrap();
        assert_eq!(draft.title_ar, None);
        assert!(!draft.is_published);
    }

    #[rstest]
    #[case(LifecycleStatus::Completed, LifecycleStatus::Active)]
    #[case(LifecycleStatus::Parked, LifecycleStatus::UnderMoreInvestigation)]
    #[case(LifecycleStatus::Removed, LifecycleStatus::Completed)]
    fn test_any_lifecycle_change_is_allowed(
        #[case] from: LifecycleStatus,
        #[case] to: LifecycleStatus,
    ) {
        let mut stored = case(dec!(300), None);
        stored.lifecycle_status = from;
        let changes = CaseChanges {
            lifecycle_status: Some(to),
            ..CaseChanges::default()
        };
        assert_eq!(CaseDraft::edit(&stored, changes).unwrap().lifecycle_status, to);
    }

    #[test]
    fn test_edit_rejects_blank_title() {
        let stored = case(dec!(300), None);
        let changes = CaseChanges {
            title: Some(" ".to_string()),
            ..CaseChanges::default()
        };
        assert_eq!(
            CaseDraft::edit(&stored, changes),
            Err(WorkflowError::TitleRequired)
        );
    }

    #[test]
    fn test_changes_deserialize_snake_case_lifecycle() {
        let changes: CaseChanges = serde_json::from_str(
            r#"{"lifecycle_status":"under_more_investigation","monthly_cost":"250.00"}"#,
        )
        .unwrap();
        assert_eq!(
            changes.lifecycle_status,
            Some(LifecycleStatus::UnderMoreInvestigation)
        );
        assert_eq!(changes.monthly_cost, Some(dec!(250.00)));
        assert!(changes.title.is_none());
    }
}
