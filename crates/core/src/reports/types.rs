//! Report data types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use kafala_shared::types::{CaseId, DonationId};

use super::error::ReportError;
use crate::ledger::{Case, Donation, DonationStatus, DonationType, Handover, LifecycleStatus, MonthKey};

/// Default number of trailing months in the monthly report.
pub const DEFAULT_WINDOW_MONTHS: u32 = 12;

/// Trailing calendar months ending at (and including) `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthWindow {
    end: MonthKey,
    months: u32,
}

impl MonthWindow {
    /// Creates a window of `months` months ending at `end`.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::EmptyWindow` when `months` is zero.
    pub const fn new(end: MonthKey, months: u32) -> Result<Self, ReportError> {
        if months == 0 {
            return Err(ReportError::EmptyWindow);
        }
        Ok(Self { end, months })
    }

    /// Like [`MonthWindow::new`] with an upper bound on `months`.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::WindowTooLarge` when `months` exceeds `max`.
    pub const fn bounded(end: MonthKey, months: u32, max: u32) -> Result<Self, ReportError> {
        if months > max {
            return Err(ReportError::WindowTooLarge { months, max });
        }
        Self::new(end, months)
    }

    /// The default twelve-month window ending at `end`.
    #[must_use]
    pub const fn trailing_year(end: MonthKey) -> Self {
        Self {
            end,
            months: DEFAULT_WINDOW_MONTHS,
        }
    }

    /// First month of the window.
    #[must_use]
    pub fn start(&self) -> MonthKey {
        self.end.minus(self.months - 1)
    }

    /// Last month of the window.
    #[must_use]
    pub const fn end(&self) -> MonthKey {
        self.end
    }

    /// Number of months covered.
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.months
    }

    /// Always false; windows cover at least one month.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Months of the window, oldest first.
    #[must_use]
    pub fn months(&self) -> Vec<MonthKey> {
        let mut keys = Vec::with_capacity(self.months as usize);
        let mut current = self.start();
        for _ in 0..self.months {
            keys.push(current);
            current = current.next();
        }
        keys
    }
}

/// A donation handed over before handover records existed.
///
/// The migration boundary is the `redeemed` status: only donations carrying
/// that marker and a confirmation timestamp become legacy redemptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegacyRedemption {
    /// Source donation.
    pub donation_id: DonationId,
    /// Receiving case.
    pub case_id: CaseId,
    /// Amount handed over.
    pub amount: Decimal,
    /// Monthly or custom donation.
    pub donation_type: DonationType,
    /// When the money counted as spent (the donation's confirmation time).
    pub redeemed_at: DateTime<Utc>,
}

impl LegacyRedemption {
    /// Builds a legacy redemption from a `redeemed` donation.
    #[must_use]
    pub fn from_donation(donation: &Donation) -> Option<Self> {
        if donation.status != DonationStatus::Redeemed {
            return None;
        }
        donation.confirmed_at.map(|redeemed_at| Self {
            donation_id: donation.id,
            case_id: donation.case_id,
            amount: donation.amount,
            donation_type: donation.donation_type,
            redeemed_at,
        })
    }
}

/// The separate input streams of the monthly rollup.
#[derive(Debug, Clone, Copy, Default)]
pub struct RollupInput<'a> {
    /// Cases, for lifecycle counts.
    pub cases: &'a [Case],
    /// Donations counted by their confirmation month.
    pub confirmed_donations: &'a [Donation],
    /// Handover records.
    pub handovers: &'a [Handover],
    /// Spending recorded before handover records existed.
    pub legacy_redemptions: &'a [LegacyRedemption],
}

/// Case lifecycle events in one month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CaseLifecycleBucket {
    /// Cases created in the month.
    pub new_cases: usize,
    /// Cases moved to a dropped lifecycle status in the month.
    pub dropped_cases: usize,
    /// Cases completed in the month.
    pub completed_cases: usize,
    /// Dropped cases per lifecycle status.
    pub dropped_by_reason: BTreeMap<LifecycleStatus, usize>,
}

impl AsMut<Self> for CaseLifecycleBucket {
    fn as_mut(&mut self) -> &mut Self {
        self
    }
}

/// One month of the rollup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyBucket {
    /// The month.
    pub month: MonthKey,
    /// Case lifecycle events.
    #[serde(flatten)]
    pub cases: CaseLifecycleBucket,
    /// Sum of handovers filed in the month.
    pub handover_spending: Decimal,
    /// Sum of legacy redemptions in the month.
    pub legacy_spending: Decimal,
    /// `handover_spending + legacy_spending`.
    pub total_spending: Decimal,
    /// Number of handovers filed in the month.
    pub handover_count: usize,
    /// Donations confirmed in the month.
    pub confirmed_count: usize,
}

impl MonthlyBucket {
    /// An all-zero bucket.
    #[must_use]
    pub fn empty(month: MonthKey) -> Self {
        Self {
            month,
            cases: CaseLifecycleBucket::default(),
            handover_spending: Decimal::ZERO,
            legacy_spending: Decimal::ZERO,
            total_spending: Decimal::ZERO,
            handover_count: 0,
            confirmed_count: 0,
        }
    }

    /// Returns true if nothing happened in the month.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::empty(self.month)
    }
}

impl AsMut<CaseLifecycleBucket> for MonthlyBucket {
    fn as_mut(&mut self) -> &mut CaseLifecycleBucket {
        &mut self.cases
    }
}

/// Totals across the whole window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RollupTotals {
    /// Cases created.
    pub new_cases: usize,
    /// Cases dropped.
    pub dropped_cases: usize,
    /// Cases completed.
    pub completed_cases: usize,
    /// Handover spending.
    pub handover_spending: Decimal,
    /// Legacy spending.
    pub legacy_spending: Decimal,
    /// All spending.
    pub total_spending: Decimal,
    /// Handovers filed.
    pub handover_count: usize,
    /// Donations confirmed.
    pub confirmed_count: usize,
}

/// Monthly rollup ordered oldest month first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyRollup {
    /// First month.
    pub start: MonthKey,
    /// Last month.
    pub end: MonthKey,
    /// One bucket per month.
    pub buckets: Vec<MonthlyBucket>,
    /// Window totals.
    pub totals: RollupTotals,
}

/// Confirmed donations grouped by confirmation month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyDonationSummary {
    /// The month.
    pub month: MonthKey,
    /// Sum of confirmed amounts.
    pub total_donations: Decimal,
    /// Sum of stored handed-over totals.
    pub total_handed_over: Decimal,
    /// Confirmed money still to hand over.
    pub ready_to_handover: Decimal,
    /// Number of donations.
    pub confirmed_count: usize,
}

/// Legacy redemptions of one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseRedemptionSummary {
    /// The case.
    pub case_id: CaseId,
    /// Sum of redeemed amounts.
    pub total_amount: Decimal,
    /// Number of redeemed donations.
    pub donation_count: usize,
    /// Monthly donations among them.
    pub monthly_count: usize,
    /// Custom donations among them.
    pub custom_count: usize,
}

/// Handovers of one case in one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthHandovers {
    /// The month.
    pub month: MonthKey,
    /// Sum of the month's handovers.
    pub total: Decimal,
    /// Whether a report checkpoint was recorded this month.
    pub has_report_checkpoint: bool,
    /// The handovers, latest first.
    pub handovers: Vec<Handover>,
}
