//! Report generation service.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use kafala_shared::types::CaseId;

use super::types::{
    CaseLifecycleBucket, CaseRedemptionSummary, LegacyRedemption, MonthHandovers, MonthWindow,
    MonthlyBucket, MonthlyDonationSummary, MonthlyRollup, RollupInput, RollupTotals,
};
use crate::ledger::{Case, Donation, DonationType, Handover, LifecycleStatus, MonthKey};

/// Service for generating ledger reports.
///
/// All operations are read-only over the supplied slices.
pub struct ReportService;

impl ReportService {
    /// Buckets case lifecycle events, spending and confirmations by month.
    ///
    /// Every month of the window gets a bucket, including empty ones.
    /// Handovers are bucketed by `handover_date`, legacy redemptions by
    /// `redeemed_at`, donations by `confirmed_at`. Records outside the
    /// window are ignored.
    #[must_use]
    pub fn rollup_by_month(input: &RollupInput<'_>, window: &MonthWindow) -> MonthlyRollup {
        let mut buckets: BTreeMap<MonthKey, MonthlyBucket> = window
            .months()
            .into_iter()
            .map(|month| (month, MonthlyBucket::empty(month)))
            .collect();

        for case in input.cases {
            Self::record_case(case, &mut buckets);
        }

        for handover in input.handovers {
            let month = MonthKey::from_date(handover.handover_date);
            if let Some(bucket) = buckets.get_mut(&month) {
                bucket.handover_spending += handover.handover_amount;
                bucket.handover_count += 1;
            }
        }

        for redemption in input.legacy_redemptions {
            let month = MonthKey::from_datetime(redemption.redeemed_at);
            if let Some(bucket) = buckets.get_mut(&month) {
                bucket.legacy_spending += redemption.amount;
            }
        }

        for donation in input.confirmed_donations {
            let Some(confirmed_at) = donation.confirmed_at else {
                continue;
            };
            if let Some(bucket) = buckets.get_mut(&MonthKey::from_datetime(confirmed_at)) {
                bucket.confirmed_count += 1;
            }
        }

        let mut totals = RollupTotals::default();
        let buckets: Vec<MonthlyBucket> = buckets
            .into_values()
            .map(|mut bucket| {
                bucket.total_spending = bucket.handover_spending + bucket.legacy_spending;
                totals.new_cases += bucket.cases.new_cases;
                totals.dropped_cases += bucket.cases.dropped_cases;
                totals.completed_cases += bucket.cases.completed_cases;
                totals.handover_spending += bucket.handover_spending;
                totals.legacy_spending += bucket.legacy_spending;
                totals.total_spending += bucket.total_spending;
                totals.handover_count += bucket.handover_count;
                totals.confirmed_count += bucket.confirmed_count;
                bucket
            })
            .collect();

        MonthlyRollup {
            start: window.start(),
            end: window.end(),
            buckets,
            totals,
        }
    }

    /// Case lifecycle counts per month, without spending.
    #[must_use]
    pub fn case_lifecycle_rollup(
        cases: &[Case],
        window: &MonthWindow,
    ) -> Vec<(MonthKey, CaseLifecycleBucket)> {
        let mut buckets: BTreeMap<MonthKey, CaseLifecycleBucket> = window
            .months()
            .into_iter()
            .map(|month| (month, CaseLifecycleBucket::default()))
            .collect();

        for case in cases {
            Self::record_case(case, &mut buckets);
        }

        buckets.into_iter().collect()
    }

    /// Confirmed donations grouped by confirmation month, newest first.
    ///
    /// Uses the stored `total_handed_over` of each donation. Donations
    /// without a confirmation time are skipped.
    #[must_use]
    pub fn confirmed_donations_by_month(donations: &[Donation]) -> Vec<MonthlyDonationSummary> {
        let mut months: BTreeMap<MonthKey, MonthlyDonationSummary> = BTreeMap::new();

        for donation in donations.iter().filter(|d| d.is_confirmed()) {
            let Some(confirmed_at) = donation.confirmed_at else {
                continue;
            };
            let month = MonthKey::from_datetime(confirmed_at);
            let summary = months
                .entry(month)
                .or_insert_with(|| MonthlyDonationSummary {
                    month,
                    total_donations: Decimal::ZERO,
                    total_handed_over: Decimal::ZERO,
                    ready_to_handover: Decimal::ZERO,
                    confirmed_count: 0,
                });
            summary.total_donations += donation.amount;
            summary.total_handed_over += donation.total_handed_over;
            summary.ready_to_handover += donation.stored_remaining().max(Decimal::ZERO);
            summary.confirmed_count += 1;
        }

        months.into_values().rev().collect()
    }

    /// Handovers grouped by calendar month, oldest month first.
    ///
    /// With `year` set, handovers dated in other years are left out. Months
    /// without handovers get no entry.
    #[must_use]
    pub fn handovers_by_month(handovers: &[Handover], year: Option<i32>) -> Vec<MonthHandovers> {
        let mut months: BTreeMap<MonthKey, MonthHandovers> = BTreeMap::new();

        for handover in handovers {
            let month = MonthKey::from_date(handover.handover_date);
            if year.is_some_and(|year| month.year() != year) {
                continue;
            }
            let entry = months.entry(month).or_insert_with(|| MonthHandovers {
                month,
                total: Decimal::ZERO,
                has_report_checkpoint: false,
                handovers: Vec::new(),
            });
            entry.total += handover.handover_amount;
            entry.has_report_checkpoint |= handover.is_report_checkpoint;
            entry.handovers.push(handover.clone());
        }

        months
            .into_values()
            .map(|mut entry| {
                entry.handovers.sort_by(|a, b| {
                    (b.handover_date, b.created_at).cmp(&(a.handover_date, a.created_at))
                });
                entry
            })
            .collect()
    }

    /// Legacy redemptions grouped per case, ordered by case ID.
    #[must_use]
    pub fn legacy_redemptions_by_case(
        redemptions: &[LegacyRedemption],
    ) -> Vec<CaseRedemptionSummary> {
        let mut cases: BTreeMap<CaseId, CaseRedemptionSummary> = BTreeMap::new();

        for redemption in redemptions {
            let summary = cases
                .entry(redemption.case_id)
                .or_insert_with(|| CaseRedemptionSummary {
                    case_id: redemption.case_id,
                    total_amount: Decimal::ZERO,
                    donation_count: 0,
                    monthly_count: 0,
                    custom_count: 0,
                });
            summary.total_amount += redemption.amount;
            summary.donation_count += 1;
            match redemption.donation_type {
                DonationType::Monthly => summary.monthly_count += 1,
                DonationType::Custom => summary.custom_count += 1,
            }
        }

        cases.into_values().collect()
    }

    /// Counts one case into the window's buckets.
    ///
    /// Creation counts by `created_at`. Drops and completions count by
    /// `updated_at`, the time of the last status change.
    fn record_case<B: AsMut<CaseLifecycleBucket>>(case: &Case, buckets: &mut BTreeMap<MonthKey, B>) {
        if let Some(bucket) = buckets.get_mut(&MonthKey::from_datetime(case.created_at)) {
            bucket.as_mut().new_cases += 1;
        }

        let Some(bucket) = buckets.get_mut(&MonthKey::from_datetime(case.updated_at)) else {
            return;
        };
        let bucket = bucket.as_mut();
        if case.lifecycle_status.is_dropped() {
            bucket.dropped_cases += 1;
            *bucket
                .dropped_by_reason
                .entry(case.lifecycle_status)
                .or_insert(0) += 1;
        } else if case.lifecycle_status == LifecycleStatus::Completed {
            bucket.completed_cases += 1;
        }
    }
}
