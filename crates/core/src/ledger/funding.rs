//! Funding aggregation over fetched ledger records.
//!
//! Every function here is pure: inputs are borrowed, nothing is cached, and
//! the same inputs always produce the same summary.

use rust_decimal::Decimal;
use serde::Serialize;

use kafala_shared::types::{CaseId, HandoverId};

use super::error::LedgerError;
use super::types::{Case, Donation, DonationStatus, Handover};

/// Funding progress of one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseFundingSummary {
    /// The case.
    pub case_id: CaseId,
    /// `monthly_cost × max(months_needed, 1)`.
    pub target_amount: Decimal,
    /// Sum of confirmed donation amounts.
    pub total_pledged: Decimal,
    /// Sum of pending donation amounts, informational only.
    pub total_pending: Decimal,
    /// Sum of this case's handovers.
    pub total_handed_over: Decimal,
    /// Confirmed money not yet handed over, floored at zero.
    pub remaining_to_handover: Decimal,
    /// Confirmed pledges against target, 0-100 with 2 decimal places.
    pub funding_percentage: Decimal,
    /// Number of confirmed donations.
    pub confirmed_count: usize,
}

/// A confirmed donation that still has money to hand over.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailableDonation {
    /// The donation.
    pub donation: Donation,
    /// Remaining balance computed from handover records.
    pub remaining: Decimal,
}

/// Per-status counts and sums over a set of donations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DonationStats {
    /// All donations.
    pub total_count: usize,
    /// Pending donations.
    pub pending_count: usize,
    /// Confirmed donations.
    pub confirmed_count: usize,
    /// Cancelled donations.
    pub cancelled_count: usize,
    /// Legacy redeemed donations.
    pub redeemed_count: usize,
    /// Sum of all amounts regardless of status.
    pub total_amount: Decimal,
    /// Sum of confirmed amounts.
    pub confirmed_amount: Decimal,
    /// Sum of legacy redeemed amounts.
    pub redeemed_amount: Decimal,
}

/// Computes the funding summary of `case`.
///
/// Only confirmed donations count as pledged. Donations and handovers that
/// belong to other cases are ignored.
///
/// # Errors
///
/// Returns `LedgerError::InvalidCaseConfig` if the case target is not positive.
pub fn compute_case_funding(
    case: &Case,
    donations: &[Donation],
    handovers: &[Handover],
) -> Result<CaseFundingSummary, LedgerError> {
    let target_amount = case.target_amount();
    if target_amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidCaseConfig {
            case_id: case.id.into_inner(),
            monthly_cost: case.monthly_cost,
            months_needed: case.months_needed,
        });
    }

    let own = donations.iter().filter(|d| d.case_id == case.id);

    let mut total_pledged = Decimal::ZERO;
    let mut total_pending = Decimal::ZERO;
    let mut confirmed_count = 0;
    for donation in own {
        match donation.status {
            DonationStatus::Confirmed => {
                total_pledged += donation.amount;
                confirmed_count += 1;
            }
            DonationStatus::Pending => total_pending += donation.amount,
            DonationStatus::Cancelled | DonationStatus::Redeemed => {}
        }
    }

    let total_handed_over: Decimal = handovers
        .iter()
        .filter(|h| h.case_id == case.id)
        .map(|h| h.handover_amount)
        .sum();

    let remaining_to_handover = (total_pledged - total_handed_over).max(Decimal::ZERO);

    let funding_percentage = (total_pledged / target_amount * Decimal::ONE_HUNDRED)
        .min(Decimal::ONE_HUNDRED)
        .round_dp(2);

    Ok(CaseFundingSummary {
        case_id: case.id,
        target_amount,
        total_pledged,
        total_pending,
        total_handed_over,
        remaining_to_handover,
        funding_percentage,
        confirmed_count,
    })
}

/// Computes how much of `donation` is still available for handovers.
///
/// # Errors
///
/// Returns `LedgerError::LedgerInconsistency` if the donation's handovers add
/// up to more than its amount. The value is never clamped.
pub fn compute_donation_remaining(
    donation: &Donation,
    handovers: &[Handover],
) -> Result<Decimal, LedgerError> {
    remaining_excluding(donation, handovers, None)
}

/// Like [`compute_donation_remaining`], ignoring the handover being edited.
///
/// # Errors
///
/// Returns `LedgerError::LedgerInconsistency` if the remaining handovers add
/// up to more than the donation amount.
pub fn remaining_excluding(
    donation: &Donation,
    handovers: &[Handover],
    exclude: Option<HandoverId>,
) -> Result<Decimal, LedgerError> {
    let handed_over = handed_over_total(donation, handovers, exclude);
    let remaining = donation.amount - handed_over;

    if remaining < Decimal::ZERO {
        return Err(LedgerError::LedgerInconsistency {
            donation_id: donation.id.into_inner(),
            amount: donation.amount,
            handed_over,
        });
    }

    Ok(remaining)
}

/// Balance a new or edited handover may still claim from `donation`.
///
/// The stored `total_handed_over` can run ahead of the handover rows while
/// another write holds a reservation, so the larger of the two counts as
/// committed. The handover being edited is given back in full.
///
/// # Errors
///
/// Returns `LedgerError::LedgerInconsistency` if the handover rows alone
/// already exceed the donation amount.
pub fn reservable_remaining(
    donation: &Donation,
    handovers: &[Handover],
    replacing: Option<HandoverId>,
) -> Result<Decimal, LedgerError> {
    remaining_excluding(donation, handovers, replacing)?;

    let recorded = handed_over_total(donation, handovers, None);
    let replaced = handovers
        .iter()
        .filter(|h| h.donation_id == donation.id && Some(h.id) == replacing)
        .map(|h| h.handover_amount)
        .sum::<Decimal>();
    let committed = recorded.max(donation.total_handed_over) - replaced;

    Ok((donation.amount - committed).max(Decimal::ZERO))
}

/// Sum of handovers drawn from `donation`, optionally skipping one.
#[must_use]
pub fn handed_over_total(
    donation: &Donation,
    handovers: &[Handover],
    exclude: Option<HandoverId>,
) -> Decimal {
    handovers
        .iter()
        .filter(|h| h.donation_id == donation.id)
        .filter(|h| Some(h.id) != exclude)
        .map(|h| h.handover_amount)
        .sum()
}

/// Confirmed donations with a positive remaining balance, newest first.
///
/// # Errors
///
/// Returns `LedgerError::LedgerInconsistency` if any confirmed donation is
/// over-allocated.
pub fn available_donations(
    donations: &[Donation],
    handovers: &[Handover],
) -> Result<Vec<AvailableDonation>, LedgerError> {
    let mut available = Vec::new();
    for donation in donations.iter().filter(|d| d.is_confirmed()) {
        let remaining = compute_donation_remaining(donation, handovers)?;
        if remaining > Decimal::ZERO {
            available.push(AvailableDonation {
                donation: donation.clone(),
                remaining,
            });
        }
    }

    available.sort_by(|a, b| b.donation.created_at.cmp(&a.donation.created_at));
    Ok(available)
}

/// Counts and sums donations per status.
#[must_use]
pub fn donation_status_stats(donations: &[Donation]) -> DonationStats {
    donations
        .iter()
        .fold(DonationStats::default(), |mut stats, donation| {
            stats.total_count += 1;
            stats.total_amount += donation.amount;
            match donation.status {
                DonationStatus::Pending => stats.pending_count += 1,
                DonationStatus::Confirmed => {
                    stats.confirmed_count += 1;
                    stats.confirmed_amount += donation.amount;
                }
                DonationStatus::Cancelled => stats.cancelled_count += 1,
                DonationStatus::Redeemed => {
                    stats.redeemed_count += 1;
                    stats.redeemed_amount += donation.amount;
                }
            }
            stats
        })
}
