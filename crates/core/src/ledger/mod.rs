//! Donation-to-case funding ledger.
//!
//! This module implements the core ledger functionality:
//! - Case, donation and handover records
//! - Calendar month buckets for handovers
//! - Funding aggregation per case and remaining balance per donation
//! - Allocation validation for handovers
//! - Error types for ledger operations

pub mod error;
pub mod funding;
pub mod month;
pub mod types;
pub mod validation;

#[cfg(test)]
mod funding_props;
#[cfg(test)]
mod validation_props;

pub use error::LedgerError;
pub use funding::{
    AvailableDonation, CaseFundingSummary, DonationStats, available_donations,
    compute_case_funding, compute_donation_remaining, donation_status_stats, handed_over_total,
    remaining_excluding, reservable_remaining,
};
pub use month::{HANDOVER_DAY, MonthKey};
pub use types::{Case, CaseStatus, Donation, DonationStatus, DonationType, Handover, LifecycleStatus};
pub use validation::{
    AllocationRejection, AllocationRequest, MAX_AMOUNT, ValidatedAllocation, round_amount,
    validate_allocation,
};
