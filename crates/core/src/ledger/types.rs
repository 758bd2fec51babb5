//! Ledger domain types: cases, donations and handovers.
//!
//! These are plain records as read from the store. Derived values (remaining
//! balance, funding progress) are never stored here; they come from
//! [`super::funding`].

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kafala_shared::types::{CaseId, DonationId, HandoverId};

/// Publication status of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    /// Open for donations.
    Active,
    /// Fully sponsored.
    Completed,
    /// Any other state set by administrators.
    Other,
}

impl CaseStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Other => "other",
        }
    }

    /// Parses a stored status. Unknown values map to `Other`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "active" => Self::Active,
            "completed" => Self::Completed,
            _ => Self::Other,
        }
    }
}

/// Where a case is in its sponsorship lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStatus {
    /// Being sponsored.
    Active,
    /// Removed from the program.
    Removed,
    /// Temporarily set aside.
    Parked,
    /// Pending a further field investigation.
    UnderMoreInvestigation,
    /// Sponsorship finished.
    Completed,
}

impl LifecycleStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Removed => "removed",
            Self::Parked => "parked",
            Self::UnderMoreInvestigation => "under_more_investigation",
            Self::Completed => "completed",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "removed" => Some(Self::Removed),
            "parked" => Some(Self::Parked),
            "under_more_investigation" => Some(Self::UnderMoreInvestigation),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Returns true if the case has dropped out of the program.
    #[must_use]
    pub const fn is_dropped(&self) -> bool {
        matches!(
            self,
            Self::Removed | Self::Parked | Self::UnderMoreInvestigation
        )
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a donation amount was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonationType {
    /// A number of months at the case's monthly cost.
    Monthly,
    /// A free amount.
    Custom,
}

impl DonationType {
    /// Returns the string representation of the type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Custom => "custom",
        }
    }

    /// Parses a donation type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "monthly" => Some(Self::Monthly),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }
}

/// Donation status.
///
/// - Pending → Confirmed (admin verified the payment)
/// - Pending → Cancelled
///
/// `Redeemed` marks donations handed over before handover records existed.
/// Current flows never set it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    /// Awaiting payment verification.
    Pending,
    /// Payment verified.
    Confirmed,
    /// Withdrawn or never paid.
    Cancelled,
    /// Legacy: handed over without handover records.
    Redeemed,
}

impl DonationStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Redeemed => "redeemed",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "cancelled" => Some(Self::Cancelled),
            "redeemed" => Some(Self::Redeemed),
            _ => None,
        }
    }
}

impl fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sponsored family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    /// Case ID.
    pub id: CaseId,
    /// Display title.
    pub title: String,
    /// Arabic display title.
    pub title_ar: Option<String>,
    /// Monthly need.
    pub monthly_cost: Decimal,
    /// Months of sponsorship needed.
    pub months_needed: Option<i32>,
    /// Months already covered.
    pub months_covered: i32,
    /// Publication status.
    pub status: CaseStatus,
    /// Lifecycle status.
    pub lifecycle_status: LifecycleStatus,
    /// Visible to donors.
    pub is_published: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Case {
    /// Funding target: `monthly_cost × max(months_needed, 1)`.
    #[must_use]
    pub fn target_amount(&self) -> Decimal {
        let months = self.months_needed.unwrap_or(1).max(1);
        self.monthly_cost * Decimal::from(months)
    }
}

/// A donor's pledge toward a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    /// Donation ID.
    pub id: DonationId,
    /// Owning case.
    pub case_id: CaseId,
    /// Donor display name.
    pub donor_name: Option<String>,
    /// Donor contact email.
    pub donor_email: Option<String>,
    /// Pledged amount.
    pub amount: Decimal,
    /// Monthly or custom.
    pub donation_type: DonationType,
    /// Months pledged (monthly donations only).
    pub months_pledged: i32,
    /// Status.
    pub status: DonationStatus,
    /// Token the donor quotes when paying.
    pub payment_code: String,
    /// Bank or wallet reference recorded on confirmation.
    pub payment_reference: Option<String>,
    /// Notes left by the reviewing admin.
    pub admin_notes: Option<String>,
    /// Stored running total of handovers.
    pub total_handed_over: Decimal,
    /// Optimistic lock counter, bumped on every write.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Set on transition into `Confirmed`.
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl Donation {
    /// Returns true if the donation counts toward funding.
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.status == DonationStatus::Confirmed
    }

    /// Remaining balance according to the stored running total.
    #[must_use]
    pub fn stored_remaining(&self) -> Decimal {
        self.amount - self.total_handed_over
    }

    /// A confirmed donation with nothing left to hand over.
    #[must_use]
    pub fn is_fully_redeemed(&self) -> bool {
        self.is_confirmed() && self.stored_remaining() <= Decimal::ZERO
    }
}

/// Funds from one donation disbursed to its case in a month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Handover {
    /// Handover ID.
    pub id: HandoverId,
    /// Receiving case.
    pub case_id: CaseId,
    /// Donation drawn from.
    pub donation_id: DonationId,
    /// Amount disbursed.
    pub handover_amount: Decimal,
    /// Filing date, the 15th of the handover month.
    pub handover_date: NaiveDate,
    /// Free-form notes.
    pub handover_notes: Option<String>,
    /// Requires a verification image.
    pub is_report_checkpoint: bool,
    /// Verification image.
    pub report_image_url: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_parse_round_trip() {
        for status in [
            DonationStatus::Pending,
            DonationStatus::Confirmed,
            DonationStatus::Cancelled,
            DonationStatus::Redeemed,
        ] {
            assert_eq!(DonationStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(DonationStatus::parse("refunded"), None);
    }

    #[test]
    fn test_lifecycle_dropped() {
        assert!(LifecycleStatus::Removed.is_dropped());
        assert!(LifecycleStatus::Parked.is_dropped());
        assert!(LifecycleStatus::UnderMoreInvestigation.is_dropped());
        assert!(!LifecycleStatus::Active.is_dropped());
        assert!(!LifecycleStatus::Completed.is_dropped());
        assert_eq!(
            LifecycleStatus::parse("under_more_investigation"),
            Some(LifecycleStatus::UnderMoreInvestigation)
        );
    }

    #[test]
    fn test_case_status_unknown_maps_to_other() {
        assert_eq!(CaseStatus::parse("ACTIVE"), CaseStatus::Active);
        assert_eq!(CaseStatus::parse("archived"), CaseStatus::Other);
    }

    #[test]
    fn test_target_amount_treats_missing_months_as_one() {
        let now = Utc::now();
        let mut case = Case {
            id: CaseId::new(),
            title: "Family".to_string(),
            title_ar: None,
            monthly_cost: dec!(1000),
            months_needed: None,
            months_covered: 0,
            status: CaseStatus::Active,
            lifecycle_status: LifecycleStatus::Active,
            is_published: true,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(case.target_amount(), dec!(1000));

        case.months_needed = Some(0);
        assert_eq!(case.target_amount(), dec!(1000));

        case.months_needed = Some(6);
        assert_eq!(case.target_amount(), dec!(6000));
    }
}
