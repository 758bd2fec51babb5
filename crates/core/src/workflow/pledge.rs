//! Donor pledges: amount calculation and payment codes.

use rand::Rng;
use rust_decimal::Decimal;

use crate::ledger::{Case, DonationType, LifecycleStatus, MAX_AMOUNT, round_amount};
use crate::workflow::dialog::{DialogStep, DonationDialog};
use crate::workflow::error::WorkflowError;
use crate::workflow::service::non_blank;
use crate::workflow::types::{Pledge, PledgeInput};

/// Longest monthly pledge a donor can make at once.
pub const MAX_PLEDGE_MONTHS: i32 = 120;

/// Length of a generated payment code.
pub const PAYMENT_CODE_LEN: usize = 8;

/// Uppercase letters and digits without look-alikes (0/O, 1/I).
const PAYMENT_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Computes the pledged amount.
///
/// Monthly pledges cost `monthly_cost × months` with at least one month.
/// Custom pledges take the donor's amount as is. Both are rounded to cents
/// and must fit a money column.
///
/// # Errors
///
/// Returns `WorkflowError::InvalidPledge` for missing, non-positive or
/// out-of-range inputs.
pub fn pledge_amount(
    case: &Case,
    donation_type: DonationType,
    months: Option<i32>,
    custom_amount: Option<Decimal>,
) -> Result<Decimal, WorkflowError> {
    let amount = match donation_type {
        DonationType::Monthly => {
            let months = months.unwrap_or(1);
            if months < 1 {
                return Err(WorkflowError::InvalidPledge(
                    "months must be at least 1".to_string(),
                ));
            }
            if months > MAX_PLEDGE_MONTHS {
                return Err(WorkflowError::InvalidPledge(format!(
                    "months must be at most {MAX_PLEDGE_MONTHS}"
                )));
            }
            case.monthly_cost
                .checked_mul(Decimal::from(months))
                .ok_or_else(|| WorkflowError::InvalidPledge("amount is too large".to_string()))?
        }
        DonationType::Custom => custom_amount.ok_or_else(|| {
            WorkflowError::InvalidPledge("custom donations need an amount".to_string())
        })?,
    };

    let amount = round_amount(amount);
    if amount <= Decimal::ZERO {
        return Err(WorkflowError::InvalidPledge(
            "amount must be greater than zero".to_string(),
        ));
    }
    if amount > MAX_AMOUNT {
        return Err(WorkflowError::InvalidPledge(format!(
            "amount must be at most {MAX_AMOUNT}"
        )));
    }
    Ok(amount)
}

/// Builds a pending pledge for a published, active case.
///
/// A named donor is walked through the payment dialog, so the stored name
/// and code are the ones the dialog confirmed. A blank name pledges
/// anonymously.
///
/// # Errors
///
/// Returns `WorkflowError::CaseNotAcceptingDonations` for unpublished or
/// inactive cases, or `WorkflowError::InvalidPledge` from [`pledge_amount`].
pub fn prepare_pledge(
    case: &Case,
    input: PledgeInput,
    payment_code: String,
) -> Result<Pledge, WorkflowError> {
    if !case.is_published || case.lifecycle_status != LifecycleStatus::Active {
        return Err(WorkflowError::CaseNotAcceptingDonations(case.id));
    }

    let amount = pledge_amount(case, input.donation_type, input.months, input.custom_amount)?;
    let months_pledged = match input.donation_type {
        DonationType::Monthly => input.months.unwrap_or(1),
        DonationType::Custom => 1,
    };

    let (donor_name, payment_code) = match non_blank(input.donor_name) {
        Some(name) => {
            let (name, code) = confirmed_by_donor(&name, payment_code)?;
            (Some(name), code)
        }
        None => (None, payment_code),
    };

    Ok(Pledge {
        case_id: case.id,
        donor_name,
        donor_email: non_blank(input.donor_email),
        donation_type: input.donation_type,
        months_pledged,
        amount,
        payment_code,
    })
}

fn confirmed_by_donor(
    donor_name: &str,
    payment_code: String,
) -> Result<(String, String), WorkflowError> {
    let mut dialog = DonationDialog::new();
    dialog.submit_donor(donor_name, payment_code)?;
    match dialog.confirm_payment()? {
        DialogStep::Confirmed {
            donor_name,
            payment_code,
        } => Ok((donor_name.clone(), payment_code.clone())),
        step => Err(WorkflowError::InvalidDialogStep {
            step: step.label(),
            action: "store pledge",
        }),
    }
}

/// Generates a payment code from the thread-local RNG.
#[must_use]
pub fn generate_payment_code() -> String {
    generate_payment_code_with(&mut rand::rng())
}

/// Generates a payment code from the given RNG.
pub fn generate_payment_code_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..PAYMENT_CODE_LEN)
        .map(|_| char::from(PAYMENT_CODE_ALPHABET[rng.random_range(0..PAYMENT_CODE_ALPHABET.len())]))
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::ledger::funding::fixtures::case;

    fn input(donation_type: DonationType, months: Option<i32>, custom: Option<Decimal>) -> PledgeInput {
        PledgeInput {
            donation_type,
            months,
            custom_amount: custom,
            donor_name: Some(" Amina ".to_string()),
            donor_email: None,
        }
    }

    #[rstest]
    #[case(DonationType::Monthly, Some(3), None, dec!(1500))]
    #[case(DonationType::Monthly, None, None, dec!(500))]
    #[case(DonationType::Custom, None, Some(dec!(123.456)), dec!(123.46))]
    #[case(DonationType::Custom, Some(12), Some(dec!(75)), dec!(75))]
    #[case(DonationType::Monthly, Some(120), None, dec!(60000))]
    #[case(DonationType::Custom, None, Some(dec!(9999999999.99)), dec!(9999999999.99))]
    fn test_pledge_amount(
        #[case] donation_type: DonationType,
        #[case] months: Option<i32>,
        #[case] custom: Option<Decimal>,
        #[case] expected: Decimal,
    ) {
        let c = case(dec!(500), Some(12));
        assert_eq!(pledge_amount(&c, donation_type, months, custom).unwrap(), expected);
    }

    #[rstest]
    #[case(DonationType::Monthly, Some(0), None)]
    #[case(DonationType::Custom, None, None)]
    #[case(DonationType::Custom, None, Some(dec!(0)))]
    #[case(DonationType::Custom, None, Some(dec!(-5)))]
    #[case(DonationType::Monthly, Some(121), None)]
    #[case(DonationType::Monthly, Some(i32::MAX), None)]
    #[case(DonationType::Custom, None, Some(dec!(10000000000)))]
    #[case(DonationType::Custom, None, Some(dec!(9999999999.996)))]
    #[case(DonationType::Custom, None, Some(Decimal::MAX))]
    fn test_pledge_amount_rejected(
        #[case] donation_type: DonationType,
        #[case] months: Option<i32>,
        #[case] custom: Option<Decimal>,
    ) {
        let c = case(dec!(500), Some(12));
        assert!(matches!(
            pledge_amount(&c, donation_type, months, custom),
            Err(WorkflowError::InvalidPledge(_))
        ));
    }

    #[test]
    fn test_prepare_pledge() {
        let c = case(dec!(250), Some(6));
        let pledge =
            prepare_pledge(&c, input(DonationType::Monthly, Some(2), None), "K7M2Q9XZ".to_string())
                .unwrap();

        assert_eq!(pledge.case_id, c.id);
        assert_eq!(pledge.amount, dec!(500));
        assert_eq!(pledge.months_pledged, 2);
        assert_eq!(pledge.donor_name.as_deref(), Some("Amina"));
        assert_eq!(pledge.payment_code, "K7M2Q9XZ");
    }

    #[test]
    fn test_named_pledge_keeps_dialog_trimmed_name() {
        let c = case(dec!(250), Some(6));
        let mut named = input(DonationType::Custom, None, Some(dec!(40)));
        named.donor_name = Some("  Amina Idris ".to_string());

        let pledge = prepare_pledge(&c, named, "K7M2Q9XZ".to_string()).unwrap();
        assert_eq!(pledge.donor_name.as_deref(), Some("Amina Idris"));
        assert_eq!(pledge.payment_code, "K7M2Q9XZ");
    }

    #[test]
    fn test_blank_name_pledges_anonymously() {
        let c = case(dec!(250), Some(6));
        let mut anonymous = input(DonationType::Custom, None, Some(dec!(40)));
        anonymous.donor_name = Some("   ".to_string());

        let pledge = prepare_pledge(&c, anonymous, "K7M2Q9XZ".to_string()).unwrap();
        assert_eq!(pledge.donor_name, None);
        assert_eq!(pledge.payment_code, "K7M2Q9XZ");
    }

    #[test]
    fn test_monthly_pledge_over_column_range_is_rejected() {
        let c = case(dec!(99999999999.99), Some(1));
        assert_eq!(
            pledge_amount(&c, DonationType::Monthly, Some(1), None),
            Err(WorkflowError::InvalidPledge(
                "amount must be at most 9999999999.99".to_string()
            ))
        );
    }

    #[test]
    fn test_prepare_pledge_rejects_parked_case() {
        let mut c = case(dec!(250), Some(6));
        c.lifecycle_status = LifecycleStatus::Parked;
        let result = prepare_pledge(&c, input(DonationType::Monthly, Some(1), None), String::new());
        assert_eq!(result, Err(WorkflowError::CaseNotAcceptingDonations(c.id)));
    }

    #[test]
    fn test_prepare_pledge_rejects_unpublished_case() {
        let mut c = case(dec!(250), Some(6));
        c.is_published = false;
        let result = prepare_pledge(&c, input(DonationType::Custom, None, Some(dec!(10))), String::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_payment_code_alphabet() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let code = generate_payment_code_with(&mut rng);
            assert_eq!(code.len(), PAYMENT_CODE_LEN);
            assert!(code.bytes().all(|b| PAYMENT_CODE_ALPHABET.contains(&b)));
            assert!(!code.contains(['0', 'O', '1', 'I']));
        }
    }

    #[test]
    fn test_payment_code_default_rng() {
        assert_eq!(generate_payment_code().len(), PAYMENT_CODE_LEN);
    }
}
