//! Donor payment dialog.
//!
//! A donor first enters their name, then sees the payment instructions with
//! their payment code, then confirms they have paid. The admin confirms the
//! donation separately once the money arrives.

use serde::Serialize;

use crate::workflow::error::WorkflowError;
use crate::workflow::service::non_blank;

/// Step of the payment dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum DialogStep {
    /// Asking for the donor's name.
    CollectingDonor,
    /// Showing how to pay.
    ShowingInstructions {
        /// Donor display name.
        donor_name: String,
        /// Code to quote with the payment.
        payment_code: String,
    },
    /// Donor says they paid.
    Confirmed {
        /// Donor display name.
        donor_name: String,
        /// Code quoted with the payment.
        payment_code: String,
    },
}

impl DialogStep {
    pub(crate) const fn label(&self) -> &'static str {
        match self {
            Self::CollectingDonor => "collecting donor details",
            Self::ShowingInstructions { .. } => "showing payment instructions",
            Self::Confirmed { .. } => "confirmed",
        }
    }
}

/// Payment dialog state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationDialog {
    step: DialogStep,
}

impl Default for DonationDialog {
    fn default() -> Self {
        Self::new()
    }
}

impl DonationDialog {
    /// Opens the dialog at the donor step.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            step: DialogStep::CollectingDonor,
        }
    }

    /// Current step.
    #[must_use]
    pub const fn step(&self) -> &DialogStep {
        &self.step
    }

    /// Submits the donor name and moves on to the instructions.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::DonorNameRequired` for a blank name, or
    /// `WorkflowError::InvalidDialogStep` outside the donor step.
    pub fn submit_donor(
        &mut self,
        donor_name: &str,
        payment_code: impl Into<String>,
    ) -> Result<&DialogStep, WorkflowError> {
        if self.step != DialogStep::CollectingDonor {
            return Err(self.invalid("submit donor details"));
        }
        let donor_name =
            non_blank(Some(donor_name.to_string())).ok_or(WorkflowError::DonorNameRequired)?;

        self.step = DialogStep::ShowingInstructions {
            donor_name,
            payment_code: payment_code.into(),
        };
        Ok(&self.step)
    }

    /// Donor confirms the payment was made.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::InvalidDialogStep` unless instructions are
    /// showing.
    pub fn confirm_payment(&mut self) -> Result<&DialogStep, WorkflowError> {
        match &self.step {
            DialogStep::ShowingInstructions {
                donor_name,
                payment_code,
            } => {
                self.step = DialogStep::Confirmed {
                    donor_name: donor_name.clone(),
                    payment_code: payment_code.clone(),
                };
                Ok(&self.step)
            }
            _ => Err(self.invalid("confirm payment")),
        }
    }

    /// Goes back from the instructions to the donor step.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::InvalidDialogStep` unless instructions are
    /// showing.
    pub fn back(&mut self) -> Result<&DialogStep, WorkflowError> {
        if !matches!(self.step, DialogStep::ShowingInstructions { .. }) {
            return Err(self.invalid("go back"));
        }
        self.step = DialogStep::CollectingDonor;
        Ok(&self.step)
    }

    /// Closes the dialog, discarding everything entered.
    pub fn reset(&mut self) {
        self.step = DialogStep::CollectingDonor;
    }

    const fn invalid(&self, action: &'static str) -> WorkflowError {
        WorkflowError::InvalidDialogStep {
            step: self.step.label(),
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut dialog = DonationDialog::new();
        dialog.submit_donor("  Yusuf ", "K7M2Q9XZ").unwrap();
        assert_eq!(
            dialog.step(),
            &DialogStep::ShowingInstructions {
                donor_name: "Yusuf".to_string(),
                payment_code: "K7M2Q9XZ".to_string(),
            }
        );

        dialog.confirm_payment().unwrap();
        assert!(matches!(dialog.step(), DialogStep::Confirmed { donor_name, .. } if donor_name == "Yusuf"));
    }

    #[test]
    fn test_blank_name_stays_on_donor_step() {
        let mut dialog = DonationDialog::new();
        assert_eq!(
            dialog.submit_donor("   ", "K7M2Q9XZ"),
            Err(WorkflowError::DonorNameRequired)
        );
        assert_eq!(dialog.step(), &DialogStep::CollectingDonor);
    }

    #[test]
    fn test_cannot_confirm_before_instructions() {
        let mut dialog = DonationDialog::new();
        let err = dialog.confirm_payment().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_DIALOG_STEP");
    }

    #[test]
    fn test_back_and_reset() {
        let mut dialog = DonationDialog::new();
        dialog.submit_donor("Yusuf", "K7M2Q9XZ").unwrap();
        dialog.back().unwrap();
        assert_eq!(dialog.step(), &DialogStep::CollectingDonor);

        dialog.submit_donor("Yusuf", "K7M2Q9XZ").unwrap();
        dialog.confirm_payment().unwrap();
        assert!(dialog.back().is_err());
        assert!(dialog.submit_donor("Other", "X").is_err());

        dialog.reset();
        assert_eq!(dialog.step(), &DialogStep::CollectingDonor);
    }
}
