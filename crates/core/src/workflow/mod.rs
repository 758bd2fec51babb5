//! Donation and followup workflows.
//!
//! # Modules
//!
//! - `types` - Followup record, statuses and transition actions
//! - `error` - Workflow-specific error types
//! - `service` - Donation and followup state transitions
//! - `pledge` - Pledge amounts and payment codes
//! - `case` - Admin case edits
//! - `dialog` - Donor payment dialog

pub mod case;
pub mod dialog;
pub mod error;
pub mod pledge;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use case::{CaseChanges, CaseDraft, CaseInput};
pub use dialog::{DialogStep, DonationDialog};
pub use error::WorkflowError;
pub use pledge::{
    MAX_PLEDGE_MONTHS, PAYMENT_CODE_LEN, generate_payment_code, generate_payment_code_with,
    pledge_amount, prepare_pledge,
};
pub use service::WorkflowService;
pub use types::{
    AnswerType, DonationAction, Followup, FollowupResolution, FollowupStatus, Pledge, PledgeInput,
};
