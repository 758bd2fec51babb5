//! Ledger reports.
//!
//! Pure read-side aggregations over cases, donations and handovers:
//! - Monthly rollup of case lifecycle events and spending
//! - Confirmed donations by confirmation month
//! - Legacy redemptions per case
//! - Handover calendar of one case

pub mod error;
pub mod service;
pub mod types;


pub use error::ReportError;
pub use service::ReportService;
pub use types::*;
