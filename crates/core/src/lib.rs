//! Core business logic for Kafala.
//!
//! This crate contains pure business logic with no web or database
//! dependencies. All domain types, validation rules and aggregations live
//! here.
//!
//! # Modules
//!
//! - `ledger` - Cases, donations, handovers, funding and allocation rules
//! - `reports` - Monthly rollups and donation views
//! - `workflow` - Donation and followup lifecycles, pledges, payment dialog
//! - `storage` - Report image storage

pub mod ledger;
pub mod reports;
pub mod storage;
pub mod workflow;
