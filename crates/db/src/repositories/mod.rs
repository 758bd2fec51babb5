//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

mod convert;
pub mod ledger;
pub mod memory;
pub mod sea;

pub use ledger::{
    CasePatch, HandoverPatch, LedgerRepository, NewCase, NewFollowup, NewHandover, RepoResult,
    RepositoryError,
};
pub use memory::InMemoryLedgerRepository;
pub use sea::SeaLedgerRepository;
