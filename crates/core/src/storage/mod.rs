//! Report image storage using Apache OpenDAL.
//!
//! Checkpoint handovers carry a verification image. Images are written to
//! an S3-compatible bucket (or a local directory in development) and
//! referenced by their public URL.

mod config;
mod error;
mod service;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use service::{ReportImageStore, StoredImage};
