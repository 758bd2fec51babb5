//! Shared types, errors, and configuration for the Kafala ledger.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe record references
//! - The explicit auth context handed to every mutation
//! - Bearer token verification for identity provider tokens
//! - Request-level error types
//! - Configuration management

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::{AuthContext, Claims, Role};
pub use config::AppConfig;
pub use error::AppError;
pub use jwt::{JwtError, JwtVerifier};
