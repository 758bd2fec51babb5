//! Report error types.

use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    /// A window must cover at least one month.
    #[error("Report window must cover at least one month")]
    EmptyWindow,

    /// Requested window is longer than allowed.
    #[error("Report window of {months} months exceeds the maximum of {max}")]
    WindowTooLarge {
        /// Requested months.
        months: u32,
        /// Allowed maximum.
        max: u32,
    },
}

impl ReportError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyWindow => "EMPTY_WINDOW",
            Self::WindowTooLarge { .. } => "WINDOW_TOO_LARGE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        400
    }
}
