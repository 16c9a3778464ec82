//! Error types for guidegen.
//!
//! Library crates use [`GuideError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all guidegen operations.
#[derive(Debug, thiserror::Error)]
pub enum GuideError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error during taxonomy or asset fetches.
    #[error("network error: {0}")]
    Network(String),

    /// Input file or response body could not be parsed.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad input values, oversize payloads, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Guide id does not match the slug pattern.
    #[error("invalid guide id '{0}': use lowercase letters, numbers and inner hyphens")]
    InvalidGuideId(String),

    /// Product label not present in the resolved category map.
    #[error("unknown product category '{0}'")]
    UnknownCategory(String),

    /// Archive construction failed.
    #[error("archive error: {0}")]
    Archive(String),

    /// A feature request hit the constraint table; carries the rendered report.
    #[error("{report}")]
    ConstraintViolation { report: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, GuideError>;

impl GuideError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = GuideError::config("missing connections file");
        assert_eq!(err.to_string(), "config error: missing connections file");

        let err = GuideError::InvalidGuideId("Bad_ID".into());
        assert!(err.to_string().contains("Bad_ID"));
    }

    #[test]
    fn constraint_violation_displays_report_verbatim() {
        let err = GuideError::ConstraintViolation {
            report: "TEMPLATE GENERATION FAILED".into(),
        };
        assert_eq!(err.to_string(), "TEMPLATE GENERATION FAILED");
    }
}
