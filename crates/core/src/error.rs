//! Error types for conversion jobs.

use std::path::PathBuf;
use thiserror::Error;

use crate::tools::Tool;

/// Errors that can end a conversion job.
///
/// Every variant is terminal for the job that produced it. Partial output is
/// removed before one of these is handed back to the caller.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Neither a configured path nor a well-known location holds the tool.
    #[error("{tool} not found (searched {searched:?})")]
    ToolNotFound { tool: Tool, searched: Vec<PathBuf> },

    /// No usable source file was supplied.
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Settings failed validation before anything was spawned.
    #[error("Invalid settings: {reason}")]
    InvalidSettings { reason: String },

    /// The inspection tool failed or its output did not describe a video.
    #[error("Failed to probe source: {reason}")]
    ProbeFailed { reason: String },

    /// The transcode tool could not be spawned or exited non-zero.
    #[error("Conversion failed{}: {detail}", exit_code.map(|c| format!(" (exit code {c})")).unwrap_or_default())]
    ConversionFailed {
        exit_code: Option<i32>,
        detail: String,
    },

    /// Another job is still active on this orchestrator.
    #[error("A conversion is already running")]
    Busy,

    /// The job was cancelled before it finished.
    #[error("Conversion cancelled")]
    Cancelled,

    /// I/O error outside the subprocess itself.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    /// Creates a new invalid input error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Creates a new invalid settings error.
    pub fn invalid_settings(reason: impl Into<String>) -> Self {
        Self::InvalidSettings {
            reason: reason.into(),
        }
    }

    /// Creates a new probe failed error.
    pub fn probe_failed(reason: impl Into<String>) -> Self {
        Self::ProbeFailed {
            reason: reason.into(),
        }
    }

    /// Creates a new conversion failed error.
    pub fn conversion_failed(exit_code: Option<i32>, detail: impl Into<String>) -> Self {
        Self::ConversionFailed {
            exit_code,
            detail: detail.into(),
        }
    }

    /// Exit code of the transcode tool, when the failure carries one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::ConversionFailed { exit_code, .. } => *exit_code,
            _ => None,
        }
    }
}

/// Result alias used across the crate.
pub type Result<T, E = ConvertError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_failed_message_includes_code() {
        let err = ConvertError::conversion_failed(Some(1), "Invalid data found");
        assert_eq!(
            err.to_string(),
            "Conversion failed (exit code 1): Invalid data found"
        );
        assert_eq!(err.exit_code(), Some(1));
    }

    #[test]
    fn test_conversion_failed_without_code() {
        let err = ConvertError::conversion_failed(None, "spawn failed");
        assert_eq!(err.to_string(), "Conversion failed: spawn failed");
        assert_eq!(err.exit_code(), None);
    }

    #[test]
    fn test_tool_not_found_message() {
        let err = ConvertError::ToolNotFound {
            tool: Tool::Ffprobe,
            searched: vec![PathBuf::from("/usr/bin")],
        };
        assert!(err.to_string().starts_with("ffprobe not found"));
    }
}
