//! Types for the job module.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

use crate::format::ContainerFormat;
use crate::plan::{ConversionPlan, JobClass};
use crate::settings::ConversionSettings;

/// Lifecycle state of a conversion job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    #[default]
    Idle,
    Probing,
    Planning,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobState {
    /// Whether this is one of the three outcomes.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Probing => "probing",
            Self::Planning => "planning",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to convert one file.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    /// Source file. `None` is rejected with `InvalidInput`.
    pub input: Option<PathBuf>,
    pub target: ContainerFormat,
    pub settings: ConversionSettings,
}

impl ConversionRequest {
    /// Request with default settings.
    pub fn new(input: impl Into<PathBuf>, target: ContainerFormat) -> Self {
        Self {
            input: Some(input.into()),
            target,
            settings: ConversionSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ConversionSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// Point-in-time view of the current job, published to observers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JobSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<Uuid>,
    pub state: JobState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    /// Fraction complete in `[0, 1]`.
    pub progress: f64,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<JobClass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of a successful conversion.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionOutcome {
    pub job_id: Uuid,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub plan: ConversionPlan,
    pub elapsed_ms: u64,
}
