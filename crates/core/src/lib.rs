//! Video container conversion that remuxes when it can and re-encodes only
//! the streams the target container cannot carry.
//!
//! The flow for one file is probe, plan, build ffmpeg arguments, run and
//! supervise. [`JobOrchestrator`] drives it and publishes [`JobSnapshot`]s.

pub mod args;
pub mod config;
pub mod error;
pub mod format;
pub mod job;
pub mod plan;
pub mod probe;
pub mod progress;
pub mod settings;
pub mod testing;
pub mod tools;

pub use args::build_args;
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config, ConfigError,
    OutputConfig, ToolsConfig,
};
pub use error::{ConvertError, Result};
pub use format::{accepted_codecs, can_copy, CodecId, ContainerFormat, StreamKind};
pub use job::{
    resolve_output_path, ConversionOutcome, ConversionRequest, JobHandle, JobOrchestrator,
    JobSnapshot, JobState, OutputTarget,
};
pub use plan::{plan, Action, ConversionPlan, JobClass, RemuxedStream, StreamDecision};
pub use probe::{FfprobeProber, ProbedCodecs, Prober};
pub use settings::{CodecChoice, ConversionSettings, Preset};
pub use tools::{Tool, ToolLocator, ToolStatus};
