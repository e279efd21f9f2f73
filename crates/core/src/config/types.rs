use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::settings::ConversionSettings;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Settings used when the caller does not override them.
    #[serde(default)]
    pub defaults: ConversionSettings,
}

/// Where to look for ffmpeg and ffprobe.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ToolsConfig {
    /// Explicit ffmpeg binary. Checked before `search_dirs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ffmpeg_path: Option<PathBuf>,
    /// Explicit ffprobe binary. Checked before `search_dirs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ffprobe_path: Option<PathBuf>,
    /// Well-known install directories, searched in order.
    #[serde(default = "default_search_dirs")]
    pub search_dirs: Vec<PathBuf>,
    /// Fall back to a `PATH` lookup when nothing else matched.
    #[serde(default = "default_use_path")]
    pub use_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            ffprobe_path: None,
            search_dirs: default_search_dirs(),
            use_path: default_use_path(),
        }
    }
}

impl ToolsConfig {
    /// Config that only looks at the given explicit binaries.
    pub fn with_paths(ffmpeg_path: PathBuf, ffprobe_path: PathBuf) -> Self {
        Self {
            ffmpeg_path: Some(ffmpeg_path),
            ffprobe_path: Some(ffprobe_path),
            search_dirs: Vec::new(),
            use_path: false,
        }
    }
}

fn default_search_dirs() -> Vec<PathBuf> {
    ["/opt/homebrew/bin", "/usr/local/bin", "/usr/bin"]
        .into_iter()
        .map(PathBuf::from)
        .collect()
}

fn default_use_path() -> bool {
    true
}

/// Output naming and log capture.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Appended to the input stem when not overwriting.
    #[serde(default = "default_suffix")]
    pub suffix: String,
    /// Cap on the rolling tool log kept for error reports.
    #[serde(default = "default_log_buffer_bytes")]
    pub log_buffer_bytes: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            suffix: default_suffix(),
            log_buffer_bytes: default_log_buffer_bytes(),
        }
    }
}

fn default_suffix() -> String {
    "_converted".to_string()
}

fn default_log_buffer_bytes() -> usize {
    64 * 1024
}
