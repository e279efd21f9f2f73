//! External tool discovery.
//!
//! Binaries are resolved from an injectable [`ToolsConfig`]: an explicit
//! path wins, then each well-known install directory is checked in order,
//! and finally `PATH` is consulted when allowed.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::ToolsConfig;
use crate::error::{ConvertError, Result};

/// External programs the engine drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// The transcoder.
    Ffmpeg,
    /// The read-only stream inspector.
    Ffprobe,
}

impl Tool {
    /// Executable name without platform suffix.
    pub fn binary_name(&self) -> &'static str {
        match self {
            Self::Ffmpeg => "ffmpeg",
            Self::Ffprobe => "ffprobe",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary_name())
    }
}

/// Availability report for one tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolStatus {
    pub tool: Tool,
    pub path: Option<PathBuf>,
}

impl ToolStatus {
    pub fn available(&self) -> bool {
        self.path.is_some()
    }
}

/// Resolves tool binaries against a [`ToolsConfig`].
#[derive(Debug, Clone)]
pub struct ToolLocator {
    config: ToolsConfig,
}

impl ToolLocator {
    pub fn new(config: ToolsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ToolsConfig {
        &self.config
    }

    /// Returns the path of `tool`, or `ToolNotFound` listing every place tried.
    pub fn locate(&self, tool: Tool) -> Result<PathBuf> {
        let explicit = match tool {
            Tool::Ffmpeg => self.config.ffmpeg_path.as_deref(),
            Tool::Ffprobe => self.config.ffprobe_path.as_deref(),
        };

        let mut searched = Vec::new();

        if let Some(path) = explicit {
            if is_executable_file(path) {
                debug!("Using configured {} at {:?}", tool, path);
                return Ok(path.to_path_buf());
            }
            searched.push(path.to_path_buf());
        }

        let file_name = format!("{}{}", tool.binary_name(), std::env::consts::EXE_SUFFIX);
        for dir in &self.config.search_dirs {
            let candidate = dir.join(&file_name);
            if is_executable_file(&candidate) {
                debug!("Found {} at {:?}", tool, candidate);
                return Ok(candidate);
            }
            searched.push(candidate);
        }

        if self.config.use_path {
            if let Ok(path) = which::which(tool.binary_name()) {
                debug!("Found {} on PATH at {:?}", tool, path);
                return Ok(path);
            }
        }

        Err(ConvertError::ToolNotFound { tool, searched })
    }

    /// Reports availability of every tool without failing.
    pub fn check_all(&self) -> Vec<ToolStatus> {
        [Tool::Ffmpeg, Tool::Ffprobe]
            .into_iter()
            .map(|tool| ToolStatus {
                tool,
                path: self.locate(tool).ok(),
            })
            .collect()
    }
}

impl Default for ToolLocator {
    fn default() -> Self {
        Self::new(ToolsConfig::default())
    }
}

#[cfg(unix)]
fn is_executable_file(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable_file(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn isolated_config(dirs: Vec<PathBuf>) -> ToolsConfig {
        ToolsConfig {
            ffmpeg_path: None,
            ffprobe_path: None,
            search_dirs: dirs,
            use_path: false,
        }
    }

    #[cfg(unix)]
    fn make_executable(path: &Path) {
        use std::os::unix::fs::PermissionsExt;
        std::fs::write(path, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn test_not_found_lists_searched_locations() {
        let dir = TempDir::new().unwrap();
        let locator = ToolLocator::new(isolated_config(vec![dir.path().to_path_buf()]));

        match locator.locate(Tool::Ffmpeg) {
            Err(ConvertError::ToolNotFound { tool, searched }) => {
                assert_eq!(tool, Tool::Ffmpeg);
                assert_eq!(searched.len(), 1);
                assert!(searched[0].starts_with(dir.path()));
            }
            other => panic!("expected ToolNotFound, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_search_dirs_in_order() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        make_executable(&second.path().join("ffprobe"));

        let locator = ToolLocator::new(isolated_config(vec![
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ]));

        let path = locator.locate(Tool::Ffprobe).unwrap();
        assert_eq!(path, second.path().join("ffprobe"));
    }

    #[cfg(unix)]
    #[test]
    fn test_explicit_path_wins() {
        let dir = TempDir::new().unwrap();
        let custom = dir.path().join("my-ffmpeg");
        make_executable(&custom);
        make_executable(&dir.path().join("ffmpeg"));

        let mut config = isolated_config(vec![dir.path().to_path_buf()]);
        config.ffmpeg_path = Some(custom.clone());

        let locator = ToolLocator::new(config);
        assert_eq!(locator.locate(Tool::Ffmpeg).unwrap(), custom);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_executable_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("ffmpeg"), "not a program").unwrap();

        let locator = ToolLocator::new(isolated_config(vec![dir.path().to_path_buf()]));
        assert!(locator.locate(Tool::Ffmpeg).is_err());
    }

    #[test]
    fn test_check_all_reports_both_tools() {
        let locator = ToolLocator::new(isolated_config(vec![]));
        let statuses = locator.check_all();
        assert_eq!(statuses.len(), 2);
        assert!(statuses.iter().all(|s| !s.available()));
    }
}
