//! Output path resolution.

use std::path::{Path, PathBuf};

use crate::error::{ConvertError, Result};
use crate::format::ContainerFormat;
use crate::settings::ConversionSettings;

/// Where a job writes and where the result ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    /// Path reported to the caller once the job succeeds.
    pub final_path: PathBuf,
    /// Path handed to the transcoder. Differs from `final_path` only when
    /// overwriting, where the tool must not write over its own input.
    pub write_path: PathBuf,
    /// Source file to remove after success, set when overwriting changes the
    /// extension.
    pub replaces: Option<PathBuf>,
}

impl OutputTarget {
    pub fn is_staged(&self) -> bool {
        self.write_path != self.final_path
    }
}

/// Resolves the output location for converting `input` to `target`.
///
/// Without overwrite the result is `<stem><suffix>.<ext>` next to the input
/// (or in `settings.output_dir`), with `_1`, `_2`, ... appended until the
/// name is free. With overwrite the result takes the input's place and the
/// tool writes to a hidden staging file beside it; when the extension changes
/// and `<stem>.<ext>` is already taken, the counter applies there too.
pub fn resolve_output_path(
    input: &Path,
    target: ContainerFormat,
    settings: &ConversionSettings,
    suffix: &str,
) -> Result<OutputTarget> {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ConvertError::invalid_input(format!("No file name in {:?}", input)))?;
    let ext = target.extension();
    let input_dir = input
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    if settings.overwrite_original {
        let write_path = input_dir.join(format!(".{}.partial.{}", stem, ext));
        let same_name = input.with_extension(ext);
        if same_name == input {
            return Ok(OutputTarget {
                final_path: same_name,
                write_path,
                replaces: None,
            });
        }
        // Overwrite covers the source only, never a sibling sharing its stem.
        let final_path = unique_path(&input_dir, &stem, ext);
        let replaces = Some(input.to_path_buf());
        return Ok(OutputTarget {
            final_path,
            write_path,
            replaces,
        });
    }

    let dir = settings.output_dir.clone().unwrap_or(input_dir);
    let final_path = unique_path(&dir, &format!("{}{}", stem, suffix), ext);

    Ok(OutputTarget {
        write_path: final_path.clone(),
        final_path,
        replaces: None,
    })
}

fn unique_path(dir: &Path, base: &str, ext: &str) -> PathBuf {
    let candidate = dir.join(format!("{}.{}", base, ext));
    if !candidate.exists() {
        return candidate;
    }

    (1u32..)
        .map(|n| dir.join(format!("{}_{}.{}", base, n, ext)))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SUFFIX: &str = "_converted";

    #[test]
    fn test_alongside_input() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("clip.mkv");

        let target =
            resolve_output_path(&input, ContainerFormat::Mp4, &ConversionSettings::default(), SUFFIX)
                .unwrap();
        assert_eq!(target.final_path, dir.path().join("clip_converted.mp4"));
        assert_eq!(target.write_path, target.final_path);
        assert!(!target.is_staged());
        assert!(target.replaces.is_none());
    }

    #[test]
    fn test_existing_output_gets_counter() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("clip.mp4");
        std::fs::write(dir.path().join("clip_converted.mp4"), b"old").unwrap();

        let target =
            resolve_output_path(&input, ContainerFormat::Mp4, &ConversionSettings::default(), SUFFIX)
                .unwrap();
        assert_eq!(target.final_path, dir.path().join("clip_converted_1.mp4"));
    }

    #[test]
    fn test_counter_keeps_incrementing() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("clip.mp4");
        for name in ["clip_converted.mov", "clip_converted_1.mov", "clip_converted_2.mov"] {
            std::fs::write(dir.path().join(name), b"old").unwrap();
        }

        let target =
            resolve_output_path(&input, ContainerFormat::Mov, &ConversionSettings::default(), SUFFIX)
                .unwrap();
        assert_eq!(target.final_path, dir.path().join("clip_converted_3.mov"));
    }

    #[test]
    fn test_custom_output_dir() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let input = src.path().join("holiday.avi");
        let settings = ConversionSettings {
            output_dir: Some(out.path().to_path_buf()),
            ..Default::default()
        };

        let target = resolve_output_path(&input, ContainerFormat::Webm, &settings, SUFFIX).unwrap();
        assert_eq!(target.final_path, out.path().join("holiday_converted.webm"));
    }

    #[test]
    fn test_overwrite_same_extension_stages() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("clip.mp4");
        let settings = ConversionSettings {
            overwrite_original: true,
            ..Default::default()
        };

        let target = resolve_output_path(&input, ContainerFormat::Mp4, &settings, SUFFIX).unwrap();
        assert_eq!(target.final_path, input);
        assert_eq!(target.write_path, dir.path().join(".clip.partial.mp4"));
        assert!(target.is_staged());
        assert!(target.replaces.is_none());
    }

    #[test]
    fn test_overwrite_new_extension_replaces_source() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("clip.avi");
        let settings = ConversionSettings {
            overwrite_original: true,
            output_dir: Some(PathBuf::from("/ignored")),
            ..Default::default()
        };

        let target = resolve_output_path(&input, ContainerFormat::Mkv, &settings, SUFFIX).unwrap();
        assert_eq!(target.final_path, dir.path().join("clip.mkv"));
        assert_eq!(target.replaces, Some(input));
    }

    #[test]
    fn test_overwrite_keeps_unrelated_sibling() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("clip.avi");
        std::fs::write(dir.path().join("clip.mkv"), b"someone else's file").unwrap();
        let settings = ConversionSettings {
            overwrite_original: true,
            ..Default::default()
        };

        let target = resolve_output_path(&input, ContainerFormat::Mkv, &settings, SUFFIX).unwrap();
        assert_eq!(target.final_path, dir.path().join("clip_1.mkv"));
        assert_eq!(target.write_path, dir.path().join(".clip.partial.mkv"));
        assert_eq!(target.replaces, Some(input));
    }

    #[test]
    fn test_input_without_name_is_invalid() {
        let result = resolve_output_path(
            Path::new("/"),
            ContainerFormat::Mp4,
            &ConversionSettings::default(),
            SUFFIX,
        );
        assert!(matches!(result, Err(ConvertError::InvalidInput { .. })));
    }
}
