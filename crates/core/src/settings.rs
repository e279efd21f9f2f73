//! User-facing conversion settings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{ConvertError, Result};

/// Highest accepted constant rate factor (x264/x265 scale).
pub const MAX_CRF: u8 = 51;

/// Default constant rate factor.
pub const DEFAULT_CRF: u8 = 23;

/// Codec selection for one stream.
///
/// Serialized as a plain string: `"auto"` or the encoder name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CodecChoice {
    /// Copy when the container allows it, otherwise use the format default.
    #[default]
    Auto,
    /// Always encode with this ffmpeg encoder (e.g. `libx265`).
    Named(String),
}

impl CodecChoice {
    pub fn named(encoder: impl Into<String>) -> Self {
        Self::from(encoder.into())
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }
}

impl From<String> for CodecChoice {
    fn from(value: String) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
            Self::Auto
        } else {
            Self::Named(trimmed.to_string())
        }
    }
}

impl From<CodecChoice> for String {
    fn from(value: CodecChoice) -> Self {
        match value {
            CodecChoice::Auto => "auto".to_string(),
            CodecChoice::Named(name) => name,
        }
    }
}

impl FromStr for CodecChoice {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

impl fmt::Display for CodecChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// Encoder speed/effort preset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Ultrafast,
    Superfast,
    Veryfast,
    Faster,
    Fast,
    #[default]
    Medium,
    Slow,
    Slower,
    Veryslow,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ultrafast => "ultrafast",
            Self::Superfast => "superfast",
            Self::Veryfast => "veryfast",
            Self::Faster => "faster",
            Self::Fast => "fast",
            Self::Medium => "medium",
            Self::Slow => "slow",
            Self::Slower => "slower",
            Self::Veryslow => "veryslow",
        }
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ultrafast" => Ok(Self::Ultrafast),
            "superfast" => Ok(Self::Superfast),
            "veryfast" => Ok(Self::Veryfast),
            "faster" => Ok(Self::Faster),
            "fast" => Ok(Self::Fast),
            "medium" => Ok(Self::Medium),
            "slow" => Ok(Self::Slow),
            "slower" => Ok(Self::Slower),
            "veryslow" => Ok(Self::Veryslow),
            _ => Err(format!("Unknown preset: {}", s)),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings for a single conversion. Immutable once a job starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionSettings {
    /// Replace the source file instead of writing a sibling.
    pub overwrite_original: bool,
    /// Directory for the output; `None` writes next to the input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    pub include_video: bool,
    pub include_audio: bool,
    pub include_subtitles: bool,
    pub video_codec: CodecChoice,
    pub audio_codec: CodecChoice,
    pub preset: Preset,
    /// Constant rate factor, `0..=MAX_CRF`. Lower is better quality.
    pub crf: u8,
    /// Video bitrate override in kbps. Only applied when video is encoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_bitrate_kbps: Option<u32>,
    /// Accepted for compatibility; no second pass is run.
    pub two_pass: bool,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            overwrite_original: false,
            output_dir: None,
            include_video: true,
            include_audio: true,
            include_subtitles: true,
            video_codec: CodecChoice::Auto,
            audio_codec: CodecChoice::Auto,
            preset: Preset::default(),
            crf: DEFAULT_CRF,
            video_bitrate_kbps: None,
            two_pass: false,
        }
    }
}

impl ConversionSettings {
    /// Checks value ranges and stream selection.
    pub fn validate(&self) -> Result<()> {
        if self.crf > MAX_CRF {
            return Err(ConvertError::invalid_settings(format!(
                "crf must be between 0 and {}, got {}",
                MAX_CRF, self.crf
            )));
        }

        if self.video_bitrate_kbps == Some(0) {
            return Err(ConvertError::invalid_settings(
                "video bitrate must be greater than zero",
            ));
        }

        if !self.include_video && !self.include_audio {
            return Err(ConvertError::invalid_settings(
                "at least one of video or audio must be included",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = ConversionSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.crf, 23);
        assert_eq!(settings.preset, Preset::Medium);
        assert!(settings.video_codec.is_auto());
    }

    #[test]
    fn test_crf_out_of_range() {
        let settings = ConversionSettings {
            crf: 52,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConvertError::InvalidSettings { .. })
        ));
    }

    #[test]
    fn test_zero_bitrate_rejected() {
        let settings = ConversionSettings {
            video_bitrate_kbps: Some(0),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_nothing_included_rejected() {
        let settings = ConversionSettings {
            include_video: false,
            include_audio: false,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_codec_choice_parsing() {
        assert_eq!(CodecChoice::named("AUTO"), CodecChoice::Auto);
        assert_eq!(CodecChoice::named(""), CodecChoice::Auto);
        assert_eq!(
            CodecChoice::named(" libx265 "),
            CodecChoice::Named("libx265".to_string())
        );
    }

    #[test]
    fn test_settings_from_toml() {
        let toml = r#"
            preset = "slow"
            crf = 18
            video_codec = "libx265"
            include_subtitles = false
        "#;
        let settings: ConversionSettings = toml::from_str(toml).unwrap();
        assert_eq!(settings.preset, Preset::Slow);
        assert_eq!(settings.crf, 18);
        assert_eq!(settings.video_codec, CodecChoice::Named("libx265".into()));
        assert_eq!(settings.audio_codec, CodecChoice::Auto);
        assert!(!settings.include_subtitles);
        assert!(settings.include_video);
    }

    #[test]
    fn test_preset_from_str() {
        assert_eq!("VeryFast".parse::<Preset>().unwrap(), Preset::Veryfast);
        assert!("warp".parse::<Preset>().is_err());
    }
}
