//! Types for the compatibility model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stream kinds the planner makes decisions for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    Video,
    Audio,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => f.write_str("video"),
            Self::Audio => f.write_str("audio"),
        }
    }
}

/// A lower-cased codec name such as `h264` or `aac`.
///
/// Only case is normalized: `avc1` and `h264` stay distinct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CodecId(String);

impl CodecId {
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_lowercase())
    }

    /// The empty identifier, used when a stream is absent.
    pub fn none() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for CodecId {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<&str> for CodecId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<CodecId> for String {
    fn from(value: CodecId) -> Self {
        value.0
    }
}

impl fmt::Display for CodecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Default encoder for a stream plus the arguments that go with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeTemplate {
    /// ffmpeg encoder name, e.g. `libx264`.
    pub encoder: &'static str,
    /// Extra arguments emitted right after the codec selection.
    pub extra_args: &'static [&'static str],
}

/// Output container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    /// MPEG-4 Part 14 (.mp4)
    Mp4,
    /// QuickTime (.mov)
    Mov,
    /// Matroska (.mkv)
    Mkv,
    /// WebM (.webm)
    Webm,
    /// Audio Video Interleave (.avi)
    Avi,
}

impl ContainerFormat {
    /// Every supported container, in display order.
    pub const ALL: [ContainerFormat; 5] = [
        ContainerFormat::Mp4,
        ContainerFormat::Mov,
        ContainerFormat::Mkv,
        ContainerFormat::Webm,
        ContainerFormat::Avi,
    ];

    /// Returns the file extension for this container.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Mov => "mov",
            Self::Mkv => "mkv",
            Self::Webm => "webm",
            Self::Avi => "avi",
        }
    }

    /// Human-facing name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Mp4 => "MP4",
            Self::Mov => "MOV",
            Self::Mkv => "MKV",
            Self::Webm => "WEBM",
            Self::Avi => "AVI",
        }
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ContainerFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_lowercase().as_str() {
            "mp4" | "m4v" => Ok(Self::Mp4),
            "mov" | "quicktime" => Ok(Self::Mov),
            "mkv" | "matroska" => Ok(Self::Mkv),
            "webm" => Ok(Self::Webm),
            "avi" => Ok(Self::Avi),
            _ => Err(format!("Unknown container format: {}", s)),
        }
    }
}
