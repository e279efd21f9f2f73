//! Types for the plan module.

use serde::Serialize;
use std::fmt;

use crate::format::ContainerFormat;
use crate::probe::ProbedCodecs;

/// What happens to one stream kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum StreamDecision {
    /// Stream is copied bit-for-bit.
    Copy,
    /// Stream is re-encoded.
    Encode {
        /// ffmpeg encoder name.
        encoder: String,
        /// Template arguments that accompany a format-default encoder.
        extra_args: Vec<String>,
    },
    /// Stream is left out of the output.
    Drop,
}

impl StreamDecision {
    pub fn is_copy(&self) -> bool {
        matches!(self, Self::Copy)
    }

    pub fn is_encode(&self) -> bool {
        matches!(self, Self::Encode { .. })
    }

    pub fn is_drop(&self) -> bool {
        matches!(self, Self::Drop)
    }
}

/// Which stream survives untouched in a partial remux.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemuxedStream {
    Video,
    Audio,
}

/// Overall shape of a job. Only used for status text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobClass {
    /// Nothing is re-encoded.
    FullRemux,
    /// One stream is copied while the other is encoded.
    PartialRemux(RemuxedStream),
    /// Everything kept is re-encoded.
    FullEncode,
}

/// What the transcoder is busy doing, for status messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Remux,
    EncodeVideo,
    EncodeAudio,
    EncodeBoth,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Remux => "Remuxing",
            Self::EncodeVideo => "Encoding video",
            Self::EncodeAudio => "Encoding audio",
            Self::EncodeBoth => "Encoding video and audio",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of planning one conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionPlan {
    pub target: ContainerFormat,
    pub source: ProbedCodecs,
    pub video: StreamDecision,
    pub audio: StreamDecision,
    pub include_subtitles: bool,
    pub class: JobClass,
}

impl ConversionPlan {
    /// Current action, derived from which streams are encoded.
    pub fn action(&self) -> Action {
        match (self.video.is_encode(), self.audio.is_encode()) {
            (false, false) => Action::Remux,
            (true, false) => Action::EncodeVideo,
            (false, true) => Action::EncodeAudio,
            (true, true) => Action::EncodeBoth,
        }
    }

    /// One-line description, e.g. `MP4: copy video (h264), encode audio (dts -> aac)`.
    pub fn summary(&self) -> String {
        let describe = |kind: &str, decision: &StreamDecision, source: &str| match decision {
            StreamDecision::Copy => format!("copy {} ({})", kind, source),
            StreamDecision::Encode { encoder, .. } => {
                format!("encode {} ({} -> {})", kind, source, encoder)
            }
            StreamDecision::Drop => format!("drop {}", kind),
        };

        format!(
            "{}: {}, {}",
            self.target,
            describe("video", &self.video, self.source.video.as_str()),
            describe("audio", &self.audio, self.source.audio.as_str()),
        )
    }
}
