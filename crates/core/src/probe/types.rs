//! Types for the probe module.

use serde::Serialize;

use crate::format::{CodecId, StreamKind};

/// One stream as listed by the inspection tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbedStream {
    pub kind: StreamKind,
    pub codec: CodecId,
}

/// Primary codecs of a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbedCodecs {
    /// First video codec. Always present.
    pub video: CodecId,
    /// First audio codec, empty when the source has no audio.
    pub audio: CodecId,
}

impl ProbedCodecs {
    pub fn new(video: impl Into<CodecId>, audio: impl Into<CodecId>) -> Self {
        Self {
            video: video.into(),
            audio: audio.into(),
        }
    }

    pub fn has_audio(&self) -> bool {
        !self.audio.is_empty()
    }
}
