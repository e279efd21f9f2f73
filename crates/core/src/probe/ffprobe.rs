//! FFprobe-based prober implementation.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use super::traits::Prober;
use super::types::{ProbedCodecs, ProbedStream};
use crate::error::{ConvertError, Result};
use crate::format::{CodecId, StreamKind};
use crate::tools::{Tool, ToolLocator};

/// Prober that shells out to `ffprobe` with JSON output.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    tools: ToolLocator,
}

impl FfprobeProber {
    /// Creates a new prober resolving ffprobe through `tools`.
    pub fn new(tools: ToolLocator) -> Self {
        Self { tools }
    }

    /// Arguments for a single combined stream listing.
    fn build_args(path: &Path) -> Vec<String> {
        vec![
            "-v".to_string(),
            "error".to_string(),
            "-show_entries".to_string(),
            "stream=codec_type,codec_name:stream_disposition=attached_pic".to_string(),
            "-of".to_string(),
            "json".to_string(),
            path.to_string_lossy().to_string(),
        ]
    }

    /// Parses ffprobe JSON into streams, in the order ffprobe listed them.
    ///
    /// Streams of other kinds (subtitle, data) and embedded cover art are
    /// skipped.
    fn parse_streams(output: &str) -> Result<Vec<ProbedStream>> {
        #[derive(Deserialize)]
        struct ProbeOutput {
            #[serde(default)]
            streams: Vec<ProbeStream>,
        }

        #[derive(Deserialize)]
        struct ProbeStream {
            codec_type: Option<String>,
            codec_name: Option<String>,
            #[serde(default)]
            disposition: Option<ProbeDisposition>,
        }

        #[derive(Deserialize)]
        struct ProbeDisposition {
            #[serde(default)]
            attached_pic: u8,
        }

        let probe: ProbeOutput = serde_json::from_str(output)
            .map_err(|e| ConvertError::probe_failed(format!("Failed to parse ffprobe output: {}", e)))?;

        let streams = probe
            .streams
            .into_iter()
            .filter(|s| s.disposition.as_ref().map_or(true, |d| d.attached_pic == 0))
            .filter_map(|s| {
                let kind = match s.codec_type.as_deref()? {
                    "video" => StreamKind::Video,
                    "audio" => StreamKind::Audio,
                    _ => return None,
                };
                Some(ProbedStream {
                    kind,
                    codec: CodecId::new(s.codec_name.as_deref().unwrap_or_default()),
                })
            })
            .collect();

        Ok(streams)
    }

    /// Picks the first video and first audio codec.
    fn primary_codecs(streams: &[ProbedStream]) -> Result<ProbedCodecs> {
        let first = |kind| {
            streams
                .iter()
                .find(|s| s.kind == kind && !s.codec.is_empty())
                .map(|s| s.codec.clone())
        };

        let video = first(StreamKind::Video)
            .ok_or_else(|| ConvertError::probe_failed("No video stream found"))?;
        let audio = first(StreamKind::Audio).unwrap_or_else(CodecId::none);

        Ok(ProbedCodecs { video, audio })
    }

    fn parse_probe_output(output: &str) -> Result<ProbedCodecs> {
        let streams = Self::parse_streams(output)?;
        Self::primary_codecs(&streams)
    }
}

#[async_trait]
impl Prober for FfprobeProber {
    fn name(&self) -> &str {
        "ffprobe"
    }

    async fn probe(&self, path: &Path) -> Result<ProbedCodecs> {
        let ffprobe = self.tools.locate(Tool::Ffprobe)?;

        let output = Command::new(&ffprobe)
            .args(Self::build_args(path))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ConvertError::ToolNotFound {
                        tool: Tool::Ffprobe,
                        searched: vec![ffprobe.clone()],
                    }
                } else {
                    ConvertError::probe_failed(format!("Failed to run ffprobe: {}", e))
                }
            })?;

        if !output.status.success() {
            return Err(ConvertError::probe_failed(format!(
                "ffprobe exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|_| ConvertError::probe_failed("ffprobe output is not valid UTF-8"))?;

        let codecs = Self::parse_probe_output(&stdout)?;
        debug!(
            "Probed {:?}: video={} audio={}",
            path,
            codecs.video,
            if codecs.has_audio() { codecs.audio.as_str() } else { "<none>" }
        );
        Ok(codecs)
    }
}
