use clap::Parser;
use std::path::PathBuf;

use vidshift_core::{CodecChoice, ContainerFormat, ConversionSettings, Preset};

#[derive(Parser, Debug)]
#[command(name = "vidshift")]
#[command(
    author,
    version,
    about = "Convert video containers, re-encoding only what the target cannot hold"
)]
pub struct Cli {
    /// Input video file
    #[arg(required_unless_present = "check_tools")]
    pub input: Option<PathBuf>,

    /// Target container: mp4, mov, mkv, webm or avi
    #[arg(short, long, required_unless_present = "check_tools")]
    pub format: Option<ContainerFormat>,

    /// Replace the input file instead of writing next to it
    #[arg(long)]
    pub overwrite: bool,

    /// Directory for the converted file (ignored with --overwrite)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Leave out the video stream
    #[arg(long)]
    pub no_video: bool,

    /// Leave out the audio stream
    #[arg(long)]
    pub no_audio: bool,

    /// Leave out subtitle streams
    #[arg(long)]
    pub no_subtitles: bool,

    /// Video encoder to force, or "auto"
    #[arg(long, value_name = "ENCODER")]
    pub video_codec: Option<CodecChoice>,

    /// Audio encoder to force, or "auto"
    #[arg(long, value_name = "ENCODER")]
    pub audio_codec: Option<CodecChoice>,

    /// Encoder speed preset
    #[arg(long)]
    pub preset: Option<Preset>,

    /// Constant rate factor for video encodes (0-51)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=51))]
    pub crf: Option<u8>,

    /// Target video bitrate for video encodes
    #[arg(long, value_name = "KBPS")]
    pub bitrate: Option<u32>,

    /// Request two-pass encoding
    #[arg(long)]
    pub two_pass: bool,

    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Probe and plan only; print the ffmpeg command without running it
    #[arg(long)]
    pub dry_run: bool,

    /// Report whether ffmpeg and ffprobe can be found, then exit
    #[arg(long)]
    pub check_tools: bool,

    /// Print each snapshot as a JSON line instead of a progress line
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Applies the command-line overrides on top of the configured defaults.
    pub fn settings(&self, defaults: ConversionSettings) -> ConversionSettings {
        let mut settings = defaults;
        if self.overwrite {
            settings.overwrite_original = true;
        }
        if let Some(dir) = &self.output_dir {
            settings.output_dir = Some(dir.clone());
        }
        if self.no_video {
            settings.include_video = false;
        }
        if self.no_audio {
            settings.include_audio = false;
        }
        if self.no_subtitles {
            settings.include_subtitles = false;
        }
        if let Some(codec) = &self.video_codec {
            settings.video_codec = codec.clone();
        }
        if let Some(codec) = &self.audio_codec {
            settings.audio_codec = codec.clone();
        }
        if let Some(preset) = self.preset {
            settings.preset = preset;
        }
        if let Some(crf) = self.crf {
            settings.crf = crf;
        }
        if let Some(kbps) = self.bitrate {
            settings.video_bitrate_kbps = Some(kbps);
        }
        if self.two_pass {
            settings.two_pass = true;
        }
        settings
    }
}
