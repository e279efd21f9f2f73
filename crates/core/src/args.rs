//! ffmpeg argument synthesis.
//!
//! A pure function of the plan, the settings and the two paths. The same
//! inputs always produce the same token list.

use std::path::Path;

use crate::plan::{ConversionPlan, StreamDecision};
use crate::settings::ConversionSettings;

/// Builds the ffmpeg command line (without the program name).
///
/// Token order: input, video, audio, subtitles, overwrite flag, output.
pub fn build_args(
    plan: &ConversionPlan,
    settings: &ConversionSettings,
    input_path: &Path,
    output_path: &Path,
) -> Vec<String> {
    let mut args = vec!["-i".to_string(), input_path.to_string_lossy().to_string()];

    args.extend(video_args(&plan.video, settings));
    args.extend(audio_args(&plan.audio));

    if plan.include_subtitles {
        args.extend(["-c:s".to_string(), "copy".to_string()]);
    } else {
        args.push("-sn".to_string());
    }

    args.push("-y".to_string());
    args.push(output_path.to_string_lossy().to_string());

    args
}

fn video_args(decision: &StreamDecision, settings: &ConversionSettings) -> Vec<String> {
    match decision {
        StreamDecision::Drop => vec!["-vn".to_string()],
        StreamDecision::Copy => vec!["-c:v".to_string(), "copy".to_string()],
        StreamDecision::Encode {
            encoder,
            extra_args,
        } => {
            let mut args = vec!["-c:v".to_string(), encoder.clone()];
            args.extend(extra_args.iter().cloned());
            args.extend([
                "-preset".to_string(),
                settings.preset.as_str().to_string(),
                "-crf".to_string(),
                settings.crf.to_string(),
            ]);
            // Bitrate only means something when the stream is re-encoded.
            if let Some(kbps) = settings.video_bitrate_kbps {
                args.extend(["-b:v".to_string(), format!("{}k", kbps)]);
            }
            args
        }
    }
}

fn audio_args(decision: &StreamDecision) -> Vec<String> {
    match decision {
        StreamDecision::Drop => vec!["-an".to_string()],
        StreamDecision::Copy => vec!["-c:a".to_string(), "copy".to_string()],
        StreamDecision::Encode {
            encoder,
            extra_args,
        } => {
            let mut args = vec!["-c:a".to_string(), encoder.clone()];
            args.extend(extra_args.iter().cloned());
            args
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::ContainerFormat;
    use crate::plan::{plan, JobClass};
    use crate::probe::ProbedCodecs;
    use crate::settings::{CodecChoice, Preset};

    fn paths() -> (&'static Path, &'static Path) {
        (Path::new("/in/clip.mkv"), Path::new("/out/clip_converted.mp4"))
    }

    fn strs(args: &[String]) -> Vec<&str> {
        args.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_full_remux_is_all_copy() {
        let settings = ConversionSettings::default();
        let plan = plan(&ProbedCodecs::new("h264", "aac"), ContainerFormat::Mp4, &settings);
        assert_eq!(plan.class, JobClass::FullRemux);

        let (input, output) = paths();
        let args = build_args(&plan, &settings, input, output);
        assert_eq!(
            strs(&args),
            vec![
                "-i",
                "/in/clip.mkv",
                "-c:v",
                "copy",
                "-c:a",
                "copy",
                "-c:s",
                "copy",
                "-y",
                "/out/clip_converted.mp4",
            ]
        );
        assert!(!args.contains(&"-crf".to_string()));
        assert!(!args.contains(&"-preset".to_string()));
    }

    #[test]
    fn test_encode_video_with_preset_crf_and_bitrate() {
        let settings = ConversionSettings {
            video_codec: CodecChoice::named("libx265"),
            preset: Preset::Slow,
            crf: 20,
            video_bitrate_kbps: Some(4000),
            include_subtitles: false,
            ..Default::default()
        };
        let plan = plan(&ProbedCodecs::new("h264", "aac"), ContainerFormat::Mkv, &settings);

        let (input, output) = paths();
        let args = build_args(&plan, &settings, input, output);
        assert_eq!(
            strs(&args),
            vec![
                "-i",
                "/in/clip.mkv",
                "-c:v",
                "libx265",
                "-preset",
                "slow",
                "-crf",
                "20",
                "-b:v",
                "4000k",
                "-c:a",
                "copy",
                "-sn",
                "-y",
                "/out/clip_converted.mp4",
            ]
        );
    }

    #[test]
    fn test_bitrate_ignored_when_copying_video() {
        let settings = ConversionSettings {
            video_bitrate_kbps: Some(2500),
            ..Default::default()
        };
        let plan = plan(&ProbedCodecs::new("h264", "aac"), ContainerFormat::Mp4, &settings);
        let (input, output) = paths();
        let args = build_args(&plan, &settings, input, output);
        assert!(!args.contains(&"-b:v".to_string()));
        assert!(!args.contains(&"2500k".to_string()));
    }

    #[test]
    fn test_default_template_args_follow_codec() {
        let settings = ConversionSettings::default();
        let plan = plan(&ProbedCodecs::new("h264", "aac"), ContainerFormat::Webm, &settings);
        let (input, output) = paths();
        let args = build_args(&plan, &settings, input, output);

        let cv = args.iter().position(|a| a == "-c:v").unwrap();
        assert_eq!(strs(&args[cv..cv + 4]), vec!["-c:v", "libvpx-vp9", "-b:v", "0"]);
        let ca = args.iter().position(|a| a == "-c:a").unwrap();
        assert_eq!(strs(&args[ca..ca + 4]), vec!["-c:a", "libopus", "-b:a", "128k"]);
    }

    #[test]
    fn test_dropped_streams() {
        let settings = ConversionSettings {
            include_audio: false,
            include_subtitles: false,
            ..Default::default()
        };
        let plan = plan(&ProbedCodecs::new("h264", "aac"), ContainerFormat::Mp4, &settings);
        let (input, output) = paths();
        let args = build_args(&plan, &settings, input, output);
        assert!(args.contains(&"-an".to_string()));
        assert!(args.contains(&"-sn".to_string()));
        assert!(!args.contains(&"-c:a".to_string()));

        let settings = ConversionSettings {
            include_video: false,
            ..Default::default()
        };
        let plan = crate::plan::plan(
            &ProbedCodecs::new("h264", "aac"),
            ContainerFormat::Mp4,
            &settings,
        );
        let args = build_args(&plan, &settings, input, output);
        assert_eq!(args[2], "-vn");
    }

    #[test]
    fn test_input_first_output_last() {
        let settings = ConversionSettings::default();
        for format in ContainerFormat::ALL {
            let plan = plan(&ProbedCodecs::new("mpeg2video", "dts"), format, &settings);
            let (input, output) = paths();
            let args = build_args(&plan, &settings, input, output);
            assert_eq!(strs(&args[..2]), vec!["-i", "/in/clip.mkv"]);
            assert_eq!(args[args.len() - 2], "-y");
            assert_eq!(args[args.len() - 1], "/out/clip_converted.mp4");
        }
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let settings = ConversionSettings {
            audio_codec: CodecChoice::named("libmp3lame"),
            video_bitrate_kbps: Some(1200),
            ..Default::default()
        };
        let plan = plan(&ProbedCodecs::new("vp8", "vorbis"), ContainerFormat::Avi, &settings);
        let (input, output) = paths();
        let first = build_args(&plan, &settings, input, output);
        for _ in 0..10 {
            assert_eq!(build_args(&plan, &settings, input, output), first);
        }
    }
}
