use super::types::{ConversionPlan, JobClass, RemuxedStream, StreamDecision};
use crate::format::{CodecId, ContainerFormat, StreamKind};
use crate::probe::ProbedCodecs;
use crate::settings::{CodecChoice, ConversionSettings};

/// Decides copy/encode/drop for each stream.
///
/// An explicit codec always re-encodes. On auto, a stream is copied when the
/// target accepts its codec and otherwise encoded with the format default.
/// A source without audio yields a dropped audio stream.
pub fn plan(
    source: &ProbedCodecs,
    target: ContainerFormat,
    settings: &ConversionSettings,
) -> ConversionPlan {
    let video = decide(
        target,
        StreamKind::Video,
        &source.video,
        settings.include_video,
        &settings.video_codec,
    );
    let audio = decide(
        target,
        StreamKind::Audio,
        &source.audio,
        settings.include_audio && source.has_audio(),
        &settings.audio_codec,
    );
    let class = classify(&video, &audio);

    ConversionPlan {
        target,
        source: source.clone(),
        video,
        audio,
        include_subtitles: settings.include_subtitles,
        class,
    }
}

fn decide(
    target: ContainerFormat,
    kind: StreamKind,
    codec: &CodecId,
    included: bool,
    choice: &CodecChoice,
) -> StreamDecision {
    if !included {
        return StreamDecision::Drop;
    }

    match choice {
        CodecChoice::Named(encoder) => StreamDecision::Encode {
            encoder: encoder.clone(),
            extra_args: Vec::new(),
        },
        CodecChoice::Auto if target.can_copy(kind, codec.as_str()) => StreamDecision::Copy,
        CodecChoice::Auto => {
            let template = target.default_template(kind);
            StreamDecision::Encode {
                encoder: template.encoder.to_string(),
                extra_args: template.extra_args.iter().map(|s| s.to_string()).collect(),
            }
        }
    }
}

fn classify(video: &StreamDecision, audio: &StreamDecision) -> JobClass {
    match (video, audio) {
        (v, a) if !v.is_encode() && !a.is_encode() => JobClass::FullRemux,
        (StreamDecision::Copy, StreamDecision::Encode { .. }) => {
            JobClass::PartialRemux(RemuxedStream::Video)
        }
        (StreamDecision::Encode { .. }, StreamDecision::Copy) => {
            JobClass::PartialRemux(RemuxedStream::Audio)
        }
        _ => JobClass::FullEncode,
    }
}
