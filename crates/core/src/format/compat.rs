//! Per-container codec tables.

use super::types::{CodecId, ContainerFormat, EncodeTemplate, StreamKind};

const MP4_VIDEO: &[&str] = &["h264", "avc1", "hevc", "h265", "hvc1", "hev1", "av1", "mpeg4", "vp9"];
const MP4_AUDIO: &[&str] = &["aac", "mp3", "ac3", "eac3", "alac", "opus", "flac"];

const MOV_VIDEO: &[&str] = &["h264", "avc1", "hevc", "h265", "hvc1", "prores", "mpeg4", "mjpeg"];
const MOV_AUDIO: &[&str] = &["aac", "alac", "mp3", "ac3", "pcm_s16le", "pcm_s24le"];

const MKV_VIDEO: &[&str] = &[
    "h264", "avc1", "hevc", "h265", "av1", "vp8", "vp9", "mpeg4", "mpeg2video", "prores",
];
const MKV_AUDIO: &[&str] = &[
    "aac", "mp3", "ac3", "eac3", "dts", "truehd", "opus", "vorbis", "flac", "pcm_s16le",
    "pcm_s24le",
];

const WEBM_VIDEO: &[&str] = &["vp8", "vp9", "av1"];
const WEBM_AUDIO: &[&str] = &["opus", "vorbis"];

const AVI_VIDEO: &[&str] = &["mpeg4", "h264", "mjpeg", "msmpeg4v3"];
const AVI_AUDIO: &[&str] = &["mp3", "ac3", "pcm_s16le"];

const X264: EncodeTemplate = EncodeTemplate {
    encoder: "libx264",
    // Widest player compatibility for H.264 in Apple containers.
    extra_args: &["-pix_fmt", "yuv420p"],
};

const AAC: EncodeTemplate = EncodeTemplate {
    encoder: "aac",
    extra_args: &["-b:a", "192k"],
};

/// Returns the codecs `format` accepts for `kind`, in table order.
pub fn accepted_codecs(format: ContainerFormat, kind: StreamKind) -> &'static [&'static str] {
    match (format, kind) {
        (ContainerFormat::Mp4, StreamKind::Video) => MP4_VIDEO,
        (ContainerFormat::Mp4, StreamKind::Audio) => MP4_AUDIO,
        (ContainerFormat::Mov, StreamKind::Video) => MOV_VIDEO,
        (ContainerFormat::Mov, StreamKind::Audio) => MOV_AUDIO,
        (ContainerFormat::Mkv, StreamKind::Video) => MKV_VIDEO,
        (ContainerFormat::Mkv, StreamKind::Audio) => MKV_AUDIO,
        (ContainerFormat::Webm, StreamKind::Video) => WEBM_VIDEO,
        (ContainerFormat::Webm, StreamKind::Audio) => WEBM_AUDIO,
        (ContainerFormat::Avi, StreamKind::Video) => AVI_VIDEO,
        (ContainerFormat::Avi, StreamKind::Audio) => AVI_AUDIO,
    }
}

/// Whether a `codec` stream can be copied into `format` without re-encoding.
///
/// The candidate is case-folded; the table itself is already lower-case.
pub fn can_copy(format: ContainerFormat, kind: StreamKind, codec: &str) -> bool {
    let codec = CodecId::new(codec);
    if codec.is_empty() {
        return false;
    }
    accepted_codecs(format, kind).contains(&codec.as_str())
}

impl ContainerFormat {
    /// Codecs this container accepts for `kind`.
    pub fn accepted_codecs(&self, kind: StreamKind) -> &'static [&'static str] {
        accepted_codecs(*self, kind)
    }

    /// Whether `codec` may be copied into this container as a `kind` stream.
    pub fn can_copy(&self, kind: StreamKind, codec: &str) -> bool {
        can_copy(*self, kind, codec)
    }

    /// Encoder and arguments used when a stream has to be re-encoded and the
    /// user left the codec on auto.
    pub fn default_template(&self, kind: StreamKind) -> EncodeTemplate {
        match (self, kind) {
            (Self::Mp4 | Self::Mov, StreamKind::Video) => X264,
            (Self::Mkv, StreamKind::Video) => EncodeTemplate {
                encoder: "libx264",
                extra_args: &[],
            },
            (Self::Webm, StreamKind::Video) => EncodeTemplate {
                encoder: "libvpx-vp9",
                // Constant quality mode for VP9 needs an explicit zero target.
                extra_args: &["-b:v", "0"],
            },
            (Self::Avi, StreamKind::Video) => EncodeTemplate {
                encoder: "mpeg4",
                extra_args: &["-qscale:v", "3"],
            },
            (Self::Mp4 | Self::Mov | Self::Mkv, StreamKind::Audio) => AAC,
            (Self::Webm, StreamKind::Audio) => EncodeTemplate {
                encoder: "libopus",
                extra_args: &["-b:a", "128k"],
            },
            (Self::Avi, StreamKind::Audio) => EncodeTemplate {
                encoder: "libmp3lame",
                extra_args: &["-b:a", "192k"],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KINDS: [StreamKind; 2] = [StreamKind::Video, StreamKind::Audio];

    #[test]
    fn test_every_table_entry_is_copyable_in_any_case() {
        for format in ContainerFormat::ALL {
            for kind in KINDS {
                for codec in accepted_codecs(format, kind) {
                    assert!(can_copy(format, kind, codec), "{format} {kind} {codec}");
                    assert!(
                        can_copy(format, kind, &codec.to_uppercase()),
                        "{format} {kind} {codec} upper-case"
                    );
                }
            }
        }
    }

    #[test]
    fn test_tables_match_documented_lists() {
        let expected: [(ContainerFormat, &[&str], &[&str]); 5] = [
            (
                ContainerFormat::Mp4,
                &["h264", "avc1", "hevc", "h265", "hvc1", "hev1", "av1", "mpeg4", "vp9"],
                &["aac", "mp3", "ac3", "eac3", "alac", "opus", "flac"],
            ),
            (
                ContainerFormat::Mov,
                &["h264", "avc1", "hevc", "h265", "hvc1", "prores", "mpeg4", "mjpeg"],
                &["aac", "alac", "mp3", "ac3", "pcm_s16le", "pcm_s24le"],
            ),
            (
                ContainerFormat::Mkv,
                &[
                    "h264", "avc1", "hevc", "h265", "av1", "vp8", "vp9", "mpeg4", "mpeg2video",
                    "prores",
                ],
                &[
                    "aac", "mp3", "ac3", "eac3", "dts", "truehd", "opus", "vorbis", "flac",
                    "pcm_s16le", "pcm_s24le",
                ],
            ),
            (ContainerFormat::Webm, &["vp8", "vp9", "av1"], &["opus", "vorbis"]),
            (
                ContainerFormat::Avi,
                &["mpeg4", "h264", "mjpeg", "msmpeg4v3"],
                &["mp3", "ac3", "pcm_s16le"],
            ),
        ];

        for (format, video, audio) in expected {
            assert_eq!(accepted_codecs(format, StreamKind::Video), video, "{format} video");
            assert_eq!(accepted_codecs(format, StreamKind::Audio), audio, "{format} audio");
            for codec in video {
                assert!(can_copy(format, StreamKind::Video, codec), "{format} {codec}");
            }
            for codec in audio {
                assert!(can_copy(format, StreamKind::Audio, codec), "{format} {codec}");
            }
        }
    }

    #[test]
    fn test_each_format_rejects_a_foreign_codec() {
        let rejected = [
            (ContainerFormat::Mp4, "mpeg2video", "dts"),
            (ContainerFormat::Mov, "hev1", "opus"),
            (ContainerFormat::Mkv, "msmpeg4v3", "alac"),
            (ContainerFormat::Webm, "h264", "aac"),
            (ContainerFormat::Avi, "hevc", "aac"),
        ];
        for (format, video, audio) in rejected {
            assert!(!can_copy(format, StreamKind::Video, video), "{format} {video}");
            assert!(!can_copy(format, StreamKind::Audio, audio), "{format} {audio}");
        }
    }

    #[test]
    fn test_tables_are_lowercase() {
        for format in ContainerFormat::ALL {
            for kind in KINDS {
                for codec in accepted_codecs(format, kind) {
                    assert_eq!(*codec, codec.to_lowercase());
                }
            }
        }
    }

    #[test]
    fn test_known_rejections() {
        assert!(!can_copy(ContainerFormat::Webm, StreamKind::Video, "h264"));
        assert!(!can_copy(ContainerFormat::Webm, StreamKind::Audio, "aac"));
        assert!(!can_copy(ContainerFormat::Mp4, StreamKind::Audio, "vorbis"));
        assert!(!can_copy(ContainerFormat::Mp4, StreamKind::Audio, "dts"));
        assert!(!can_copy(ContainerFormat::Avi, StreamKind::Video, "vp9"));
        assert!(!can_copy(ContainerFormat::Mov, StreamKind::Video, "vp8"));
    }

    #[test]
    fn test_kind_matters() {
        assert!(can_copy(ContainerFormat::Mkv, StreamKind::Audio, "aac"));
        assert!(!can_copy(ContainerFormat::Mkv, StreamKind::Video, "aac"));
    }

    #[test]
    fn test_empty_codec_never_copies() {
        for format in ContainerFormat::ALL {
            assert!(!can_copy(format, StreamKind::Audio, ""));
        }
    }

    #[test]
    fn test_default_encoders_are_not_copy() {
        for format in ContainerFormat::ALL {
            for kind in KINDS {
                let template = format.default_template(kind);
                assert_ne!(template.encoder, "copy");
                assert!(template.extra_args.len() % 2 == 0);
            }
        }
        assert_eq!(
            ContainerFormat::Webm.default_template(StreamKind::Video).encoder,
            "libvpx-vp9"
        );
        assert_eq!(
            ContainerFormat::Avi.default_template(StreamKind::Audio).encoder,
            "libmp3lame"
        );
    }
}
