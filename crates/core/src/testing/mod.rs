//! Testing utilities: a mock prober and stand-ins for the external tools.
//!
//! # Example
//!
//! ```rust,ignore
//! use vidshift_core::testing::{fixtures, MockProber};
//!
//! let dir = tempfile::TempDir::new()?;
//! let tools = fixtures::FakeTools::install(dir.path(), fixtures::FakeFfmpeg::remux(), "h264", Some("aac"))?;
//! let config = tools.config();
//! ```

mod mock_prober;

pub use mock_prober::MockProber;

/// Fake `ffmpeg`/`ffprobe` shell scripts for driving real subprocesses.
#[cfg(unix)]
pub mod fixtures {
    use std::io;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    use crate::config::{Config, ToolsConfig};

    /// Script body for the fake ffmpeg.
    ///
    /// The script receives ffmpeg's arguments; the output path is the last one.
    #[derive(Debug, Clone)]
    pub struct FakeFfmpeg {
        script: String,
    }

    impl FakeFfmpeg {
        /// Prints a 10 second duration, two progress lines, writes the output
        /// file and exits 0.
        pub fn remux() -> Self {
            Self::custom(
                r#"for last; do :; done
printf 'Input #0, matroska,webm, from clip:\n  Duration: 00:00:10.00, start: 0.000000\n' >&2
printf 'frame=1 size=1kB time=00:00:05.00 bitrate=1kbits/s speed=10x\r' >&2
printf 'frame=2 size=2kB time=00:00:09.00 bitrate=1kbits/s speed=10x\r' >&2
printf 'converted' > "$last"
exit 0"#,
            )
        }

        /// Writes part of the output, complains and exits with `code`.
        pub fn failing(code: i32) -> Self {
            Self::custom(&format!(
                r#"for last; do :; done
printf '  Duration: 00:00:10.00, start: 0.000000\n' >&2
printf 'partial' > "$last"
printf 'clip.mkv: Invalid data found when processing input\n' >&2
exit {}"#,
                code
            ))
        }

        /// Writes part of the output, reports progress, then blocks.
        pub fn hanging() -> Self {
            Self::custom(
                r#"for last; do :; done
printf '  Duration: 00:10:00.00, start: 0.000000\n' >&2
printf 'partial' > "$last"
printf 'frame=1 size=1kB time=00:01:00.00 bitrate=1kbits/s\r' >&2
exec sleep 30"#,
            )
        }

        /// Records its arguments, one per line, to `args_file` then behaves
        /// like [`FakeFfmpeg::remux`].
        pub fn recording(args_file: &Path) -> Self {
            let remux = Self::remux();
            Self::custom(&format!(
                "for arg; do printf '%s\\n' \"$arg\"; done > '{}'\n{}",
                args_file.display(),
                remux.script
            ))
        }

        pub fn custom(body: &str) -> Self {
            Self {
                script: body.to_string(),
            }
        }
    }

    /// A pair of installed fake tools.
    #[derive(Debug, Clone)]
    pub struct FakeTools {
        pub ffmpeg: PathBuf,
        pub ffprobe: PathBuf,
    }

    impl FakeTools {
        /// Installs both scripts into `dir`. The fake ffprobe reports the
        /// given codecs as JSON.
        pub fn install(
            dir: &Path,
            ffmpeg: FakeFfmpeg,
            video_codec: &str,
            audio_codec: Option<&str>,
        ) -> io::Result<Self> {
            let ffmpeg_path = dir.join("ffmpeg");
            write_script(&ffmpeg_path, &ffmpeg.script)?;

            let mut streams = vec![format!(
                r#"{{"codec_type":"video","codec_name":"{}","disposition":{{"attached_pic":0}}}}"#,
                video_codec
            )];
            if let Some(audio) = audio_codec {
                streams.push(format!(
                    r#"{{"codec_type":"audio","codec_name":"{}","disposition":{{"attached_pic":0}}}}"#,
                    audio
                ));
            }
            let ffprobe_path = dir.join("ffprobe");
            write_script(
                &ffprobe_path,
                &format!("cat <<'JSON'\n{{\"streams\":[{}]}}\nJSON", streams.join(",")),
            )?;

            Ok(Self {
                ffmpeg: ffmpeg_path,
                ffprobe: ffprobe_path,
            })
        }

        /// Config pointing only at these tools.
        pub fn config(&self) -> Config {
            Config {
                tools: ToolsConfig::with_paths(self.ffmpeg.clone(), self.ffprobe.clone()),
                ..Default::default()
            }
        }
    }

    fn write_script(path: &Path, body: &str) -> io::Result<()> {
        std::fs::write(path, format!("#!/bin/sh\n{}\n", body))?;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
    }
}
