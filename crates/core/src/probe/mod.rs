//! Source codec detection.
//!
//! Runs the inspection tool once per input and reports the first video and
//! first audio codec it lists. Detection always completes before planning.

mod ffprobe;
mod traits;
mod types;

pub use ffprobe::FfprobeProber;
pub use traits::Prober;
pub use types::{ProbedCodecs, ProbedStream};
