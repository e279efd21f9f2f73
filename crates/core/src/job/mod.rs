//! Conversion job lifecycle.
//!
//! A job moves through `Idle -> Probing -> Planning -> Running` and ends in
//! exactly one of `Succeeded`, `Failed` or `Cancelled`. All transitions for a
//! job happen on its own task and are published through a `watch` channel.
//!
//! # Example
//!
//! ```ignore
//! use vidshift_core::{Config, ContainerFormat, ConversionRequest, JobOrchestrator};
//!
//! let orchestrator = JobOrchestrator::new(Config::default());
//! let mut handle = orchestrator
//!     .start(ConversionRequest::new("/videos/clip.mkv", ContainerFormat::Mp4))
//!     .await?;
//!
//! while handle.updates.changed().await.is_ok() {
//!     let snapshot = handle.updates.borrow().clone();
//!     println!("{:>5.1}% {}", snapshot.progress * 100.0, snapshot.status);
//!     if snapshot.state.is_terminal() {
//!         break;
//!     }
//! }
//!
//! let outcome = handle.wait().await?;
//! println!("Wrote {}", outcome.output_path.display());
//! ```

mod log_buffer;
mod orchestrator;
mod output_path;
mod runner;
mod types;

pub use log_buffer::RollingLog;
pub use orchestrator::{JobHandle, JobOrchestrator};
pub use output_path::{resolve_output_path, OutputTarget};
pub use types::{ConversionOutcome, ConversionRequest, JobSnapshot, JobState};
