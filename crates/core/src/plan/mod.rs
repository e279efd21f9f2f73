//! Copy/encode/drop planning.
//!
//! Combines probed source codecs, the target container's compatibility
//! table and the user's settings into one decision per stream.

mod planner;
mod types;

pub use planner::plan;
pub use types::{Action, ConversionPlan, JobClass, RemuxedStream, StreamDecision};
