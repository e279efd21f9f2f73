//! Progress extraction from ffmpeg's diagnostic output.
//!
//! ffmpeg prints `Duration: HH:MM:SS.ss` once while opening the input and a
//! stream of `time=HH:MM:SS.ss` stats while working. Parsing is stateless per
//! call; the caller owns a [`ProgressState`] holding the cached duration and
//! the job start time. Malformed or missing markers never fail a job, they
//! simply produce no update.

use once_cell::sync::Lazy;
use regex_lite::{Captures, Regex};
use std::time::{Duration, Instant};

use crate::plan::Action;

/// Highest fraction reported before the process has exited successfully.
pub const MAX_RUNNING_FRACTION: f64 = 0.99;

/// Status shown when no time estimate is available.
pub const PROCESSING_STATUS: &str = "Processing...";

static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Duration:\s*(\d+):(\d{2}):(\d{2}(?:\.\d+)?)").expect("duration pattern is valid")
});

static TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"time=\s*(\d+):(\d{2}):(\d{2}(?:\.\d+)?)").expect("time pattern is valid")
});

/// Job-scoped parser state.
#[derive(Debug, Clone)]
pub struct ProgressState {
    duration_secs: Option<f64>,
    started_at: Instant,
}

impl ProgressState {
    pub fn new(started_at: Instant) -> Self {
        Self {
            duration_secs: None,
            started_at,
        }
    }

    /// Total input duration, once discovered.
    pub fn duration_secs(&self) -> Option<f64> {
        self.duration_secs
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }
}

/// A progress observation derived from one chunk of output.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    /// Fraction complete in `[0, MAX_RUNNING_FRACTION]`.
    pub fraction: f64,
    /// Estimated time left, when one could be computed.
    pub remaining: Option<Duration>,
    /// Human-readable status line.
    pub status: String,
}

/// Parses a chunk using the current wall clock for the ETA.
pub fn parse_chunk(state: &mut ProgressState, chunk: &str, action: Action) -> Option<ProgressUpdate> {
    parse_chunk_at(state, chunk, action, Instant::now())
}

/// Parses a chunk as if observed at `now`.
///
/// The duration marker is cached the first time it is seen and never
/// replaced. The last time marker in the chunk determines the fraction.
pub fn parse_chunk_at(
    state: &mut ProgressState,
    chunk: &str,
    action: Action,
    now: Instant,
) -> Option<ProgressUpdate> {
    if state.duration_secs.is_none() {
        state.duration_secs = DURATION_RE
            .captures(chunk)
            .and_then(|caps| timestamp_secs(&caps))
            .filter(|secs| *secs > 0.0);
    }

    let duration = state.duration_secs?;
    let current = TIME_RE
        .captures_iter(chunk)
        .filter_map(|caps| timestamp_secs(&caps))
        .last()?;

    let fraction = (current / duration).clamp(0.0, MAX_RUNNING_FRACTION);
    let elapsed = now.saturating_duration_since(state.started_at);
    let remaining = estimate_remaining(elapsed, fraction);

    Some(ProgressUpdate {
        fraction,
        remaining,
        status: format_status(action, remaining),
    })
}

/// Parses `HH:MM:SS.ss` into seconds.
pub fn parse_timestamp(text: &str) -> Option<f64> {
    let mut parts = text.trim().splitn(3, ':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    if minutes >= 60.0 || seconds >= 60.0 {
        return None;
    }
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

fn timestamp_secs(caps: &Captures<'_>) -> Option<f64> {
    let text = format!("{}:{}:{}", caps.get(1)?.as_str(), caps.get(2)?.as_str(), caps.get(3)?.as_str());
    parse_timestamp(&text)
}

/// Remaining time as `elapsed * (1 / fraction - 1)`.
///
/// Returns `None` when the fraction is zero or the estimate is not positive
/// or not representable.
pub fn estimate_remaining(elapsed: Duration, fraction: f64) -> Option<Duration> {
    if fraction <= 0.0 {
        return None;
    }
    let secs = elapsed.as_secs_f64() * (1.0 / fraction - 1.0);
    if secs > 0.0 {
        // Absurd headers can push the estimate past what Duration holds.
        Duration::try_from_secs_f64(secs).ok()
    } else {
        None
    }
}

/// Status line such as `Remuxing: 2m 05s remaining`.
pub fn format_status(action: Action, remaining: Option<Duration>) -> String {
    let Some(remaining) = remaining else {
        return PROCESSING_STATUS.to_string();
    };

    let total = remaining.as_secs_f64().round() as u64;
    if total == 0 {
        return PROCESSING_STATUS.to_string();
    }

    let (minutes, seconds) = (total / 60, total % 60);
    if minutes > 0 {
        format!("{}: {}m {:02}s remaining", action.label(), minutes, seconds)
    } else {
        format!("{}: {}s remaining", action.label(), seconds)
    }
}
