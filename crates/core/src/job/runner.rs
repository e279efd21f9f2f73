//! Job task: probe, plan, run the transcoder, clean up.
//!
//! Everything that mutates a job's snapshot runs here, on one task. Output
//! readers only forward raw chunks over a channel.

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::log_buffer::RollingLog;
use super::output_path::{resolve_output_path, OutputTarget};
use super::types::{ConversionOutcome, ConversionRequest, JobSnapshot, JobState};
use crate::args::build_args;
use crate::error::{ConvertError, Result};
use crate::plan::{plan, Action};
use crate::probe::Prober;
use crate::progress::{parse_chunk, ProgressState, PROCESSING_STATUS};
use crate::tools::{Tool, ToolLocator};

/// Size of each read from the tool's output pipes.
const READ_CHUNK_BYTES: usize = 4096;

/// Output chunks buffered between the readers and the job task.
const CHUNK_CHANNEL_CAPACITY: usize = 256;

/// Grace period for collecting trailing output after the tool exits.
const DRAIN_GRACE: Duration = Duration::from_millis(250);

/// Unterminated output kept for marker parsing before it is flushed anyway.
const MAX_PENDING_BYTES: usize = 8 * 1024;

/// Lines of tool output quoted in a failure.
const ERROR_TAIL_LINES: usize = 8;

/// Everything a job task needs from its orchestrator.
pub(super) struct JobContext {
    pub job_id: Uuid,
    pub tools: ToolLocator,
    pub prober: Arc<dyn Prober>,
    pub state_tx: Arc<watch::Sender<JobSnapshot>>,
    pub suffix: String,
    pub log_capacity: usize,
}

/// One-shot cancel signal that can be awaited repeatedly inside `select!`.
pub(super) struct CancelSignal {
    rx: Option<oneshot::Receiver<()>>,
}

impl CancelSignal {
    pub fn new(rx: oneshot::Receiver<()>) -> Self {
        Self { rx: Some(rx) }
    }

    /// Resolves once cancel was requested. Pends forever if the sender went
    /// away without asking.
    async fn requested(&mut self) {
        if let Some(rx) = self.rx.as_mut() {
            let result = rx.await;
            self.rx = None;
            if result.is_ok() {
                return;
            }
        }
        std::future::pending::<()>().await
    }
}

/// Runs a job to completion and reports the outcome on `result_tx`.
pub(super) async fn run_job(
    ctx: JobContext,
    request: ConversionRequest,
    input: PathBuf,
    mut cancel: CancelSignal,
    result_tx: oneshot::Sender<Result<ConversionOutcome>>,
) {
    let started = Instant::now();
    let mut written: Option<PathBuf> = None;

    let result = execute(&ctx, &request, &input, started, &mut cancel, &mut written).await;

    match &result {
        Ok(outcome) => {
            info!(
                "Job {} succeeded in {} ms: {:?}",
                ctx.job_id, outcome.elapsed_ms, outcome.output_path
            );
            let output = outcome.output_path.clone();
            publish(&ctx, started, |s| {
                s.state = JobState::Succeeded;
                s.progress = 1.0;
                s.status = format!("Done: {}", output.display());
            });
        }
        Err(err) => {
            if let Some(path) = written.as_deref() {
                remove_partial(path).await;
            }
            if matches!(err, ConvertError::Cancelled) {
                info!("Job {} cancelled", ctx.job_id);
                publish(&ctx, started, |s| {
                    s.state = JobState::Cancelled;
                    s.progress = 0.0;
                    s.status = "Cancelled".to_string();
                });
            } else {
                warn!("Job {} failed: {}", ctx.job_id, err);
                let message = err.to_string();
                publish(&ctx, started, |s| {
                    s.state = JobState::Failed;
                    s.status = message.clone();
                    s.error = Some(message);
                });
            }
        }
    }

    // The handle may have been dropped; the snapshot already carries the outcome.
    let _ = result_tx.send(result);
}

async fn execute(
    ctx: &JobContext,
    request: &ConversionRequest,
    input: &Path,
    started: Instant,
    cancel: &mut CancelSignal,
    written: &mut Option<PathBuf>,
) -> Result<ConversionOutcome> {
    let settings = &request.settings;

    // Probing
    let ffmpeg = ctx.tools.locate(Tool::Ffmpeg)?;
    let codecs = tokio::select! {
        codecs = ctx.prober.probe(input) => codecs?,
        _ = cancel.requested() => return Err(ConvertError::Cancelled),
    };

    // Planning
    publish(ctx, started, |s| {
        s.state = JobState::Planning;
        s.status = "Planning".to_string();
    });
    let plan = plan(&codecs, request.target, settings);
    info!("Job {}: {} ({:?})", ctx.job_id, plan.summary(), plan.class);
    if settings.two_pass {
        debug!("Two-pass requested; running a single pass");
    }

    let target = resolve_output_path(input, request.target, settings, &ctx.suffix)?;
    if let Some(parent) = target.write_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    let args = build_args(&plan, settings, input, &target.write_path);
    debug!("ffmpeg args: {:?}", args);

    // Running
    let action = plan.action();
    let final_path = target.final_path.clone();
    let class = plan.class;
    publish(ctx, started, |s| {
        s.state = JobState::Running;
        s.output_path = Some(final_path);
        s.class = Some(class);
        s.status = format!("{}...", action.label());
    });

    let mut child = spawn_tool(&ffmpeg, &args)?;
    *written = Some(target.write_path.clone());

    supervise(ctx, &mut child, action, started, cancel).await?;
    finalize(ctx, &target).await?;
    *written = None;

    Ok(ConversionOutcome {
        job_id: ctx.job_id,
        input_path: input.to_path_buf(),
        output_path: target.final_path,
        plan,
        elapsed_ms: started.elapsed().as_millis() as u64,
    })
}

fn spawn_tool(ffmpeg: &Path, args: &[String]) -> Result<Child> {
    Command::new(ffmpeg)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| ConvertError::conversion_failed(None, format!("Failed to start ffmpeg: {}", e)))
}

/// Feeds output to the progress parser until the tool exits or cancel arrives.
///
/// A non-zero exit becomes `ConversionFailed` quoting the end of the log.
async fn supervise(
    ctx: &JobContext,
    child: &mut Child,
    action: Action,
    started: Instant,
    cancel: &mut CancelSignal,
) -> Result<ExitStatus> {
    let (chunk_tx, mut chunk_rx) = mpsc::channel::<(Pipe, String)>(CHUNK_CHANNEL_CAPACITY);
    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(forward_output(Pipe::Stdout, stdout, chunk_tx.clone()));
    }
    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(forward_output(Pipe::Stderr, stderr, chunk_tx.clone()));
    }
    drop(chunk_tx);

    let mut tracker = ChunkTracker::new(ctx.log_capacity, started);
    let mut readers_open = true;

    let status = loop {
        tokio::select! {
            biased;
            _ = cancel.requested() => {
                if let Err(e) = child.start_kill() {
                    warn!("Failed to signal ffmpeg: {}", e);
                }
                // Reap promptly so the partial file is no longer being written.
                let _ = timeout(DRAIN_GRACE, child.wait()).await;
                return Err(ConvertError::Cancelled);
            }
            chunk = chunk_rx.recv(), if readers_open => match chunk {
                Some((pipe, chunk)) => tracker.feed(ctx, pipe, &chunk, action),
                None => readers_open = false,
            },
            status = child.wait() => break status?,
        }
    };

    // Pick up whatever the readers still hold so failures quote the real error.
    let _ = timeout(DRAIN_GRACE, async {
        while let Some((_, chunk)) = chunk_rx.recv().await {
            tracker.log.push(&chunk);
        }
    })
    .await;

    if !status.success() {
        let tail = tracker.log.tail_lines(ERROR_TAIL_LINES);
        let mut detail = status_detail(&status);
        if !tail.is_empty() {
            detail = format!("{}\n{}", detail, tail);
        }
        return Err(ConvertError::conversion_failed(status.code(), detail));
    }

    Ok(status)
}

/// Output pipe a chunk was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pipe {
    Stdout,
    Stderr,
}

/// Job-side state for turning raw chunks into snapshot updates.
struct ChunkTracker {
    log: RollingLog,
    progress: ProgressState,
    /// Unterminated tail per pipe; interleaved pipes must not mix markers.
    pending: [String; 2],
    fraction: f64,
    job_started: Instant,
}

impl ChunkTracker {
    /// ETA is measured from now, when the tool starts, not from job start.
    fn new(log_capacity: usize, job_started: Instant) -> Self {
        Self {
            log: RollingLog::new(log_capacity),
            progress: ProgressState::new(Instant::now()),
            pending: [String::new(), String::new()],
            fraction: 0.0,
            job_started,
        }
    }

    /// Parses only complete `\r`/`\n` terminated segments so a marker split
    /// across two reads is still seen whole.
    fn feed(&mut self, ctx: &JobContext, pipe: Pipe, chunk: &str, action: Action) {
        self.log.push(chunk);
        let pending = &mut self.pending[pipe as usize];
        pending.push_str(chunk);

        let complete = match pending.rfind(['\r', '\n']) {
            Some(idx) => {
                let rest = pending.split_off(idx + 1);
                std::mem::replace(pending, rest)
            }
            None if pending.len() > MAX_PENDING_BYTES => std::mem::take(pending),
            None => return,
        };

        let Some(update) = parse_chunk(&mut self.progress, &complete, action) else {
            return;
        };

        // Never move backwards while running.
        self.fraction = self.fraction.max(update.fraction);
        let fraction = self.fraction;
        publish(ctx, self.job_started, |s| {
            s.progress = fraction;
            s.status = if update.status == PROCESSING_STATUS {
                format!("{}...", action.label())
            } else {
                update.status
            };
        });
    }
}

async fn forward_output<R>(pipe: Pipe, mut reader: R, tx: mpsc::Sender<(Pipe, String)>)
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; READ_CHUNK_BYTES];
    let mut decoder = Utf8Carry::default();
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                let chunk = decoder.decode(&buf[..n]);
                if chunk.is_empty() {
                    continue;
                }
                if tx.send((pipe, chunk)).await.is_err() {
                    return;
                }
            }
            Err(e) => {
                debug!("Stopped reading tool output: {}", e);
                break;
            }
        }
    }

    let rest = decoder.finish();
    if !rest.is_empty() {
        let _ = tx.send((pipe, rest)).await;
    }
}

/// Lossy UTF-8 decoding that holds back a character split across reads.
#[derive(Debug, Default)]
struct Utf8Carry {
    partial: Vec<u8>,
}

impl Utf8Carry {
    fn decode(&mut self, bytes: &[u8]) -> String {
        self.partial.extend_from_slice(bytes);
        let keep = incomplete_suffix_len(&self.partial);
        let rest = self.partial.split_off(self.partial.len() - keep);
        let chunk = String::from_utf8_lossy(&self.partial).into_owned();
        self.partial = rest;
        chunk
    }

    /// Whatever is left at end of stream, replacement characters included.
    fn finish(self) -> String {
        String::from_utf8_lossy(&self.partial).into_owned()
    }
}

/// Length of a trailing multi-byte sequence that is still missing bytes.
fn incomplete_suffix_len(bytes: &[u8]) -> usize {
    for back in 1..=bytes.len().min(3) {
        let byte = bytes[bytes.len() - back];
        if byte & 0xC0 == 0x80 {
            continue;
        }
        let width = match byte {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => 1,
        };
        return if width > back { back } else { 0 };
    }
    0
}

/// Moves a staged result into place and retires a replaced source.
async fn finalize(ctx: &JobContext, target: &OutputTarget) -> Result<()> {
    if tokio::fs::metadata(&target.write_path).await.is_err() {
        return Err(ConvertError::conversion_failed(
            Some(0),
            "ffmpeg reported success but no output file was created",
        ));
    }

    if target.is_staged() {
        tokio::fs::rename(&target.write_path, &target.final_path).await?;
        debug!(
            "Job {}: moved {:?} to {:?}",
            ctx.job_id, target.write_path, target.final_path
        );
    }

    if let Some(source) = &target.replaces {
        if let Err(e) = tokio::fs::remove_file(source).await {
            warn!("Converted file is in place but {:?} could not be removed: {}", source, e);
        }
    }

    Ok(())
}

/// Best-effort removal of a partial output file.
async fn remove_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("Removed partial output {:?}", path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove partial output {:?}: {}", path, e),
    }
}

fn status_detail(status: &ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("ffmpeg exited with code {}", code),
        None => format!("ffmpeg terminated by signal ({})", status),
    }
}

/// Applies `update` to the current snapshot and refreshes the elapsed time.
fn publish(ctx: &JobContext, started: Instant, update: impl FnOnce(&mut JobSnapshot)) {
    ctx.state_tx.send_modify(|snapshot| {
        if snapshot.job_id != Some(ctx.job_id) {
            return;
        }
        update(snapshot);
        snapshot.elapsed_ms = started.elapsed().as_millis() as u64;
        if snapshot.started_at.is_none() {
            snapshot.started_at = Some(Utc::now());
        }
    });
}
