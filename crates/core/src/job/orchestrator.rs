//! Single-job orchestrator.
//!
//! Owns the published snapshot and the cancel handle of the active job. At
//! most one job runs at a time; `start` while a job is active fails with
//! `Busy` instead of queueing.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{oneshot, watch, Mutex};
use tracing::{debug, info};
use uuid::Uuid;

use super::runner::{run_job, CancelSignal, JobContext};
use super::types::{ConversionOutcome, ConversionRequest, JobSnapshot, JobState};
use crate::config::Config;
use crate::error::{ConvertError, Result};
use crate::probe::{FfprobeProber, Prober};
use crate::tools::ToolLocator;

/// Bookkeeping for the job currently owned by the orchestrator.
struct ActiveJob {
    job_id: Uuid,
    cancel_tx: Option<oneshot::Sender<()>>,
}

/// Runs conversion jobs one at a time and publishes their progress.
pub struct JobOrchestrator {
    tools: ToolLocator,
    prober: Arc<dyn Prober>,
    suffix: String,
    log_capacity: usize,
    state_tx: Arc<watch::Sender<JobSnapshot>>,
    active: Mutex<Option<ActiveJob>>,
}

impl JobOrchestrator {
    /// Orchestrator probing with ffprobe, located per `config.tools`.
    pub fn new(config: Config) -> Self {
        let prober = Arc::new(FfprobeProber::new(ToolLocator::new(config.tools.clone())));
        Self::with_prober(config, prober)
    }

    /// Orchestrator with a custom prober.
    pub fn with_prober(config: Config, prober: Arc<dyn Prober>) -> Self {
        let (state_tx, _) = watch::channel(JobSnapshot::default());
        Self {
            tools: ToolLocator::new(config.tools),
            prober,
            suffix: config.output.suffix,
            log_capacity: config.output.log_buffer_bytes,
            state_tx: Arc::new(state_tx),
            active: Mutex::new(None),
        }
    }

    /// Validates `request` and starts it on a background task.
    ///
    /// Returns once the job is in `Probing`. Input and settings problems are
    /// reported here, before any state changes; everything later is reported
    /// through the handle and the snapshot.
    pub async fn start(&self, request: ConversionRequest) -> Result<JobHandle> {
        let input = request
            .input
            .clone()
            .ok_or_else(|| ConvertError::invalid_input("No input file given"))?;
        if !input.is_file() {
            return Err(ConvertError::invalid_input(format!(
                "Not a readable file: {}",
                input.display()
            )));
        }
        request.settings.validate()?;

        let mut active = self.active.lock().await;
        let current = self.state_tx.borrow().state;
        if active.is_some() && !current.is_terminal() {
            debug!("Rejecting start while job is {}", current);
            return Err(ConvertError::Busy);
        }

        let job_id = Uuid::new_v4();
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let (result_tx, result_rx) = oneshot::channel();

        // Subscribe before the reset so the handle sees this job's first state.
        let updates = self.state_tx.subscribe();
        let started_at = Utc::now();
        let input_path = input.clone();
        self.state_tx.send_replace(JobSnapshot {
            job_id: Some(job_id),
            state: JobState::Probing,
            input_path: Some(input_path),
            status: "Probing".to_string(),
            started_at: Some(started_at),
            ..Default::default()
        });

        info!(
            "Starting job {}: {} -> {}",
            job_id,
            input.display(),
            request.target
        );

        let ctx = JobContext {
            job_id,
            tools: self.tools.clone(),
            prober: Arc::clone(&self.prober),
            state_tx: Arc::clone(&self.state_tx),
            suffix: self.suffix.clone(),
            log_capacity: self.log_capacity,
        };
        tokio::spawn(run_job(
            ctx,
            request,
            input,
            CancelSignal::new(cancel_rx),
            result_tx,
        ));

        *active = Some(ActiveJob {
            job_id,
            cancel_tx: Some(cancel_tx),
        });

        Ok(JobHandle {
            job_id,
            updates,
            result_rx,
        })
    }

    /// Requests cancellation of the active job.
    ///
    /// No-op when nothing is running or cancel was already requested.
    pub async fn cancel(&self) {
        let mut active = self.active.lock().await;
        let Some(job) = active.as_mut() else {
            return;
        };
        if self.state_tx.borrow().state.is_terminal() {
            return;
        }
        if let Some(tx) = job.cancel_tx.take() {
            info!("Cancelling job {}", job.job_id);
            // The job may finish on its own before it sees the signal.
            let _ = tx.send(());
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> JobSnapshot {
        self.state_tx.borrow().clone()
    }

    /// Receiver that is notified on every snapshot change.
    pub fn subscribe(&self) -> watch::Receiver<JobSnapshot> {
        self.state_tx.subscribe()
    }

    /// Whether a job is between `start` and its outcome.
    pub fn is_busy(&self) -> bool {
        let state = self.state_tx.borrow().state;
        state != JobState::Idle && !state.is_terminal()
    }
}

/// Caller's view of a started job.
pub struct JobHandle {
    pub job_id: Uuid,
    /// Snapshot updates. Shared with every other subscriber.
    pub updates: watch::Receiver<JobSnapshot>,
    result_rx: oneshot::Receiver<Result<ConversionOutcome>>,
}

impl JobHandle {
    /// Waits for the job to end and returns its outcome.
    pub async fn wait(self) -> Result<ConversionOutcome> {
        self.result_rx.await.unwrap_or_else(|_| {
            Err(ConvertError::conversion_failed(
                None,
                "job task ended unexpectedly",
            ))
        })
    }
}
