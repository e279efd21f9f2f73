//! Mock prober for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::error::{ConvertError, Result};
use crate::probe::{ProbedCodecs, Prober};

/// Mock implementation of the Prober trait.
///
/// Provides controllable behavior for testing:
/// - Fixed or per-path codec results
/// - One-shot failures
/// - Artificial latency, to hold a job in `Probing`
///
/// # Example
///
/// ```rust,ignore
/// use vidshift_core::testing::MockProber;
///
/// let prober = MockProber::new();
/// prober.set_result(ProbedCodecs::new("hevc", "dts")).await;
///
/// let orchestrator = JobOrchestrator::with_prober(config, Arc::new(prober.clone()));
/// ```
#[derive(Debug, Clone)]
pub struct MockProber {
    /// Paths probed so far, in order.
    probes: Arc<RwLock<Vec<PathBuf>>>,
    /// Result for paths without a specific entry.
    default_result: Arc<RwLock<ProbedCodecs>>,
    /// Results by path.
    results: Arc<RwLock<HashMap<PathBuf, ProbedCodecs>>>,
    /// If set, the next probe fails with this error.
    next_error: Arc<RwLock<Option<ConvertError>>>,
    /// Simulated probe time.
    delay: Arc<RwLock<Duration>>,
}

impl Default for MockProber {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProber {
    /// Mock reporting H.264 video with AAC audio for every file.
    pub fn new() -> Self {
        Self {
            probes: Arc::new(RwLock::new(Vec::new())),
            default_result: Arc::new(RwLock::new(ProbedCodecs::new("h264", "aac"))),
            results: Arc::new(RwLock::new(HashMap::new())),
            next_error: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
        }
    }

    /// Set the result for every path without its own entry.
    pub async fn set_result(&self, codecs: ProbedCodecs) {
        *self.default_result.write().await = codecs;
    }

    /// Set the result for a specific path.
    pub async fn set_result_for(&self, path: impl AsRef<Path>, codecs: ProbedCodecs) {
        self.results
            .write()
            .await
            .insert(path.as_ref().to_path_buf(), codecs);
    }

    /// Configure the next probe to fail with the given error.
    pub async fn set_next_error(&self, error: ConvertError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// Paths probed so far.
    pub async fn recorded_probes(&self) -> Vec<PathBuf> {
        self.probes.read().await.clone()
    }

    pub async fn probe_count(&self) -> usize {
        self.probes.read().await.len()
    }
}

#[async_trait]
impl Prober for MockProber {
    fn name(&self) -> &str {
        "mock"
    }

    async fn probe(&self, path: &Path) -> Result<ProbedCodecs> {
        self.probes.write().await.push(path.to_path_buf());

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        if let Some(codecs) = self.results.read().await.get(path) {
            return Ok(codecs.clone());
        }
        Ok(self.default_result.read().await.clone())
    }
}
