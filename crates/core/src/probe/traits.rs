//! Trait definitions for the probe module.

use async_trait::async_trait;
use std::path::Path;

use super::types::ProbedCodecs;
use crate::error::Result;

/// Something that can tell which codecs a media file carries.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Returns the name of this prober implementation.
    fn name(&self) -> &str;

    /// Detects the primary video and audio codecs of `path`.
    ///
    /// Must not modify the file. Fails with `ProbeFailed` when no video
    /// stream is found and `ToolNotFound` when the backing tool is missing.
    async fn probe(&self, path: &Path) -> Result<ProbedCodecs>;
}
