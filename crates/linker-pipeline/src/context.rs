use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::progress::{ProgressObserver, DEFAULT_PROGRESS_INTERVAL};

/// Cancellation and progress plumbing for one pipeline run.
#[derive(Clone)]
pub struct EnrichContext {
    /// Observed between source records, never mid-enrichment.
    pub cancel: CancellationToken,
    pub progress: Option<Arc<dyn ProgressObserver>>,
    /// Source records between two progress reports.
    pub progress_interval: u64,
}

impl EnrichContext {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            ..Self::default()
        }
    }

    pub fn with_progress(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.progress = Some(observer);
        self
    }

    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }
}

impl Default for EnrichContext {
    fn default() -> Self {
        Self {
            cancel: CancellationToken::new(),
            progress: None,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl std::fmt::Debug for EnrichContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnrichContext")
            .field("cancelled", &self.cancel.is_cancelled())
            .field("has_progress", &self.progress.is_some())
            .field("progress_interval", &self.progress_interval)
            .finish()
    }
}
