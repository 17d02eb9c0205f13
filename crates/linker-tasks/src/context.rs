use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use linker_pipeline::{
    EnrichContext, ProgressObserver, DEFAULT_BATCH_SIZE, DEFAULT_PROGRESS_INTERVAL,
};
use linker_store::Database;

pub const DEFAULT_PAGE_SIZE: usize = 500;

/// Shared handles and tuning for one sub-task run.
#[derive(Clone)]
pub struct TaskContext {
    pub db: Database,
    pub cancel: CancellationToken,
    pub progress: Option<Arc<dyn ProgressObserver>>,
    pub batch_size: usize,
    pub page_size: usize,
    pub progress_interval: u64,
}

impl TaskContext {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            cancel: CancellationToken::new(),
            progress: None,
            batch_size: DEFAULT_BATCH_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_progress(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.progress = Some(observer);
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }

    pub(crate) fn enrich_context(&self) -> EnrichContext {
        let ctx = EnrichContext::new(self.cancel.clone())
            .with_progress_interval(self.progress_interval);
        match &self.progress {
            Some(observer) => ctx.with_progress(Arc::clone(observer)),
            None => ctx,
        }
    }
}
