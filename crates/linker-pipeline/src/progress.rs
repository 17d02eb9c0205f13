use tracing::info;

/// Report every this many source records unless the context says otherwise.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 1000;

/// Receives the running count of processed source records.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, entity: &str, processed: u64);
}

impl<F> ProgressObserver for F
where
    F: Fn(&str, u64) + Send + Sync,
{
    fn on_progress(&self, entity: &str, processed: u64) {
        self(entity, processed);
    }
}

/// Counts processed records and reports at a fixed cadence.
pub(crate) struct ProgressTicker<'a> {
    entity: &'a str,
    interval: u64,
    processed: u64,
    last_reported: u64,
    observer: Option<&'a dyn ProgressObserver>,
}

impl<'a> ProgressTicker<'a> {
    pub(crate) fn new(
        entity: &'a str,
        interval: u64,
        observer: Option<&'a dyn ProgressObserver>,
    ) -> Self {
        Self {
            entity,
            interval,
            processed: 0,
            last_reported: 0,
            observer,
        }
    }

    pub(crate) fn tick(&mut self) {
        self.processed += 1;
        if self.processed % self.interval == 0 {
            self.report();
        }
    }

    /// Report the final count if the last tick didn't land on the cadence.
    pub(crate) fn finish(&mut self) {
        if self.processed != self.last_reported {
            self.report();
        }
    }

    fn report(&mut self) {
        self.last_reported = self.processed;
        info!(entity = self.entity, processed = self.processed, "enrichment progress");
        if let Some(observer) = self.observer {
            observer.on_progress(self.entity, self.processed);
        }
    }
}
