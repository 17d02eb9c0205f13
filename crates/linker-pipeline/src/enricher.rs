use std::marker::PhantomData;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::batch::Batch;
use crate::context::EnrichContext;
use crate::cursor::{CursorGuard, CursorSource, SourceRecord};
use crate::error::{BoxError, EnrichError};
use crate::progress::ProgressTicker;
use crate::sink::Sink;

pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Everything a [`StreamingEnricher`] is built from.
pub struct EnricherArgs<C, K, F> {
    /// Entity being enriched, used in logs, progress and errors.
    pub name: String,
    pub input: C,
    pub enrich: F,
    pub sink: K,
    /// Max derived records per `persist` call. Defaults to [`DEFAULT_BATCH_SIZE`].
    pub batch_size: Option<usize>,
    pub context: Option<EnrichContext>,
}

/// Counters for a successful run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EnrichSummary {
    pub records_read: u64,
    pub derived_persisted: u64,
    pub batches_flushed: u64,
}

/// Drives cursor -> enrichment function -> batch -> sink for one run.
///
/// Owns the cursor from construction on: if validation fails in [`new`] or
/// the run ends any way at all, the cursor is closed exactly once.
///
/// [`new`]: StreamingEnricher::new
pub struct StreamingEnricher<C, K, F, E>
where
    C: CursorSource,
{
    name: String,
    cursor: CursorGuard<C>,
    enrich: F,
    sink: K,
    batch_size: usize,
    ctx: EnrichContext,
    _error: PhantomData<fn() -> E>,
}

impl<C, K, F, E> StreamingEnricher<C, K, F, E>
where
    C: CursorSource,
    C::Record: SourceRecord,
    K: Sink,
    F: FnMut(&C::Record) -> Result<Vec<K::Record>, E>,
    E: Into<BoxError>,
{
    pub fn new(args: EnricherArgs<C, K, F>) -> Result<Self, EnrichError> {
        let cursor = CursorGuard::new(args.input);

        let name = args.name.trim().to_string();
        if name.is_empty() {
            return Err(EnrichError::Config("entity name must not be empty".into()));
        }

        let batch_size = args.batch_size.unwrap_or(DEFAULT_BATCH_SIZE);
        if batch_size == 0 {
            return Err(EnrichError::Config(format!(
                "{name}: batch size must be positive"
            )));
        }

        let ctx = args.context.unwrap_or_default();
        if ctx.progress_interval == 0 {
            return Err(EnrichError::Config(format!(
                "{name}: progress interval must be positive"
            )));
        }

        Ok(Self {
            name,
            cursor,
            enrich: args.enrich,
            sink: args.sink,
            batch_size,
            ctx,
            _error: PhantomData,
        })
    }

    /// Run the pipeline to completion, consuming the enricher.
    #[instrument(skip_all, fields(entity = %self.name, batch_size = self.batch_size))]
    pub fn execute(self) -> Result<EnrichSummary, EnrichError> {
        let Self {
            name,
            mut cursor,
            mut enrich,
            mut sink,
            batch_size,
            ctx,
            ..
        } = self;

        let mut batch = Batch::new(batch_size);
        let mut summary = EnrichSummary::default();
        let mut progress =
            ProgressTicker::new(&name, ctx.progress_interval, ctx.progress.as_deref());

        let outcome = 'read: loop {
            if ctx.cancel.is_cancelled() {
                break Err(EnrichError::Cancelled {
                    entity: name.clone(),
                    processed: summary.records_read,
                });
            }

            let position = summary.records_read + 1;
            let record = match cursor.next() {
                Ok(Some(record)) => record,
                Ok(None) => break Ok(()),
                Err(e) => {
                    break Err(EnrichError::SourceRead {
                        entity: name.clone(),
                        position,
                        source: Box::new(e),
                    })
                }
            };
            summary.records_read = position;

            let derived = match enrich(&record) {
                Ok(derived) => derived,
                Err(e) => {
                    break Err(EnrichError::Enrichment {
                        entity: name.clone(),
                        position,
                        record: record.identity(),
                        source: e.into(),
                    })
                }
            };

            for item in derived {
                if batch.push(item) {
                    if let Err(e) = flush(&name, &mut batch, &mut sink, &mut summary) {
                        break 'read Err(e);
                    }
                }
            }
            progress.tick();
        };

        let outcome = outcome.and_then(|()| {
            if batch.is_empty() {
                Ok(())
            } else {
                flush(&name, &mut batch, &mut sink, &mut summary)
            }
        });

        progress.finish();
        drop(cursor);

        match outcome {
            Ok(()) => {
                info!(
                    records_read = summary.records_read,
                    derived_persisted = summary.derived_persisted,
                    batches_flushed = summary.batches_flushed,
                    "enrichment finished"
                );
                Ok(summary)
            }
            Err(e) => {
                warn!(
                    stage = %e.stage(),
                    kind = e.error_kind(),
                    records_read = summary.records_read,
                    batches_flushed = summary.batches_flushed,
                    error = %e,
                    "enrichment aborted"
                );
                Err(e)
            }
        }
    }
}

fn flush<K: Sink>(
    entity: &str,
    batch: &mut Batch<K::Record>,
    sink: &mut K,
    summary: &mut EnrichSummary,
) -> Result<(), EnrichError> {
    let number = summary.batches_flushed + 1;
    let records = batch.len();
    batch
        .flush_into(sink)
        .map_err(|e| EnrichError::Persistence {
            entity: entity.to_string(),
            batch: number,
            records,
            source: Box::new(e),
        })?;
    summary.batches_flushed = number;
    summary.derived_persisted += records as u64;
    debug!(entity, batch = number, records, "flushed batch");
    Ok(())
}
