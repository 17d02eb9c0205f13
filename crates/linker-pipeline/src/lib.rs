//! # linker-pipeline
//!
//! Streaming record enrichment: read source records one at a time from a
//! [`CursorSource`], map each through an enrichment function into zero or more
//! derived records, and write those to a [`Sink`] in bounded batches.
//!
//! The pipeline never holds more than one source record and one batch of
//! derived records in memory. The cursor is closed exactly once whatever the
//! outcome, and a failure at any stage aborts the run without touching
//! batches that were already persisted.
//!
//! ```ignore
//! let enricher = StreamingEnricher::new(EnricherArgs {
//!     name: "pull_requests".into(),
//!     input: cursor,
//!     enrich: |pr: &PullRequestRow| -> Result<Vec<PullRequestIssueRow>, StoreError> { ... },
//!     sink: writer,
//!     batch_size: Some(500),
//!     context: None,
//! })?;
//! let summary = enricher.execute()?;
//! ```

mod batch;
pub mod context;
pub mod cursor;
pub mod enricher;
pub mod error;
pub mod lookup;
pub mod progress;
pub mod sink;

#[cfg(test)]
mod testing;

pub use context::EnrichContext;
pub use cursor::{CursorGuard, CursorSource, IterCursor, SourceRecord};
pub use enricher::{EnrichSummary, EnricherArgs, StreamingEnricher, DEFAULT_BATCH_SIZE};
pub use error::{BoxError, EnrichError, Stage};
pub use lookup::{IsNotFound, Lookup, LookupResultExt, LookupSource};
pub use progress::{ProgressObserver, DEFAULT_PROGRESS_INTERVAL};
pub use sink::Sink;
