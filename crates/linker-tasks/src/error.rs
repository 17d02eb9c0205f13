use linker_pipeline::EnrichError;
use linker_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("invalid task options: {0}")]
    Config(String),

    #[error("invalid issue pattern {pattern:?}: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Enrich(#[from] EnrichError),
}

impl TaskError {
    /// `true` when the run stopped because its token was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Enrich(EnrichError::Cancelled { .. }))
    }
}
