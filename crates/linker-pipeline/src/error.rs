use std::fmt;

/// Boxed error carried from a collaborator (cursor, enrichment function, sink).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Pipeline stage an error originated from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Config,
    Read,
    Enrich,
    Persist,
    Cancelled,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config => write!(f, "config"),
            Self::Read => write!(f, "read"),
            Self::Enrich => write!(f, "enrich"),
            Self::Persist => write!(f, "persist"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Fatal outcome of a pipeline run. Every variant aborts the whole run.
#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
    #[error("invalid enricher config: {0}")]
    Config(String),

    #[error("{entity}: failed to read record #{position}: {source}")]
    SourceRead {
        entity: String,
        position: u64,
        #[source]
        source: BoxError,
    },

    #[error("{entity}: enrichment failed on record #{position} ({record}): {source}")]
    Enrichment {
        entity: String,
        position: u64,
        record: String,
        #[source]
        source: BoxError,
    },

    #[error("{entity}: failed to persist batch #{batch} ({records} records): {source}")]
    Persistence {
        entity: String,
        batch: u64,
        records: usize,
        #[source]
        source: BoxError,
    },

    #[error("{entity}: cancelled after {processed} records")]
    Cancelled { entity: String, processed: u64 },
}

impl EnrichError {
    pub fn stage(&self) -> Stage {
        match self {
            Self::Config(_) => Stage::Config,
            Self::SourceRead { .. } => Stage::Read,
            Self::Enrichment { .. } => Stage::Enrich,
            Self::Persistence { .. } => Stage::Persist,
            Self::Cancelled { .. } => Stage::Cancelled,
        }
    }

    /// Short classification string for logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config_error",
            Self::SourceRead { .. } => "source_read_error",
            Self::Enrichment { .. } => "enrichment_error",
            Self::Persistence { .. } => "persistence_error",
            Self::Cancelled { .. } => "cancelled",
        }
    }

    /// 1-based position of the source record involved, when there is one.
    pub fn position(&self) -> Option<u64> {
        match self {
            Self::SourceRead { position, .. } | Self::Enrichment { position, .. } => Some(*position),
            _ => None,
        }
    }
}
