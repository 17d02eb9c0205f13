use linker_pipeline::IsNotFound;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("corrupt row in {table}.{column}: {detail}")]
    CorruptRow {
        table: &'static str,
        column: &'static str,
        detail: String,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("cursor over {0} is closed")]
    CursorClosed(&'static str),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl IsNotFound for StoreError {
    fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_not_found_is_not_found() {
        assert!(StoreError::NotFound("issue 1".into()).is_not_found());
        assert!(!StoreError::Database("locked".into()).is_not_found());
        assert!(!StoreError::CursorClosed("pull_requests").is_not_found());
    }

    #[test]
    fn corrupt_row_display() {
        let err = StoreError::CorruptRow {
            table: "issues",
            column: "issue_key",
            detail: "invalid type".into(),
        };
        assert_eq!(err.to_string(), "corrupt row in issues.issue_key: invalid type");
    }

    #[test]
    fn rusqlite_errors_map_to_database() {
        let err: StoreError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, StoreError::Database(_)));
    }
}
