use serde::{Deserialize, Serialize};
use tracing::instrument;

use linker_core::ids::IssueId;
use linker_pipeline::{Lookup, LookupResultExt, LookupSource};

use crate::database::Database;
use crate::error::StoreError;
use crate::row_helpers;

pub const TABLE: &str = "issues";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRow {
    pub id: IssueId,
    pub issue_key: String,
    pub title: String,
}

#[derive(Clone)]
pub struct IssueRepo {
    db: Database,
}

impl IssueRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    #[instrument(skip(self, issue), fields(issue_id = %issue.id))]
    pub fn insert(&self, issue: &IssueRow) -> Result<(), StoreError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO issues (id, issue_key, title) VALUES (?1, ?2, ?3)",
                rusqlite::params![issue.id.as_str(), issue.issue_key, issue.title],
            )?;
            Ok(())
        })
    }

    /// First issue (by id) carrying the given key.
    #[instrument(skip(self))]
    pub fn find_by_key(&self, issue_key: &str) -> Result<IssueRow, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT id, issue_key, title FROM issues WHERE issue_key = ?1 ORDER BY id LIMIT 1",
            )?;
            let mut rows = stmt.query([issue_key])?;
            match rows.next()? {
                Some(row) => row_to_issue(row),
                None => Err(StoreError::NotFound(format!("issue with key {issue_key}"))),
            }
        })
    }
}

impl LookupSource<str> for IssueRepo {
    type Entity = IssueRow;
    type Error = StoreError;

    fn find(&self, key: &str) -> Result<Lookup<IssueRow>, StoreError> {
        self.find_by_key(key).found()
    }
}

fn row_to_issue(row: &rusqlite::Row<'_>) -> Result<IssueRow, StoreError> {
    Ok(IssueRow {
        id: row_helpers::get_id(row, 0, TABLE, "id")?,
        issue_key: row_helpers::get(row, 1, TABLE, "issue_key")?,
        title: row_helpers::get(row, 2, TABLE, "title")?,
    })
}
