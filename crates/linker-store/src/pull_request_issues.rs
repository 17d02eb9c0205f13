use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use linker_core::ids::{IssueId, PullRequestId};
use linker_pipeline::Sink;

use crate::database::Database;
use crate::error::StoreError;
use crate::row_helpers;

pub const TABLE: &str = "pull_request_issues";

/// Cross-domain link between a pull request and the issue it references.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestIssueRow {
    pub pull_request_id: PullRequestId,
    pub issue_id: IssueId,
    pub pull_request_key: i64,
    pub issue_key: String,
}

const UPSERT_SQL: &str = "
INSERT INTO pull_request_issues
    (pull_request_id, issue_id, pull_request_key, issue_key, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?5)
ON CONFLICT (pull_request_id, issue_id) DO UPDATE SET
    pull_request_key = excluded.pull_request_key,
    issue_key = excluded.issue_key,
    updated_at = excluded.updated_at";

pub struct PullRequestIssueRepo {
    db: Database,
}

impl PullRequestIssueRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// All links, ordered by pull request then issue.
    #[instrument(skip(self))]
    pub fn list(&self) -> Result<Vec<PullRequestIssueRow>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT pull_request_id, issue_id, pull_request_key, issue_key
                 FROM pull_request_issues ORDER BY pull_request_id, issue_id",
            )?;
            let mut rows = stmt.query([])?;
            let mut results = Vec::new();
            while let Some(row) = rows.next()? {
                results.push(row_to_link(row)?);
            }
            Ok(results)
        })
    }

    #[instrument(skip(self), fields(pull_request_id = %id))]
    pub fn list_for_pull_request(
        &self,
        id: &PullRequestId,
    ) -> Result<Vec<PullRequestIssueRow>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT pull_request_id, issue_id, pull_request_key, issue_key
                 FROM pull_request_issues WHERE pull_request_id = ?1 ORDER BY issue_id",
            )?;
            let mut rows = stmt.query([id.as_str()])?;
            let mut results = Vec::new();
            while let Some(row) = rows.next()? {
                results.push(row_to_link(row)?);
            }
            Ok(results)
        })
    }

    pub fn count(&self) -> Result<i64, StoreError> {
        self.db.with_conn(|conn| {
            conn.query_row("SELECT COUNT(*) FROM pull_request_issues", [], |row| row.get(0))
                .map_err(StoreError::from)
        })
    }
}

/// Batch writer for pull request/issue links.
///
/// Each batch is upserted in one transaction: either every row lands or
/// none does. Re-linking an existing pair refreshes its keys and
/// `updated_at` and keeps `created_at`.
pub struct PullRequestIssueWriter {
    db: Database,
}

impl PullRequestIssueWriter {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl Sink for PullRequestIssueWriter {
    type Record = PullRequestIssueRow;
    type Error = StoreError;

    #[instrument(skip_all, fields(rows = batch.len()))]
    fn persist(&mut self, batch: &[PullRequestIssueRow]) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }
        let now = Utc::now().to_rfc3339();
        self.db.with_tx(|tx| {
            let mut stmt = tx.prepare_cached(UPSERT_SQL)?;
            for link in batch {
                stmt.execute(rusqlite::params![
                    link.pull_request_id.as_str(),
                    link.issue_id.as_str(),
                    link.pull_request_key,
                    link.issue_key,
                    now,
                ])?;
            }
            Ok(())
        })?;
        debug!(rows = batch.len(), "upserted pull request issues");
        Ok(())
    }
}

fn row_to_link(row: &rusqlite::Row<'_>) -> Result<PullRequestIssueRow, StoreError> {
    Ok(PullRequestIssueRow {
        pull_request_id: row_helpers::get_id(row, 0, TABLE, "pull_request_id")?,
        issue_id: row_helpers::get_id(row, 1, TABLE, "issue_id")?,
        pull_request_key: row_helpers::get(row, 2, TABLE, "pull_request_key")?,
        issue_key: row_helpers::get(row, 3, TABLE, "issue_key")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(pr: &str, issue: &str, key: &str) -> PullRequestIssueRow {
        PullRequestIssueRow {
            pull_request_id: PullRequestId::from_raw(pr),
            issue_id: IssueId::from_raw(issue),
            pull_request_key: 1,
            issue_key: key.into(),
        }
    }

    fn timestamps(db: &Database, pr: &str) -> (String, String) {
        db.with_conn(|conn| {
            conn.query_row(
                "SELECT created_at, updated_at FROM pull_request_issues WHERE pull_request_id = ?1",
                [pr],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map_err(StoreError::from)
        })
        .unwrap()
    }

    #[test]
    fn persist_writes_batch() {
        let db = Database::in_memory().unwrap();
        let mut writer = PullRequestIssueWriter::new(db.clone());
        writer
            .persist(&[link("pr_1", "is_1", "1"), link("pr_2", "is_2", "2")])
            .unwrap();

        let repo = PullRequestIssueRepo::new(db);
        assert_eq!(repo.count().unwrap(), 2);
        let all = repo.list().unwrap();
        assert_eq!(all[0].pull_request_id.as_str(), "pr_1");
        assert_eq!(all[1].issue_key, "2");
    }

    #[test]
    fn empty_batch_is_noop() {
        let db = Database::in_memory().unwrap();
        let mut writer = PullRequestIssueWriter::new(db.clone());
        writer.persist(&[]).unwrap();
        assert_eq!(PullRequestIssueRepo::new(db).count().unwrap(), 0);
    }

    #[test]
    fn repeated_pair_is_upserted() {
        let db = Database::in_memory().unwrap();
        let mut writer = PullRequestIssueWriter::new(db.clone());
        writer.persist(&[link("pr_1", "is_1", "1")]).unwrap();
        let (created, _) = timestamps(&db, "pr_1");

        writer.persist(&[link("pr_1", "is_1", "01")]).unwrap();
        let repo = PullRequestIssueRepo::new(db.clone());
        assert_eq!(repo.count().unwrap(), 1);
        assert_eq!(repo.list().unwrap()[0].issue_key, "01");
        let (created_again, updated) = timestamps(&db, "pr_1");
        assert_eq!(created, created_again);
        assert!(updated >= created);
    }

    #[test]
    fn same_pull_request_can_link_several_issues() {
        let db = Database::in_memory().unwrap();
        let mut writer = PullRequestIssueWriter::new(db.clone());
        writer
            .persist(&[link("pr_1", "is_2", "2"), link("pr_1", "is_1", "1")])
            .unwrap();
        let links = PullRequestIssueRepo::new(db)
            .list_for_pull_request(&PullRequestId::from_raw("pr_1"))
            .unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].issue_id.as_str(), "is_1");
    }

    #[test]
    fn failing_row_rolls_back_whole_batch() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            conn.execute_batch(
                "CREATE TRIGGER reject_poison BEFORE INSERT ON pull_request_issues
                 WHEN NEW.issue_key = 'poison'
                 BEGIN SELECT RAISE(ABORT, 'poisoned row'); END;",
            )?;
            Ok(())
        })
        .unwrap();

        let mut writer = PullRequestIssueWriter::new(db.clone());
        let err = writer
            .persist(&[link("pr_1", "is_1", "1"), link("pr_2", "is_2", "poison")])
            .unwrap_err();
        assert!(err.to_string().contains("poisoned row"), "got: {err}");
        assert_eq!(PullRequestIssueRepo::new(db).count().unwrap(), 0);
    }
}
