use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use linker_core::ids::{PullRequestId, RepoId};
use linker_pipeline::{CursorSource, SourceRecord};

use crate::database::Database;
use crate::error::StoreError;
use crate::project_mapping::CICD_SCOPES;
use crate::row_helpers;

pub const TABLE: &str = "pull_requests";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRow {
    pub id: PullRequestId,
    pub base_repo_id: RepoId,
    pub pull_request_key: i64,
    pub title: String,
    pub description: String,
}

impl SourceRecord for PullRequestRow {
    fn identity(&self) -> String {
        format!("{} (#{})", self.id, self.pull_request_key)
    }
}

pub struct PullRequestRepo {
    db: Database,
}

impl PullRequestRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    #[instrument(skip(self, pr), fields(pull_request_id = %pr.id))]
    pub fn insert(&self, pr: &PullRequestRow) -> Result<(), StoreError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO pull_requests (id, base_repo_id, pull_request_key, title, description)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    pr.id.as_str(),
                    pr.base_repo_id.as_str(),
                    pr.pull_request_key,
                    pr.title,
                    pr.description,
                ],
            )?;
            Ok(())
        })
    }

    #[instrument(skip(self), fields(pull_request_id = %id))]
    pub fn get(&self, id: &PullRequestId) -> Result<PullRequestRow, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, base_repo_id, pull_request_key, title, description
                 FROM pull_requests WHERE id = ?1",
            )?;
            let mut rows = stmt.query([id.as_str()])?;
            match rows.next()? {
                Some(row) => row_to_pull_request(row),
                None => Err(StoreError::NotFound(format!("pull request {id}"))),
            }
        })
    }

    /// Open a cursor over the pull requests whose base repo is mapped to
    /// `project_name`, ordered by id.
    #[instrument(skip(self))]
    pub fn cursor_for_project(
        &self,
        project_name: &str,
        page_size: usize,
    ) -> Result<PullRequestCursor, StoreError> {
        if page_size == 0 {
            return Err(StoreError::InvalidArgument(
                "cursor page size must be positive".into(),
            ));
        }
        // SQLite reads a negative LIMIT as "no limit".
        let limit = i64::try_from(page_size).map_err(|_| {
            StoreError::InvalidArgument(format!("cursor page size {page_size} exceeds i64::MAX"))
        })?;
        Ok(PullRequestCursor {
            db: self.db.clone(),
            project_name: project_name.to_string(),
            page_size,
            limit,
            last_id: None,
            page: VecDeque::with_capacity(page_size.min(MAX_PREALLOC)),
            exhausted: false,
            closed: false,
        })
    }
}

/// Upper bound on rows reserved up front for a page buffer.
const MAX_PREALLOC: usize = 4096;

const PAGE_SQL: &str = "
SELECT pr.id, pr.base_repo_id, pr.pull_request_key, pr.title, pr.description
FROM pull_requests pr
JOIN project_mapping pm ON pm.\"table\" = ?1 AND pm.row_id = pr.base_repo_id
WHERE pm.project_name = ?2 AND (?3 IS NULL OR pr.id > ?3)
ORDER BY pr.id
LIMIT ?4";

/// Forward-only cursor over a project's pull requests.
///
/// Rows are fetched in keyset pages (`id > last seen id`), so at most
/// `page_size` rows are held at once and the connection lock is only taken
/// while a page is read.
pub struct PullRequestCursor {
    db: Database,
    project_name: String,
    page_size: usize,
    limit: i64,
    last_id: Option<String>,
    page: VecDeque<PullRequestRow>,
    exhausted: bool,
    closed: bool,
}

impl PullRequestCursor {
    fn fetch_page(&mut self) -> Result<(), StoreError> {
        let rows = self.db.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(PAGE_SQL)?;
            let mut rows = stmt.query(rusqlite::params![
                CICD_SCOPES,
                self.project_name,
                self.last_id,
                self.limit,
            ])?;
            let mut page = Vec::with_capacity(self.page_size.min(MAX_PREALLOC));
            while let Some(row) = rows.next()? {
                page.push(row_to_pull_request(row)?);
            }
            Ok(page)
        })?;

        self.exhausted = rows.len() < self.page_size;
        if let Some(last) = rows.last() {
            self.last_id = Some(last.id.as_str().to_string());
        }
        debug!(
            project = %self.project_name,
            rows = rows.len(),
            exhausted = self.exhausted,
            "fetched pull request page"
        );
        self.page.extend(rows);
        Ok(())
    }
}

impl CursorSource for PullRequestCursor {
    type Record = PullRequestRow;
    type Error = StoreError;

    fn next(&mut self) -> Result<Option<PullRequestRow>, StoreError> {
        if self.closed {
            return Err(StoreError::CursorClosed(TABLE));
        }
        if self.page.is_empty() && !self.exhausted {
            self.fetch_page()?;
        }
        Ok(self.page.pop_front())
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.page.clear();
            debug!(project = %self.project_name, "pull request cursor closed");
        }
    }
}

fn row_to_pull_request(row: &rusqlite::Row<'_>) -> Result<PullRequestRow, StoreError> {
    Ok(PullRequestRow {
        id: row_helpers::get_id(row, 0, TABLE, "id")?,
        base_repo_id: row_helpers::get_id(row, 1, TABLE, "base_repo_id")?,
        pull_request_key: row_helpers::get(row, 2, TABLE, "pull_request_key")?,
        title: row_helpers::get(row, 3, TABLE, "title")?,
        description: row_helpers::get(row, 4, TABLE, "description")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project_mapping::ProjectMappingRepo;

    fn pr(id: &str, repo: &str, key: i64) -> PullRequestRow {
        PullRequestRow {
            id: PullRequestId::from_raw(id),
            base_repo_id: RepoId::from_raw(repo),
            pull_request_key: key,
            title: format!("pr {key}"),
            description: String::new(),
        }
    }

    fn seeded() -> (Database, PullRequestRepo) {
        let db = Database::in_memory().unwrap();
        let repo = PullRequestRepo::new(db.clone());
        let mapping = ProjectMappingRepo::new(db.clone());
        mapping.insert("platform", CICD_SCOPES, "repo_a").unwrap();
        mapping.insert("platform", CICD_SCOPES, "repo_b").unwrap();
        mapping.insert("other", CICD_SCOPES, "repo_c").unwrap();
        // Mapped under a different scope table: must not match.
        mapping.insert("platform", "boards", "repo_d").unwrap();

        repo.insert(&pr("pr_05", "repo_a", 5)).unwrap();
        repo.insert(&pr("pr_01", "repo_b", 1)).unwrap();
        repo.insert(&pr("pr_03", "repo_a", 3)).unwrap();
        repo.insert(&pr("pr_02", "repo_c", 2)).unwrap();
        repo.insert(&pr("pr_04", "repo_d", 4)).unwrap();
        (db, repo)
    }

    fn drain(cursor: &mut PullRequestCursor) -> Vec<String> {
        let mut ids = Vec::new();
        while let Some(row) = cursor.next().unwrap() {
            ids.push(row.id.as_str().to_string());
        }
        ids
    }

    #[test]
    fn insert_and_get() {
        let (_db, repo) = seeded();
        let row = repo.get(&PullRequestId::from_raw("pr_03")).unwrap();
        assert_eq!(row.pull_request_key, 3);
        assert_eq!(row.base_repo_id.as_str(), "repo_a");
    }

    #[test]
    fn get_missing_is_not_found() {
        let (_db, repo) = seeded();
        let err = repo.get(&PullRequestId::from_raw("pr_99")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn cursor_filters_by_project_in_id_order() {
        let (_db, repo) = seeded();
        let mut cursor = repo.cursor_for_project("platform", 10).unwrap();
        assert_eq!(drain(&mut cursor), vec!["pr_01", "pr_03", "pr_05"]);
    }

    #[test]
    fn cursor_pages_across_boundaries() {
        let (_db, repo) = seeded();
        for page_size in 1..=4 {
            let mut cursor = repo.cursor_for_project("platform", page_size).unwrap();
            assert_eq!(drain(&mut cursor), vec!["pr_01", "pr_03", "pr_05"], "page size {page_size}");
        }
    }

    #[test]
    fn cursor_holds_at_most_one_page() {
        let (_db, repo) = seeded();
        let mut cursor = repo.cursor_for_project("platform", 2).unwrap();
        cursor.next().unwrap();
        assert!(cursor.page.len() < 2);
        cursor.next().unwrap();
        cursor.next().unwrap();
        assert!(cursor.page.len() <= 2);
    }

    #[test]
    fn cursor_for_unknown_project_is_empty() {
        let (_db, repo) = seeded();
        let mut cursor = repo.cursor_for_project("nope", 10).unwrap();
        assert!(cursor.next().unwrap().is_none());
    }

    #[test]
    fn next_after_close_fails_and_close_is_idempotent() {
        let (_db, repo) = seeded();
        let mut cursor = repo.cursor_for_project("platform", 10).unwrap();
        assert!(cursor.next().unwrap().is_some());
        cursor.close();
        cursor.close();
        assert!(matches!(cursor.next(), Err(StoreError::CursorClosed("pull_requests"))));
    }

    #[test]
    fn zero_page_size_rejected() {
        let (_db, repo) = seeded();
        assert!(matches!(
            repo.cursor_for_project("platform", 0),
            Err(StoreError::InvalidArgument(_))
        ));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn page_size_beyond_sql_limit_rejected() {
        let (_db, repo) = seeded();
        let err = repo.cursor_for_project("platform", usize::MAX).err().unwrap();
        assert!(matches!(err, StoreError::InvalidArgument(ref msg) if msg.contains("exceeds")));

        let largest = usize::try_from(i64::MAX).unwrap();
        let mut cursor = repo.cursor_for_project("platform", largest).unwrap();
        assert_eq!(drain(&mut cursor), vec!["pr_01", "pr_03", "pr_05"]);
    }

    #[test]
    fn identity_names_id_and_key() {
        assert_eq!(pr("pr_7", "repo_a", 7).identity(), "pr_7 (#7)");
    }
}
