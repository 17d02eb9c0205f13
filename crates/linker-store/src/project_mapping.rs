use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::database::Database;
use crate::error::StoreError;
use crate::row_helpers;

/// `project_mapping.table` value for repositories (CI/CD scopes).
pub const CICD_SCOPES: &str = "cicd_scopes";

const TABLE: &str = "project_mapping";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMappingRow {
    pub project_name: String,
    pub table: String,
    pub row_id: String,
}

/// Which scope rows belong to which project.
pub struct ProjectMappingRepo {
    db: Database,
}

impl ProjectMappingRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Map a row to a project. Mapping the same row twice is a no-op.
    #[instrument(skip(self))]
    pub fn insert(&self, project_name: &str, table: &str, row_id: &str) -> Result<(), StoreError> {
        self.db.with_conn(|conn| {
            conn.execute(
                r#"INSERT OR IGNORE INTO project_mapping (project_name, "table", row_id) VALUES (?1, ?2, ?3)"#,
                rusqlite::params![project_name, table, row_id],
            )?;
            Ok(())
        })
    }

    #[instrument(skip(self))]
    pub fn list_for_project(&self, project_name: &str) -> Result<Vec<ProjectMappingRow>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                r#"SELECT project_name, "table", row_id FROM project_mapping
                   WHERE project_name = ?1 ORDER BY "table", row_id"#,
            )?;
            let mut rows = stmt.query([project_name])?;
            let mut results = Vec::new();
            while let Some(row) = rows.next()? {
                results.push(ProjectMappingRow {
                    project_name: row_helpers::get(row, 0, TABLE, "project_name")?,
                    table: row_helpers::get(row, 1, TABLE, "table")?,
                    row_id: row_helpers::get(row, 2, TABLE, "row_id")?,
                });
            }
            Ok(results)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_list() {
        let repo = ProjectMappingRepo::new(Database::in_memory().unwrap());
        repo.insert("platform", CICD_SCOPES, "github:GithubRepo:1:2").unwrap();
        repo.insert("platform", "boards", "jira:JiraBoard:1:9").unwrap();
        repo.insert("other", CICD_SCOPES, "github:GithubRepo:1:3").unwrap();

        let rows = repo.list_for_project("platform").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].table, "boards");
        assert_eq!(rows[1].row_id, "github:GithubRepo:1:2");
    }

    #[test]
    fn duplicate_mapping_is_ignored() {
        let repo = ProjectMappingRepo::new(Database::in_memory().unwrap());
        repo.insert("platform", CICD_SCOPES, "repo_1").unwrap();
        repo.insert("platform", CICD_SCOPES, "repo_1").unwrap();
        assert_eq!(repo.list_for_project("platform").unwrap().len(), 1);
    }

    #[test]
    fn unknown_project_is_empty() {
        let repo = ProjectMappingRepo::new(Database::in_memory().unwrap());
        assert!(repo.list_for_project("nope").unwrap().is_empty());
    }
}
