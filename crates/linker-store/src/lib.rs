pub mod database;
pub mod error;
pub mod issues;
pub mod project_mapping;
pub mod pull_request_issues;
pub mod pull_requests;
pub mod row_helpers;
pub mod schema;

pub use database::Database;
pub use error::StoreError;
pub use issues::{IssueRepo, IssueRow};
pub use project_mapping::{ProjectMappingRepo, ProjectMappingRow};
pub use pull_request_issues::{PullRequestIssueRepo, PullRequestIssueRow, PullRequestIssueWriter};
pub use pull_requests::{PullRequestCursor, PullRequestRepo, PullRequestRow};
