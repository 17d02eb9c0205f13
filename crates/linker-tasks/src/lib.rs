//! # linker-tasks
//!
//! Sub-tasks that derive cross-domain rows from collected data. Each one is
//! described by a [`SubTaskMeta`] and found through [`subtasks`] /
//! [`find_subtask`].

pub mod context;
pub mod error;
pub mod link_pr_and_issue;
pub mod meta;
pub mod options;

pub use context::{TaskContext, DEFAULT_PAGE_SIZE};
pub use error::TaskError;
pub use link_pr_and_issue::{link_pr_to_issue, normalize_issue_key, LINK_PR_TO_ISSUE_META};
pub use meta::{find_subtask, subtasks, SubTaskEntryPoint, SubTaskMeta};
pub use options::{LinkerOptions, TaskData, DEFAULT_PR_TO_ISSUE_REGEXP};
