use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::TaskError;

/// Issue references like `#123`.
pub const DEFAULT_PR_TO_ISSUE_REGEXP: &str = r"#\d+";

/// User-facing options for the linker task.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkerOptions {
    pub project_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_to_issue_regexp: Option<String>,
}

/// Options validated and compiled for a run.
#[derive(Clone, Debug)]
pub struct TaskData {
    pub options: LinkerOptions,
    pub pr_to_issue_regexp: Regex,
}

impl TaskData {
    pub fn prepare(mut options: LinkerOptions) -> Result<Self, TaskError> {
        options.project_name = options.project_name.trim().to_string();
        if options.project_name.is_empty() {
            return Err(TaskError::Config("projectName is required".into()));
        }

        let pattern = options
            .pr_to_issue_regexp
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_PR_TO_ISSUE_REGEXP);
        let pr_to_issue_regexp = Regex::new(pattern).map_err(|source| TaskError::InvalidRegex {
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(Self {
            options,
            pr_to_issue_regexp,
        })
    }
}
