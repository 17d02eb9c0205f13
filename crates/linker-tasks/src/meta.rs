use serde::Serialize;

use linker_core::DomainType;
use linker_pipeline::EnrichSummary;

use crate::context::TaskContext;
use crate::error::TaskError;
use crate::link_pr_and_issue::LINK_PR_TO_ISSUE_META;
use crate::options::TaskData;

pub type SubTaskEntryPoint = fn(&TaskContext, &TaskData) -> Result<EnrichSummary, TaskError>;

/// Static description of a sub-task: what it reads, what it writes and how
/// to run it.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubTaskMeta {
    pub name: &'static str,
    pub description: &'static str,
    pub enabled_by_default: bool,
    pub dependency_tables: &'static [&'static str],
    pub domain_types: &'static [DomainType],
    pub product_tables: &'static [&'static str],
    #[serde(skip)]
    pub entry_point: SubTaskEntryPoint,
}

impl SubTaskMeta {
    pub fn run(&self, ctx: &TaskContext, data: &TaskData) -> Result<EnrichSummary, TaskError> {
        (self.entry_point)(ctx, data)
    }
}

static SUBTASKS: [&SubTaskMeta; 1] = [&LINK_PR_TO_ISSUE_META];

/// All registered sub-tasks, in execution order.
pub fn subtasks() -> impl Iterator<Item = &'static SubTaskMeta> {
    SUBTASKS.iter().copied()
}

pub fn find_subtask(name: &str) -> Option<&'static SubTaskMeta> {
    subtasks().find(|meta| meta.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_pr_to_issue_is_registered() {
        let meta = find_subtask("LinkPrToIssue").unwrap();
        assert!(meta.enabled_by_default);
        assert_eq!(meta.dependency_tables, &["pull_requests", "issues"]);
        assert_eq!(
            meta.domain_types,
            &[DomainType::Code, DomainType::Ticket, DomainType::Cross]
        );
        assert_eq!(meta.product_tables, &["pull_request_issues"]);
    }

    #[test]
    fn unknown_subtask_is_none() {
        assert!(find_subtask("linkPrToIssue").is_none());
        assert!(find_subtask("").is_none());
    }

    #[test]
    fn registry_names_are_unique() {
        let mut names: Vec<_> = subtasks().map(|m| m.name).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn meta_serializes_without_entry_point() {
        let json = serde_json::to_value(LINK_PR_TO_ISSUE_META).unwrap();
        assert_eq!(json["name"], "LinkPrToIssue");
        assert_eq!(json["enabledByDefault"], true);
        assert_eq!(json["domainTypes"], serde_json::json!(["CODE", "TICKET", "CROSS"]));
        assert!(json.get("entryPoint").is_none());
    }
}
