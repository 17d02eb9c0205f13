use regex::Regex;
use tracing::{debug, instrument};

use linker_core::DomainType;
use linker_pipeline::{EnrichSummary, EnricherArgs, Lookup, LookupSource, StreamingEnricher};
use linker_store::{
    issues, pull_request_issues, pull_requests, IssueRepo, IssueRow, PullRequestIssueRow,
    PullRequestIssueWriter, PullRequestRepo, PullRequestRow,
};

use crate::context::TaskContext;
use crate::error::TaskError;
use crate::meta::SubTaskMeta;
use crate::options::TaskData;

pub static LINK_PR_TO_ISSUE_META: SubTaskMeta = SubTaskMeta {
    name: "LinkPrToIssue",
    description: "Try to link pull requests to issues, according to pull requests' title and description",
    enabled_by_default: true,
    dependency_tables: &[pull_requests::TABLE, issues::TABLE],
    domain_types: &[DomainType::Code, DomainType::Ticket, DomainType::Cross],
    product_tables: &[pull_request_issues::TABLE],
    entry_point: link_pr_to_issue,
};

/// Strip every `#` and surrounding whitespace from a matched reference.
pub fn normalize_issue_key(issue_key: &str) -> String {
    issue_key.replace('#', "").trim().to_string()
}

/// First pattern match in the title, else in the description, normalized.
///
/// An empty match counts as no match. Only the first text with a non-empty
/// match is consulted, even if that match normalizes to nothing.
pub fn find_issue_key(pattern: &Regex, pull_request: &PullRequestRow) -> Option<String> {
    let raw = [&pull_request.title, &pull_request.description]
        .into_iter()
        .find_map(|text| pattern.find(text).filter(|m| !m.as_str().is_empty()))?;
    let key = normalize_issue_key(raw.as_str());
    (!key.is_empty()).then_some(key)
}

/// Derive the link row for one pull request, if it references a known issue.
///
/// An unknown key yields no row. Any other lookup failure is returned.
pub fn link_pull_request<L>(
    pattern: &Regex,
    issues: &L,
    pull_request: &PullRequestRow,
) -> Result<Vec<PullRequestIssueRow>, L::Error>
where
    L: LookupSource<str, Entity = IssueRow>,
{
    let Some(issue_key) = find_issue_key(pattern, pull_request) else {
        return Ok(Vec::new());
    };

    match issues.find(&issue_key)? {
        Lookup::Found(issue) => Ok(vec![PullRequestIssueRow {
            pull_request_id: pull_request.id.clone(),
            issue_id: issue.id,
            pull_request_key: pull_request.pull_request_key,
            issue_key,
        }]),
        Lookup::NotFound => {
            debug!(pull_request = %pull_request.id, %issue_key, "referenced issue not found");
            Ok(Vec::new())
        }
    }
}

/// Link every pull request of the configured project to the issue its title
/// or description references.
#[instrument(skip_all, fields(project = %data.options.project_name))]
pub fn link_pr_to_issue(ctx: &TaskContext, data: &TaskData) -> Result<EnrichSummary, TaskError> {
    let cursor = PullRequestRepo::new(ctx.db.clone())
        .cursor_for_project(&data.options.project_name, ctx.page_size)?;
    let issues = IssueRepo::new(ctx.db.clone());
    let pattern = &data.pr_to_issue_regexp;

    let enricher = StreamingEnricher::new(EnricherArgs {
        name: pull_requests::TABLE.to_string(),
        input: cursor,
        enrich: |pull_request: &PullRequestRow| link_pull_request(pattern, &issues, pull_request),
        sink: PullRequestIssueWriter::new(ctx.db.clone()),
        batch_size: Some(ctx.batch_size),
        context: Some(ctx.enrich_context()),
    })?;

    Ok(enricher.execute()?)
}
