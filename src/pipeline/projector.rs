use chrono::{DateTime, Local, Utc};

use crate::azure::types::{PullRequest, Reviewer};

use super::locale::{format_timestamp, Locale};
use super::reviewers::{filter_reviewers, sort_reviewers};
use super::sla::{calculate_sla, severity, Severity, Sla};
use super::title::{validate_title, TitleError};

/// Inputs shared by every projected row of one list.
#[derive(Debug, Clone)]
pub struct ProjectionContext<'a> {
    pub organization: &'a str,
    pub project: &'a str,
    pub excluded_reviewers: &'a [String],
    pub locale: Locale,
    /// End of the SLA interval for PRs that are still open
    pub now: DateTime<Utc>,
}

/// Render-ready view of one pull request. Rebuilt on every query.
#[derive(Debug, Clone)]
pub struct ProjectedPullRequest<'a> {
    pub pr: &'a PullRequest,
    pub reviewers: Vec<&'a Reviewer>,
    pub sla: Sla,
    pub severity: Severity,
    pub web_url: String,
    pub formatted_creation_date: String,
    pub title_check: Result<(), TitleError>,
}

impl ProjectedPullRequest<'_> {
    pub fn source_branch(&self) -> &str {
        self.pr.source_branch()
    }

    pub fn target_branch(&self) -> &str {
        self.pr.target_branch()
    }

    pub fn has_valid_title(&self) -> bool {
        self.title_check.is_ok()
    }
}

/// Browser URL of a pull request. Plain substitution, no escaping.
pub fn pull_request_web_url(organization: &str, project: &str, repository: &str, id: u64) -> String {
    format!(
        "https://dev.azure.com/{}/{}/_git/{}/pullrequest/{}",
        organization, project, repository, id
    )
}

/// Web URL for `pr` in the given organization and project.
pub fn web_url_for(pr: &PullRequest, organization: &str, project: &str) -> String {
    pull_request_web_url(organization, project, &pr.repository.name, pr.pull_request_id)
}

pub fn project<'a>(pr: &'a PullRequest, ctx: &ProjectionContext<'_>) -> ProjectedPullRequest<'a> {
    let mut reviewers = filter_reviewers(&pr.reviewers, ctx.excluded_reviewers);
    sort_reviewers(&mut reviewers);

    let closed = pr.sla_end();

    ProjectedPullRequest {
        pr,
        reviewers,
        sla: calculate_sla(pr.creation_date, closed, ctx.now),
        severity: severity(pr.creation_date, closed, ctx.now),
        web_url: web_url_for(pr, ctx.organization, ctx.project),
        formatted_creation_date: format_timestamp(
            &pr.creation_date.with_timezone(&Local),
            ctx.locale,
        ),
        title_check: validate_title(&pr.title),
    }
}

pub fn project_all<'a>(prs: &'a [PullRequest], ctx: &ProjectionContext<'_>) -> Vec<ProjectedPullRequest<'a>> {
    prs.iter().map(|pr| project(pr, ctx)).collect()
}
