use std::fmt;
use std::str::FromStr;

use crate::azure::types::PullRequest;

/// Sentinel shown first in the list of available statuses.
pub const ALL_STATUSES: &str = "ALL";

/// Status filter applied before projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Status(String),
}

impl Default for StatusFilter {
    fn default() -> Self {
        StatusFilter::Status("Active".to_string())
    }
}

impl StatusFilter {
    /// Case-insensitive match against the PR's status.
    pub fn matches(&self, pr: &PullRequest) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Status(s) => pr.status.as_str().eq_ignore_ascii_case(s),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(ALL_STATUSES) {
            Ok(StatusFilter::All)
        } else {
            Ok(StatusFilter::Status(s.to_string()))
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str(ALL_STATUSES),
            StatusFilter::Status(s) => f.write_str(s),
        }
    }
}

/// `"ALL"` followed by each status present in the list, in order of first
/// appearance.
pub fn available_statuses(prs: &[PullRequest]) -> Vec<String> {
    let mut statuses = vec![ALL_STATUSES.to_string()];
    for pr in prs {
        let status = pr.status.as_str();
        if !statuses[1..].iter().any(|s| s == status) {
            statuses.push(status.to_string());
        }
    }
    statuses
}

/// Whether `filter` selects any status in `statuses` (as returned by
/// [`available_statuses`]). `ALL` always does.
pub fn filter_matches_any(filter: &StatusFilter, statuses: &[String]) -> bool {
    match filter {
        StatusFilter::All => true,
        StatusFilter::Status(s) => statuses
            .iter()
            .filter(|status| status.as_str() != ALL_STATUSES)
            .any(|status| status.eq_ignore_ascii_case(s)),
    }
}

pub fn filter_by_status(prs: Vec<PullRequest>, filter: &StatusFilter) -> Vec<PullRequest> {
    prs.into_iter().filter(|pr| filter.matches(pr)).collect()
}

/// Default list order: active PRs first, each group newest first.
pub fn sort_pull_requests(prs: &mut [PullRequest]) {
    prs.sort_by(|a, b| {
        b.status
            .is_active()
            .cmp(&a.status.is_active())
            .then_with(|| b.creation_date.cmp(&a.creation_date))
    });
}

/// Filter by status, then apply the default order.
pub fn prepare_list(prs: Vec<PullRequest>, filter: &StatusFilter) -> Vec<PullRequest> {
    let mut prs = filter_by_status(prs, filter);
    sort_pull_requests(&mut prs);
    prs
}
