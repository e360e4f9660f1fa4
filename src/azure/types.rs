use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Envelope used by every Azure DevOps list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    pub value: Vec<T>,
    #[serde(default)]
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub revision: Option<u64>,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub last_update_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub web_url: Option<String>,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub remote_url: Option<String>,
    #[serde(default)]
    pub ssh_url: Option<String>,
    #[serde(default)]
    pub project: Option<Project>,
}

impl Repository {
    /// Default branch without the `refs/heads/` prefix.
    pub fn default_branch_name(&self) -> Option<&str> {
        self.default_branch.as_deref().map(branch_name)
    }
}

/// Lifecycle state of a pull request.
///
/// The API spells these in lower camel case, but older payloads and the
/// status filter treat them case-insensitively, so parsing ignores case.
/// Unknown values are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum PullRequestStatus {
    Active,
    Completed,
    Abandoned,
    NotSet,
    Other(String),
}

impl PullRequestStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PullRequestStatus::Active => "active",
            PullRequestStatus::Completed => "completed",
            PullRequestStatus::Abandoned => "abandoned",
            PullRequestStatus::NotSet => "notSet",
            PullRequestStatus::Other(s) => s,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, PullRequestStatus::Active)
    }

    /// Completed and abandoned PRs carry a meaningful `closedDate`.
    pub fn is_closed(&self) -> bool {
        matches!(self, PullRequestStatus::Completed | PullRequestStatus::Abandoned)
    }

    pub fn icon(&self) -> &'static str {
        match self {
            PullRequestStatus::Active => "◌",
            PullRequestStatus::Completed => "✔",
            PullRequestStatus::Abandoned => "✖",
            PullRequestStatus::NotSet | PullRequestStatus::Other(_) => "•",
        }
    }
}

impl From<String> for PullRequestStatus {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "active" => PullRequestStatus::Active,
            "completed" => PullRequestStatus::Completed,
            "abandoned" => PullRequestStatus::Abandoned,
            "notset" => PullRequestStatus::NotSet,
            _ => PullRequestStatus::Other(s),
        }
    }
}

impl From<PullRequestStatus> for String {
    fn from(status: PullRequestStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for PullRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRef {
    #[serde(default)]
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub unique_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reviewer {
    #[serde(default)]
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub unique_name: Option<String>,
    /// Missing and zero both mean "no vote cast".
    #[serde(default)]
    pub vote: Option<i32>,
    #[serde(default)]
    pub is_required: bool,
}

impl Reviewer {
    pub fn has_voted(&self) -> bool {
        matches!(self.vote, Some(v) if v != 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryRef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    pub pull_request_id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: PullRequestStatus,
    pub created_by: IdentityRef,
    pub creation_date: DateTime<Utc>,
    #[serde(default)]
    pub closed_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source_ref_name: String,
    #[serde(default)]
    pub target_ref_name: String,
    #[serde(default)]
    pub merge_status: Option<String>,
    #[serde(default)]
    pub is_draft: bool,
    pub repository: RepositoryRef,
    #[serde(default)]
    pub reviewers: Vec<Reviewer>,
    #[serde(default)]
    pub url: String,
}

impl PullRequest {
    /// The end of the SLA interval: close time for finished PRs, `None`
    /// (meaning "now") otherwise.
    pub fn sla_end(&self) -> Option<DateTime<Utc>> {
        if self.status.is_closed() {
            self.closed_date
        } else {
            None
        }
    }

    pub fn source_branch(&self) -> &str {
        branch_name(&self.source_ref_name)
    }

    pub fn target_branch(&self) -> &str {
        branch_name(&self.target_ref_name)
    }

    /// Return a short reference in the format "repo!123"
    pub fn short_ref(&self) -> String {
        format!("{}!{}", self.repository.name, self.pull_request_id)
    }
}

/// Authenticated user's profile, from the VSSPS profile endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub public_alias: Option<String>,
}

/// Identity record; its `id` is what `searchCriteria.reviewerId` expects.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    #[serde(default)]
    pub provider_display_name: Option<String>,
}

const BRANCH_PREFIX: &str = "refs/heads/";

/// Strip the `refs/heads/` prefix from a ref name.
pub fn branch_name(ref_name: &str) -> &str {
    ref_name.strip_prefix(BRANCH_PREFIX).unwrap_or(ref_name)
}
