use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::pipeline::{Locale, StatusFilter, DEFAULT_EXCLUDED_REVIEWERS};

/// What `ado-prs` shows when run without a subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchType {
    #[default]
    Projects,
    Repositories,
    MyPullRequests,
}

impl SearchType {
    pub fn requires_project(&self) -> bool {
        !matches!(self, SearchType::Projects)
    }

    /// Spelling used in the config file.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Projects => "projects",
            SearchType::Repositories => "repositories",
            SearchType::MyPullRequests => "myPullRequests",
        }
    }
}

/// Where to connect: organization plus an optional project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub organization: String,
    pub project: Option<String>,
}

impl Connection {
    pub fn require_project(&self) -> anyhow::Result<&str> {
        self.project.as_deref().ok_or_else(|| {
            anyhow::anyhow!("No project selected. Pass --project or set `project` in the config file.")
        })
    }
}

/// Config file contents.
///
/// Example YAML:
/// ```yaml
/// organization: acme
/// project: Web
/// search_type: repositories
/// default_status: Active
/// locale: pt-BR
/// timeout: 10s
/// retries: 2
/// excluded_reviewers:
///   - "[APPV - Fb-App-Vivo]\\Revisores N2"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub organization: Option<String>,

    #[serde(default)]
    pub project: Option<String>,

    #[serde(default)]
    pub search_type: SearchType,

    /// Status filter applied when `--status` is not given ("ALL" disables it)
    #[serde(default = "default_status")]
    pub default_status: String,

    #[serde(default)]
    pub locale: Locale,

    /// Per-request timeout, humantime format (e.g. "10s", "1m")
    #[serde(default = "default_timeout")]
    pub timeout: String,

    /// Extra attempts for timeouts and 5xx responses
    #[serde(default = "default_retries")]
    pub retries: usize,

    /// Reviewer display names hidden from every PR (exact match)
    #[serde(default = "default_excluded_reviewers")]
    pub excluded_reviewers: Vec<String>,
}

fn default_status() -> String {
    "Active".to_string()
}

fn default_timeout() -> String {
    "10s".to_string()
}

fn default_retries() -> usize {
    2
}

pub fn default_excluded_reviewers() -> Vec<String> {
    DEFAULT_EXCLUDED_REVIEWERS.iter().map(|s| s.to_string()).collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            organization: None,
            project: None,
            search_type: SearchType::default(),
            default_status: default_status(),
            locale: Locale::default(),
            timeout: default_timeout(),
            retries: default_retries(),
            excluded_reviewers: default_excluded_reviewers(),
        }
    }
}

impl Config {
    pub fn timeout_duration(&self) -> anyhow::Result<Duration> {
        humantime::parse_duration(self.timeout.trim())
            .map_err(|e| anyhow::anyhow!("invalid timeout '{}': {}", self.timeout, e))
    }

    pub fn status_filter(&self) -> StatusFilter {
        self.default_status.parse().unwrap_or_default()
    }

    /// Resolve the connection. Command-line overrides are applied to the
    /// config before this is called.
    pub fn connection(&self) -> anyhow::Result<Connection> {
        let organization = self
            .organization
            .as_deref()
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "No organization configured. Pass --org or run `ado-prs init`."
                )
            })?;
        let project = self
            .project
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty());

        Ok(Connection {
            organization: organization.to_string(),
            project: project.map(str::to_string),
        })
    }

    /// Apply `--org` and `--project` over the file's values.
    pub fn apply_overrides(&mut self, organization: Option<&str>, project: Option<&str>) {
        if let Some(org) = organization {
            self.organization = Some(org.to_string());
        }
        if let Some(project) = project {
            self.project = Some(project.to_string());
        }
    }
}
