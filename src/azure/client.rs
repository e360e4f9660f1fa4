use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;
use tokio_retry::RetryIf;
use tracing::{debug, warn};

use crate::azure::error::FetchError;
use crate::azure::types::{
    Identity, ListResponse, Project, PullRequest, Repository, UserProfile,
};

pub const DEFAULT_DEV_BASE: &str = "https://dev.azure.com";
pub const DEFAULT_VSSPS_BASE: &str = "https://vssps.dev.azure.com";
const API_VERSION: &str = "7.0";

/// Transport settings for [`AzureClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout: Duration,
    /// Extra attempts for transient failures (0 disables retrying)
    pub retries: usize,
    pub dev_base: String,
    pub vssps_base: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            retries: 2,
            dev_base: DEFAULT_DEV_BASE.to_string(),
            vssps_base: DEFAULT_VSSPS_BASE.to_string(),
        }
    }
}

/// Authenticated Azure DevOps REST client scoped to one organization.
///
/// Every request uses Basic auth with an empty user name and the personal
/// access token as password, and pins `api-version=7.0`.
#[derive(Clone)]
pub struct AzureClient {
    http: reqwest::Client,
    organization: String,
    token: String,
    options: ClientOptions,
}

/// Create an authenticated client for `organization` using a personal access token
pub fn create_client(
    organization: &str,
    token: &str,
    options: ClientOptions,
) -> Result<AzureClient, FetchError> {
    let http = reqwest::Client::builder()
        .timeout(options.timeout)
        .user_agent(concat!("ado-prs/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(FetchError::Client)?;

    Ok(AzureClient {
        http,
        organization: organization.to_string(),
        token: token.to_string(),
        options,
    })
}

impl AzureClient {
    pub fn organization(&self) -> &str {
        &self.organization
    }

    fn dev_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.options.dev_base.trim_end_matches('/'),
            self.organization,
            path
        )
    }

    fn vssps_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.options.vssps_base.trim_end_matches('/'),
            self.organization,
            path
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        // Exponential backoff, capped at 5s per wait
        let retry_strategy = ExponentialBackoff::from_millis(100)
            .max_delay(Duration::from_secs(5))
            .take(self.options.retries);

        RetryIf::spawn(
            retry_strategy,
            || self.get_once(url, query),
            |e: &FetchError| {
                let transient = e.is_transient();
                if transient {
                    warn!(url, error = %e, "transient failure, retrying");
                }
                transient
            },
        )
        .await
    }

    async fn get_once<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        debug!(url, "GET");
        let response = self
            .http
            .get(url)
            .query(&[("api-version", API_VERSION)])
            .query(query)
            .basic_auth("", Some(&self.token))
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        // A rejected PAT is often answered with 203 and an HTML sign-in page
        if status == StatusCode::UNAUTHORIZED
            || status == StatusCode::FORBIDDEN
            || status == StatusCode::NON_AUTHORITATIVE_INFORMATION
        {
            return Err(FetchError::Unauthorized);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.json::<T>().await.map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// List every project of the organization
    pub async fn fetch_projects(&self) -> Result<Vec<Project>, FetchError> {
        let url = self.dev_url("_apis/projects");
        let list: ListResponse<Project> = self.get_json(&url, &[]).await?;
        debug!(count = list.value.len(), "fetched projects");
        Ok(list.value)
    }

    /// List the Git repositories of a project
    pub async fn fetch_repositories(&self, project: &str) -> Result<Vec<Repository>, FetchError> {
        let url = self.dev_url(&format!("{}/_apis/git/repositories", project));
        let list: ListResponse<Repository> = self.get_json(&url, &[]).await?;
        debug!(project, count = list.value.len(), "fetched repositories");
        Ok(list.value)
    }

    /// List pull requests of one repository, in every status
    pub async fn fetch_pull_requests(
        &self,
        project: &str,
        repository_id: &str,
    ) -> Result<Vec<PullRequest>, FetchError> {
        let url = self.dev_url(&format!(
            "{}/_apis/git/repositories/{}/pullrequests",
            project, repository_id
        ));
        let list: ListResponse<PullRequest> = self
            .get_json(&url, &[("searchCriteria.status", "all")])
            .await?;
        debug!(project, repository_id, count = list.value.len(), "fetched pull requests");
        Ok(list.value)
    }

    /// Profile of the user owning the token
    pub async fn fetch_current_user(&self) -> Result<UserProfile, FetchError> {
        let url = self.vssps_url("_apis/profile/profiles/me");
        self.get_json(&url, &[]).await
    }

    /// Look up the identity registered for an e-mail address
    pub async fn fetch_identity(&self, email: &str) -> Result<Option<Identity>, FetchError> {
        let url = self.vssps_url("_apis/identities");
        let list: ListResponse<Identity> = self
            .get_json(&url, &[("searchFilter", "General"), ("filterValue", email)])
            .await?;
        Ok(list.value.into_iter().next())
    }

    /// Pull requests of a project where the authenticated user is a reviewer.
    ///
    /// Resolves the caller's identity first: profile e-mail, then identity id.
    pub async fn fetch_my_pull_requests(&self, project: &str) -> Result<Vec<PullRequest>, FetchError> {
        let user = self.fetch_current_user().await?;
        let email = user
            .email_address
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| {
                FetchError::IdentityUnresolved("the profile has no e-mail address".to_string())
            })?;

        let identity = self.fetch_identity(&email).await?.ok_or_else(|| {
            FetchError::IdentityUnresolved(format!("no identity found for {}", email))
        })?;
        debug!(identity = %identity.id, "resolved reviewer identity");

        let url = self.dev_url(&format!("{}/_apis/git/pullrequests", project));
        let list: ListResponse<PullRequest> = self
            .get_json(
                &url,
                &[
                    ("searchCriteria.reviewerId", identity.id.as_str()),
                    ("searchCriteria.status", "all"),
                ],
            )
            .await?;
        Ok(list.value)
    }

    /// Verify that the token can read the project's repositories
    pub async fn check_connection(&self, project: &str) -> Result<(), FetchError> {
        self.fetch_repositories(project).await.map(|_| ())
    }
}
