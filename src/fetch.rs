use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;

use crate::azure::{AzureClient, FetchError, PullRequest, Repository};
use crate::pipeline::find_repository;

/// Most repository fetches in flight at once when listing a whole project.
pub const MAX_CONCURRENT_FETCHES: usize = 8;

/// Which pull requests a listing starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullRequestSource {
    /// One repository, by id or name
    Repository(String),
    /// Every repository of the project
    AllRepositories,
    /// PRs where the authenticated user is a reviewer
    Reviewing,
}

/// Fetch the raw (unfiltered, unsorted) PR list for `source`.
pub async fn load_pull_requests(
    client: &AzureClient,
    project: &str,
    source: &PullRequestSource,
) -> Result<Vec<PullRequest>> {
    match source {
        PullRequestSource::Repository(key) => {
            let repos = client
                .fetch_repositories(project)
                .await
                .with_context(|| format!("Failed to list repositories of {}", project))?;
            let repo = find_repository(&repos, key).ok_or_else(|| {
                anyhow::anyhow!("Repository '{}' not found in project {}", key, project)
            })?;
            tracing::debug!(repository = %repo.name, "fetching pull requests");
            let prs = client
                .fetch_pull_requests(project, &repo.id)
                .await
                .with_context(|| format!("Failed to fetch pull requests of {}", repo.name))?;
            Ok(prs)
        }
        PullRequestSource::AllRepositories => {
            let repos = client
                .fetch_repositories(project)
                .await
                .with_context(|| format!("Failed to list repositories of {}", project))?;
            fetch_across_repositories(client, project, &repos, MAX_CONCURRENT_FETCHES).await
        }
        PullRequestSource::Reviewing => client
            .fetch_my_pull_requests(project)
            .await
            .context("Failed to fetch pull requests you are reviewing"),
    }
}

/// Fetch PRs of every repository, at most `limit` at a time, tolerating
/// individual failures. Fails only when every repository failed.
async fn fetch_across_repositories(
    client: &AzureClient,
    project: &str,
    repos: &[Repository],
    limit: usize,
) -> Result<Vec<PullRequest>> {
    let mut all_prs = Vec::new();
    let mut any_succeeded = false;
    let mut first_error: Option<FetchError> = None;

    let mut results = stream::iter(repos)
        .map(|repo| async move {
            let result = client.fetch_pull_requests(project, &repo.id).await;
            (repo.name.as_str(), result)
        })
        .buffer_unordered(limit.max(1));

    while let Some((name, result)) = results.next().await {
        match result {
            Ok(prs) => {
                tracing::debug!(repository = name, count = prs.len(), "fetched pull requests");
                all_prs.extend(prs);
                any_succeeded = true;
            }
            Err(e) => {
                tracing::warn!(repository = name, error = %e, "repository fetch failed");
                first_error.get_or_insert(e);
            }
        }
    }

    if !any_succeeded {
        if let Some(e) = first_error {
            return Err(anyhow::Error::new(e)
                .context("All repository fetches failed. Check your network connection and token."));
        }
    }

    Ok(dedup_pull_requests(all_prs))
}

/// Drop repeated PRs, keeping the first occurrence.
pub fn dedup_pull_requests(prs: Vec<PullRequest>) -> Vec<PullRequest> {
    let mut seen = HashSet::new();
    prs.into_iter()
        .filter(|pr| seen.insert((pr.repository.id.clone(), pr.pull_request_id)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::azure::{create_client, ClientOptions};
    use serde_json::json;
    use std::time::{Duration, Instant};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> AzureClient {
        let options = ClientOptions {
            timeout: Duration::from_secs(5),
            retries: 0,
            dev_base: server.uri(),
            vssps_base: server.uri(),
        };
        create_client("acme", "secret", options).unwrap()
    }

    fn pr_json(id: u64, repo_id: &str) -> serde_json::Value {
        json!({
            "pullRequestId": id,
            "title": "[TASK:X-1] change",
            "status": "active",
            "createdBy": { "id": "u1", "displayName": "Ana" },
            "creationDate": "2024-03-01T12:00:00Z",
            "sourceRefName": "refs/heads/feature",
            "targetRefName": "refs/heads/main",
            "repository": { "id": repo_id, "name": repo_id, "url": "" },
            "reviewers": []
        })
    }

    async fn mount_repos(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/acme/Web/_apis/git/repositories"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 2,
                "value": [
                    { "id": "r1", "name": "web", "url": "" },
                    { "id": "r2", "name": "api", "url": "" }
                ]
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_single_repository_by_name() {
        let server = MockServer::start().await;
        mount_repos(&server).await;
        Mock::given(method("GET"))
            .and(path("/acme/Web/_apis/git/repositories/r2/pullrequests"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 1, "value": [pr_json(7, "r2")]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let prs = load_pull_requests(&client, "Web", &PullRequestSource::Repository("API".into()))
            .await
            .unwrap();
        assert_eq!(prs.len(), 1);
        assert_eq!(prs[0].pull_request_id, 7);
    }

    #[tokio::test]
    async fn test_unknown_repository() {
        let server = MockServer::start().await;
        mount_repos(&server).await;

        let client = client_for(&server);
        let err = load_pull_requests(&client, "Web", &PullRequestSource::Repository("nope".into()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Repository 'nope' not found"));
    }

    #[tokio::test]
    async fn test_all_repositories_tolerates_partial_failure() {
        let server = MockServer::start().await;
        mount_repos(&server).await;
        Mock::given(method("GET"))
            .and(path("/acme/Web/_apis/git/repositories/r1/pullrequests"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 2, "value": [pr_json(1, "r1"), pr_json(2, "r1")]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/acme/Web/_apis/git/repositories/r2/pullrequests"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let prs = load_pull_requests(&client, "Web", &PullRequestSource::AllRepositories)
            .await
            .unwrap();
        let mut ids: Vec<u64> = prs.iter().map(|pr| pr.pull_request_id).collect();
        ids.sort();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_all_repositories_failing_is_error() {
        let server = MockServer::start().await;
        mount_repos(&server).await;
        Mock::given(method("GET"))
            .and(path("/acme/Web/_apis/git/repositories/r1/pullrequests"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/acme/Web/_apis/git/repositories/r2/pullrequests"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = load_pull_requests(&client, "Web", &PullRequestSource::AllRepositories)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("All repository fetches failed"));
        assert!(matches!(
            err.downcast_ref::<FetchError>(),
            Some(FetchError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_all_repositories_bounded_concurrency() {
        let server = MockServer::start().await;
        let repos: Vec<Repository> = (1..=4)
            .map(|i| {
                serde_json::from_value(json!({ "id": format!("r{}", i), "name": format!("repo{}", i), "url": "" }))
                    .unwrap()
            })
            .collect();
        for (i, repo) in repos.iter().enumerate() {
            Mock::given(method("GET"))
                .and(path(format!("/acme/Web/_apis/git/repositories/{}/pullrequests", repo.id)))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!({ "count": 1, "value": [pr_json(i as u64 + 1, &repo.id)] }))
                        .set_delay(Duration::from_millis(300)),
                )
                .expect(1)
                .mount(&server)
                .await;
        }

        let client = client_for(&server);
        let start = Instant::now();
        let prs = fetch_across_repositories(&client, "Web", &repos, 2).await.unwrap();
        let elapsed = start.elapsed();

        assert_eq!(prs.len(), 4);
        // Two waves of two 300ms requests each
        assert!(elapsed >= Duration::from_millis(600), "finished in {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_project_without_repositories_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/acme/Web/_apis/git/repositories"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 0, "value": [] })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let prs = load_pull_requests(&client, "Web", &PullRequestSource::AllRepositories)
            .await
            .unwrap();
        assert!(prs.is_empty());
    }

    #[test]
    fn test_dedup_keeps_first() {
        let a: PullRequest = serde_json::from_value(pr_json(1, "r1")).unwrap();
        let mut b = a.clone();
        b.title = "dup".to_string();
        let c: PullRequest = serde_json::from_value(pr_json(1, "r2")).unwrap();

        let unique = dedup_pull_requests(vec![a, b, c]);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].title, "[TASK:X-1] change");
    }
}
