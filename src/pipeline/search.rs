use crate::azure::types::{Project, Repository};

/// Keep repositories whose name contains `term`, ignoring case.
/// A blank term keeps everything.
pub fn filter_repositories<'a>(repos: &'a [Repository], term: &str) -> Vec<&'a Repository> {
    let term = term.trim().to_lowercase();
    repos
        .iter()
        .filter(|repo| term.is_empty() || repo.name.to_lowercase().contains(&term))
        .collect()
}

/// Find a repository by id, or by name ignoring case.
pub fn find_repository<'a>(repos: &'a [Repository], key: &str) -> Option<&'a Repository> {
    repos
        .iter()
        .find(|repo| repo.id == key)
        .or_else(|| repos.iter().find(|repo| repo.name.eq_ignore_ascii_case(key)))
}

pub fn sort_repositories(repos: &mut [Repository]) {
    repos.sort_by_key(|repo| repo.name.to_lowercase());
}

pub fn sort_projects(projects: &mut [Project]) {
    projects.sort_by_key(|project| project.name.to_lowercase());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(id: &str, name: &str) -> Repository {
        Repository {
            id: id.to_string(),
            name: name.to_string(),
            url: String::new(),
            web_url: None,
            default_branch: Some("refs/heads/main".to_string()),
            size: None,
            remote_url: None,
            ssh_url: None,
            project: None,
        }
    }

    #[test]
    fn test_filter_repositories_substring_case_insensitive() {
        let repos = vec![repo("1", "web-app"), repo("2", "Mobile-App"), repo("3", "infra")];
        let found: Vec<&str> = filter_repositories(&repos, "APP")
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(found, vec!["web-app", "Mobile-App"]);
    }

    #[test]
    fn test_filter_repositories_blank_term_keeps_all() {
        let repos = vec![repo("1", "web-app"), repo("2", "infra")];
        assert_eq!(filter_repositories(&repos, "  ").len(), 2);
    }

    #[test]
    fn test_find_repository_by_id_or_name() {
        let repos = vec![repo("abc-123", "web-app"), repo("def-456", "infra")];
        assert_eq!(find_repository(&repos, "def-456").map(|r| r.name.as_str()), Some("infra"));
        assert_eq!(find_repository(&repos, "WEB-APP").map(|r| r.id.as_str()), Some("abc-123"));
        assert!(find_repository(&repos, "missing").is_none());
    }

    #[test]
    fn test_sort_repositories_by_name() {
        let mut repos = vec![repo("1", "web"), repo("2", "Api"), repo("3", "core")];
        sort_repositories(&mut repos);
        let names: Vec<&str> = repos.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Api", "core", "web"]);
        assert_eq!(repos[0].default_branch_name(), Some("main"));
    }
}
