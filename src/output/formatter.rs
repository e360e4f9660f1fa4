use std::io::IsTerminal;
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

use crate::azure::{Project, PullRequestStatus, Repository, UserProfile};
use crate::pipeline::{classify_vote, Locale, ProjectedPullRequest, Severity, StatusFilter, VoteTier};

/// Semantic color of a piece of output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorRole {
    Success,
    Info,
    Warning,
    Alert,
    Danger,
    Muted,
}

pub fn status_role(status: &PullRequestStatus) -> ColorRole {
    match status {
        PullRequestStatus::Active => ColorRole::Info,
        PullRequestStatus::Completed => ColorRole::Success,
        PullRequestStatus::Abandoned => ColorRole::Danger,
        PullRequestStatus::NotSet | PullRequestStatus::Other(_) => ColorRole::Muted,
    }
}

pub fn severity_role(severity: Severity) -> ColorRole {
    match severity {
        Severity::Fresh => ColorRole::Success,
        Severity::Moderate => ColorRole::Warning,
        Severity::Old => ColorRole::Alert,
        Severity::Critical => ColorRole::Danger,
    }
}

pub fn vote_role(tier: VoteTier) -> ColorRole {
    match tier {
        VoteTier::Waiting => ColorRole::Muted,
        VoteTier::Approved => ColorRole::Success,
        VoteTier::Rejected => ColorRole::Danger,
    }
}

/// Apply a color role, or return the text untouched when colors are off.
pub fn paint(text: &str, role: ColorRole, use_colors: bool) -> String {
    if !use_colors {
        return text.to_string();
    }
    match role {
        ColorRole::Success => text.green().to_string(),
        ColorRole::Info => text.cyan().to_string(),
        ColorRole::Warning => text.yellow().to_string(),
        ColorRole::Alert => text.magenta().to_string(),
        ColorRole::Danger => text.red().bold().to_string(),
        ColorRole::Muted => text.dimmed().to_string(),
    }
}

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate title to fit available width, accounting for Unicode
pub fn truncate_title(title: &str, max_width: usize) -> String {
    let chars: Vec<char> = title.chars().collect();
    if chars.len() <= max_width {
        title.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Right-align `s` to `width` characters.
fn pad_left(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        s.to_string()
    } else {
        format!("{}{}", " ".repeat(width - len), s)
    }
}

const INVALID_TITLE_MARK: &str = "⚠";
const SLA_WIDTH: usize = 11;

/// Format projected PRs as a table: index, status, SLA, title, author, ref.
/// No headers. Index is 1-based and right-aligned with a trailing dot.
pub fn format_pr_table(rows: &[ProjectedPullRequest], locale: Locale, use_colors: bool) -> String {
    format_pr_table_with_width(rows, locale, use_colors, get_terminal_width())
}

fn format_pr_table_with_width(
    rows: &[ProjectedPullRequest],
    locale: Locale,
    use_colors: bool,
    term_width: Option<usize>,
) -> String {
    if rows.is_empty() {
        return "No pull requests found.".to_string();
    }

    let separator = "  ";

    rows.iter()
        .enumerate()
        .map(|(idx, row)| {
            let index_str = format!("{:>2}.", idx + 1);
            let sla_str = pad_left(&row.sla.label(locale), SLA_WIDTH);
            let mark = if row.has_valid_title() { " " } else { INVALID_TITLE_MARK };
            let author = &row.pr.created_by.display_name;
            let short_ref = row.pr.short_ref();

            // index(3) + space + icon(1) + space + sla + mark + separators
            let fixed_width = 3 + 1 + 1 + 1 + SLA_WIDTH + separator.len() * 3 + 2
                + author.chars().count()
                + short_ref.len();
            let title = match term_width {
                Some(width) if width > fixed_width + 10 => truncate_title(&row.pr.title, width - fixed_width),
                Some(_) => truncate_title(&row.pr.title, 20),
                None => row.pr.title.clone(),
            };

            format!(
                "{} {} {}{}{} {}{}{}{}{}",
                paint(&index_str, ColorRole::Muted, use_colors),
                paint(row.pr.status.icon(), status_role(&row.pr.status), use_colors),
                paint(&sla_str, severity_role(row.severity), use_colors),
                separator,
                paint(mark, ColorRole::Warning, use_colors),
                if use_colors { title.bold().to_string() } else { title },
                separator,
                author,
                separator,
                if use_colors { short_ref.underline().to_string() } else { short_ref },
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format projected PRs as tab-separated values for scripting.
/// Columns: id, status, sla, severity, title, author, repository, web_url
/// (no headers, no colors)
pub fn format_tsv(rows: &[ProjectedPullRequest], locale: Locale) -> String {
    if rows.is_empty() {
        return String::new();
    }

    rows.iter()
        .map(|row| {
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                row.pr.pull_request_id,
                row.pr.status,
                row.sla.label(locale),
                row.severity.as_str(),
                row.pr.title,
                row.pr.created_by.display_name,
                row.pr.repository.name,
                row.web_url
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Multi-line view of one PR with reviewers, branches and title check.
pub fn format_pr_detail(row: &ProjectedPullRequest, locale: Locale, use_colors: bool) -> String {
    let pr = row.pr;
    let mut lines = Vec::new();

    let title = if use_colors { pr.title.bold().to_string() } else { pr.title.clone() };
    lines.push(format!("{} {}", title, paint(&format!("#{}", pr.pull_request_id), ColorRole::Muted, use_colors)));
    lines.push(format!(
        "  Status: {}",
        paint(&format!("{} {}", pr.status.icon(), pr.status), status_role(&pr.status), use_colors)
    ));
    if pr.is_draft {
        lines.push("  Draft: yes".to_string());
    }
    lines.push(format!("  Repository: {}", pr.repository.name));
    lines.push(format!("  Author: {}", pr.created_by.display_name));
    lines.push(format!("  Branches: {} -> {}", row.source_branch(), row.target_branch()));
    lines.push(format!("  Created: {}", row.formatted_creation_date));
    lines.push(format!(
        "  SLA: {}",
        paint(
            &format!("{} {} ({})", row.sla.unit.icon(), row.sla.label(locale), row.severity.as_str()),
            severity_role(row.severity),
            use_colors
        )
    ));
    match &row.title_check {
        Ok(()) => lines.push(format!("  Title: {}", paint("ok", ColorRole::Success, use_colors))),
        Err(e) => lines.push(format!(
            "  Title: {}",
            paint(&format!("{} {}", INVALID_TITLE_MARK, e), ColorRole::Warning, use_colors)
        )),
    }
    lines.push(format!(
        "  URL: {}",
        if use_colors { row.web_url.underline().to_string() } else { row.web_url.clone() }
    ));

    if row.reviewers.is_empty() {
        lines.push("  Reviewers: none".to_string());
    } else {
        lines.push("  Reviewers:".to_string());
        for reviewer in &row.reviewers {
            let tier = classify_vote(reviewer.vote);
            let required = if reviewer.is_required { " [required]" } else { "" };
            lines.push(format!(
                "    {} {}{} {}",
                paint(tier.icon(), vote_role(tier), use_colors),
                reviewer.display_name,
                required,
                paint(&format!("({})", tier.label(locale)), vote_role(tier), use_colors)
            ));
        }
    }

    if let Some(description) = pr.description.as_deref().filter(|d| !d.trim().is_empty()) {
        lines.push(String::new());
        lines.extend(description.lines().map(|l| format!("  {}", l)));
    }

    lines.join("\n")
}

/// Status choices with the active filter in brackets.
pub fn format_statuses(statuses: &[String], current: &StatusFilter, use_colors: bool) -> String {
    let current = current.to_string();
    let items: Vec<String> = statuses
        .iter()
        .map(|s| {
            if s.eq_ignore_ascii_case(&current) {
                let marked = format!("[{}]", s);
                if use_colors { marked.bold().to_string() } else { marked }
            } else {
                s.clone()
            }
        })
        .collect();
    format!("Statuses: {}", items.join(" "))
}

pub fn format_project_list(projects: &[Project], use_colors: bool) -> String {
    if projects.is_empty() {
        return "No projects found.".to_string();
    }

    projects
        .iter()
        .enumerate()
        .map(|(idx, project)| {
            let index_str = format!("{:>2}.", idx + 1);
            let name = if use_colors { project.name.bold().to_string() } else { project.name.clone() };
            match project.description.as_deref().filter(|d| !d.trim().is_empty()) {
                Some(desc) => format!(
                    "{} {}  {}",
                    paint(&index_str, ColorRole::Muted, use_colors),
                    name,
                    paint(&truncate_title(desc.lines().next().unwrap_or(desc), 60), ColorRole::Muted, use_colors)
                ),
                None => format!("{} {}", paint(&index_str, ColorRole::Muted, use_colors), name),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_repository_list(repos: &[&Repository], use_colors: bool) -> String {
    if repos.is_empty() {
        return "No repositories found.".to_string();
    }

    repos
        .iter()
        .enumerate()
        .map(|(idx, repo)| {
            let index_str = format!("{:>2}.", idx + 1);
            let name = if use_colors { repo.name.bold().to_string() } else { repo.name.clone() };
            match repo.default_branch_name() {
                Some(branch) => format!(
                    "{} {}  {}",
                    paint(&index_str, ColorRole::Muted, use_colors),
                    name,
                    paint(&format!("({})", branch), ColorRole::Info, use_colors)
                ),
                None => format!("{} {}", paint(&index_str, ColorRole::Muted, use_colors), name),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_profile(profile: &UserProfile, organization: &str) -> String {
    let mut lines = vec![
        profile.display_name.clone(),
        format!("  Organization: {}", organization),
        format!("  Id: {}", profile.id),
    ];
    if let Some(email) = profile.email_address.as_deref() {
        lines.push(format!("  Email: {}", email));
    }
    if let Some(alias) = profile.public_alias.as_deref() {
        lines.push(format!("  Alias: {}", alias));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::azure::{IdentityRef, PullRequest, RepositoryRef, Reviewer};
    use crate::pipeline::{project, ProjectionContext};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn sample_pr() -> PullRequest {
        PullRequest {
            pull_request_id: 123,
            title: "[TASK:ABC-1] Fix login bug".to_string(),
            description: Some("Fixes the redirect loop".to_string()),
            status: PullRequestStatus::Active,
            created_by: IdentityRef {
                id: "u1".to_string(),
                display_name: "Ana Souza".to_string(),
                unique_name: None,
            },
            creation_date: now() - Duration::hours(5),
            closed_date: None,
            source_ref_name: "refs/heads/fix/login".to_string(),
            target_ref_name: "refs/heads/main".to_string(),
            merge_status: None,
            is_draft: false,
            repository: RepositoryRef {
                id: "r1".to_string(),
                name: "web".to_string(),
                url: String::new(),
            },
            reviewers: vec![
                Reviewer {
                    id: "a".to_string(),
                    display_name: "Zeca".to_string(),
                    unique_name: None,
                    vote: None,
                    is_required: true,
                },
                Reviewer {
                    id: "b".to_string(),
                    display_name: "Bia".to_string(),
                    unique_name: None,
                    vote: Some(10),
                    is_required: false,
                },
            ],
            url: String::new(),
        }
    }

    fn ctx<'a>(excluded: &'a [String], locale: Locale) -> ProjectionContext<'a> {
        ProjectionContext {
            organization: "acme",
            project: "Web",
            excluded_reviewers: excluded,
            locale,
            now: now(),
        }
    }

    #[test]
    fn test_format_pr_table_empty() {
        assert_eq!(format_pr_table(&[], Locale::PtBr, false), "No pull requests found.");
    }

    #[test]
    fn test_format_pr_table_row() {
        let pr = sample_pr();
        let rows = vec![project(&pr, &ctx(&[], Locale::PtBr))];
        let result = format_pr_table_with_width(&rows, Locale::PtBr, false, None);
        assert!(result.starts_with(" 1. ◌"));
        assert!(result.contains("5 horas"));
        assert!(result.contains("[TASK:ABC-1] Fix login bug"));
        assert!(result.contains("Ana Souza"));
        assert!(result.contains("web!123"));
        assert!(!result.contains(INVALID_TITLE_MARK));
    }

    #[test]
    fn test_format_pr_table_flags_invalid_title() {
        let mut pr = sample_pr();
        pr.title = "fix login".to_string();
        let rows = vec![project(&pr, &ctx(&[], Locale::En))];
        let result = format_pr_table_with_width(&rows, Locale::En, false, None);
        assert!(result.contains("⚠ fix login"));
        assert!(result.contains("5 hours"));
    }

    #[test]
    fn test_format_pr_table_truncates_to_width() {
        let mut pr = sample_pr();
        pr.title = format!("[TASK:ABC-1] {}", "x".repeat(200));
        let rows = vec![project(&pr, &ctx(&[], Locale::PtBr))];
        let result = format_pr_table_with_width(&rows, Locale::PtBr, false, Some(100));
        assert!(result.contains("..."));
        assert!(result.chars().count() <= 100);
    }

    #[test]
    fn test_format_pr_table_indexes() {
        let pr1 = sample_pr();
        let mut pr2 = sample_pr();
        pr2.pull_request_id = 456;
        let excluded: Vec<String> = vec![];
        let rows = vec![project(&pr1, &ctx(&excluded, Locale::PtBr)), project(&pr2, &ctx(&excluded, Locale::PtBr))];
        let result = format_pr_table_with_width(&rows, Locale::PtBr, false, None);
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(" 1."));
        assert!(lines[1].starts_with(" 2."));
        assert!(lines[1].contains("web!456"));
    }

    #[test]
    fn test_format_tsv() {
        let pr = sample_pr();
        let rows = vec![project(&pr, &ctx(&[], Locale::En))];
        assert_eq!(
            format_tsv(&rows, Locale::En),
            "123\tactive\t5 hours\tfresh\t[TASK:ABC-1] Fix login bug\tAna Souza\tweb\thttps://dev.azure.com/acme/Web/_git/web/pullrequest/123"
        );
        assert_eq!(format_tsv(&[], Locale::En), "");
    }

    #[test]
    fn test_format_pr_detail() {
        let pr = sample_pr();
        let row = project(&pr, &ctx(&[], Locale::PtBr));
        let result = format_pr_detail(&row, Locale::PtBr, false);
        assert!(result.starts_with("[TASK:ABC-1] Fix login bug #123"));
        assert!(result.contains("  Status: ◌ active"));
        assert!(result.contains("  Branches: fix/login -> main"));
        assert!(result.contains("  SLA: ⏱ 5 horas (fresh)"));
        assert!(result.contains("  Title: ok"));
        assert!(result.contains("  URL: https://dev.azure.com/acme/Web/_git/web/pullrequest/123"));
        assert!(result.contains("Fixes the redirect loop"));

        // voted reviewer first
        let bia = result.find("✔ Bia (Aprovado)").unwrap();
        let zeca = result.find("⏳ Zeca [required] (Aguardando revisão)").unwrap();
        assert!(bia < zeca);
    }

    #[test]
    fn test_format_pr_detail_title_error_and_no_reviewers() {
        let mut pr = sample_pr();
        pr.title = "[TASK:ABC-1]fix".to_string();
        let excluded = vec!["Zeca".to_string(), "Bia".to_string()];
        let row = project(&pr, &ctx(&excluded, Locale::En));
        let result = format_pr_detail(&row, Locale::En, false);
        assert!(result.contains("  Title: ⚠ must have a space between ']' and the description"));
        assert!(result.contains("  Reviewers: none"));
    }

    #[test]
    fn test_format_statuses_marks_current() {
        let statuses = vec!["ALL".to_string(), "active".to_string(), "completed".to_string()];
        assert_eq!(
            format_statuses(&statuses, &StatusFilter::default(), false),
            "Statuses: ALL [active] completed"
        );
        assert_eq!(
            format_statuses(&statuses, &StatusFilter::All, false),
            "Statuses: [ALL] active completed"
        );
    }

    #[test]
    fn test_format_project_list() {
        let projects = vec![
            Project {
                id: "p1".to_string(),
                name: "Web".to_string(),
                description: Some("Customer portal".to_string()),
                url: None,
                state: None,
                revision: None,
                visibility: None,
                last_update_time: None,
            },
            Project {
                id: "p2".to_string(),
                name: "Mobile".to_string(),
                description: None,
                url: None,
                state: None,
                revision: None,
                visibility: None,
                last_update_time: None,
            },
        ];
        assert_eq!(
            format_project_list(&projects, false),
            " 1. Web  Customer portal\n 2. Mobile"
        );
        assert_eq!(format_project_list(&[], false), "No projects found.");
    }

    #[test]
    fn test_format_repository_list() {
        let repo = Repository {
            id: "r1".to_string(),
            name: "web".to_string(),
            url: String::new(),
            web_url: None,
            default_branch: Some("refs/heads/develop".to_string()),
            size: None,
            remote_url: None,
            ssh_url: None,
            project: None,
        };
        assert_eq!(format_repository_list(&[&repo], false), " 1. web  (develop)");
        assert_eq!(format_repository_list(&[], false), "No repositories found.");
    }

    #[test]
    fn test_format_profile() {
        let profile = UserProfile {
            id: "id-1".to_string(),
            display_name: "Ana Souza".to_string(),
            email_address: Some("ana@acme.com".to_string()),
            public_alias: None,
        };
        let result = format_profile(&profile, "acme");
        assert_eq!(result, "Ana Souza\n  Organization: acme\n  Id: id-1\n  Email: ana@acme.com");
    }

    #[test]
    fn test_paint_without_colors_is_identity() {
        assert_eq!(paint("x", ColorRole::Danger, false), "x");
        assert_ne!(paint("x", ColorRole::Danger, true), "x");
    }

    // truncate_title tests
    #[test]
    fn test_truncate_title_short() {
        assert_eq!(truncate_title("Short title", 20), "Short title");
    }

    #[test]
    fn test_truncate_title_long() {
        assert_eq!(truncate_title("This is a very long title", 15), "This is a ve...");
    }

    #[test]
    fn test_truncate_title_unicode() {
        assert_eq!(truncate_title("Revisão da integração", 10), "Revisão...");
    }

    #[test]
    fn test_truncate_title_very_narrow() {
        assert_eq!(truncate_title("Hello world", 3), "Hel");
    }
}
