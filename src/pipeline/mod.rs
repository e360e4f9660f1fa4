//! Pull request presentation pipeline: status filter, default order, and
//! per-row projection (reviewers, SLA, web URL, title diagnostics).
//!
//! Everything here is pure; the only clock read is the `now` the caller
//! passes in.

pub mod locale;
pub mod projector;
pub mod reviewers;
pub mod search;
pub mod sla;
pub mod status;
pub mod title;

pub use locale::{format_timestamp, Locale};
pub use projector::{
    project, project_all, pull_request_web_url, web_url_for, ProjectedPullRequest,
    ProjectionContext,
};
pub use reviewers::{classify_vote, filter_reviewers, sort_reviewers, VoteTier, DEFAULT_EXCLUDED_REVIEWERS};
pub use search::{filter_repositories, find_repository, sort_projects, sort_repositories};
pub use sla::{calculate_sla, severity, Severity, Sla, SlaUnit};
pub use status::{available_statuses, filter_by_status, filter_matches_any, prepare_list, sort_pull_requests, StatusFilter};
pub use title::{validate_title, TitleError};
