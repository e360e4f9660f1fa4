pub mod formatter;

pub use formatter::{
    format_pr_detail, format_pr_table, format_profile, format_project_list,
    format_repository_list, format_statuses, format_tsv, should_use_colors, truncate_title,
};
