use std::time::Duration;

use super::schema::Config;

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(ref org) = config.organization {
        if org.trim().is_empty() {
            errors.push("organization: must not be blank".to_string());
        } else if org.contains('/') {
            errors.push(format!(
                "organization: '{}' must be the organization name, not a URL",
                org
            ));
        }
    }

    if config.search_type.requires_project()
        && config.project.as_deref().map_or(true, |p| p.trim().is_empty())
    {
        errors.push(format!(
            "search_type: {} needs a project to be set",
            config.search_type.as_str()
        ));
    }

    match humantime::parse_duration(config.timeout.trim()) {
        Ok(d) if d == Duration::ZERO => {
            errors.push("timeout: must be greater than zero".to_string());
        }
        Ok(_) => {}
        Err(e) => errors.push(format!("timeout: invalid '{}' - {}", config.timeout, e)),
    }

    if config.default_status.trim().is_empty() {
        errors.push("default_status: must not be blank (use ALL to disable the filter)".to_string());
    }

    for (i, name) in config.excluded_reviewers.iter().enumerate() {
        if name.trim().is_empty() {
            errors.push(format!("excluded_reviewers[{}]: must not be blank", i));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
