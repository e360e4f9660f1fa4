use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static TITLE_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(HISTORIA|TASK):[A-Z0-9-]+\]\s+.+$").expect("title pattern is a valid regex")
});

/// First rule a pull request title breaks, in the order they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TitleError {
    #[error("title cannot be empty")]
    Empty,
    #[error("title must start with '['")]
    MissingOpeningBracket,
    #[error("title must contain 'HISTORIA:' or 'TASK:' after '['")]
    MissingTag,
    #[error("title must contain ']' after the code")]
    MissingClosingBracket,
    #[error("title must contain a description after ']'")]
    MissingDescription,
    #[error("must have a space between ']' and the description")]
    MissingSpace,
    #[error("invalid format, expected: [HISTORIA|TASK:CODE] description")]
    InvalidFormat,
}

/// Check a title against `[HISTORIA|TASK:CODE] description`.
///
/// A conforming title returns `Ok`. Otherwise the title is inspected step
/// by step so the error names the first thing to fix.
pub fn validate_title(title: &str) -> Result<(), TitleError> {
    if title.trim().is_empty() {
        return Err(TitleError::Empty);
    }
    if TITLE_FORMAT.is_match(title) {
        return Ok(());
    }

    if !title.starts_with('[') {
        return Err(TitleError::MissingOpeningBracket);
    }
    if !title.contains("HISTORIA:") && !title.contains("TASK:") {
        return Err(TitleError::MissingTag);
    }
    let Some(close) = title.find(']') else {
        return Err(TitleError::MissingClosingBracket);
    };

    let after = &title[close + 1..];
    if after.trim().is_empty() {
        return Err(TitleError::MissingDescription);
    }
    if !after.starts_with(' ') {
        return Err(TitleError::MissingSpace);
    }
    Err(TitleError::InvalidFormat)
}
