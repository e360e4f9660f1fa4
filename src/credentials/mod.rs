pub mod prompt;

use std::io::IsTerminal;
use thiserror::Error;

/// Environment variable holding the Azure DevOps personal access token
pub const ENV_TOKEN_VAR: &str = "ADO_PRS_PAT";

pub use prompt::prompt_for_token;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("no personal access token: set ADO_PRS_PAT or run from an interactive terminal")]
    TokenMissing,
    #[error("token cannot be empty")]
    EmptyToken,
    #[error("failed to read token: {0}")]
    Prompt(#[from] std::io::Error),
}

/// Trim a raw token value. Blank values count as absent.
pub fn normalize_token(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Check for a token in the ADO_PRS_PAT environment variable.
/// Returns Some(token) if the env var is set and non-empty, None otherwise.
pub fn get_token_from_env() -> Option<String> {
    std::env::var(ENV_TOKEN_VAR)
        .ok()
        .and_then(|val| normalize_token(&val))
}

/// Token for this session: the environment first, then a hidden prompt
/// when stdin is a terminal. Nothing is persisted.
pub fn resolve_token(organization: &str) -> Result<String, CredentialError> {
    if let Some(token) = get_token_from_env() {
        tracing::debug!("using token from {}", ENV_TOKEN_VAR);
        return Ok(token);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CredentialError::TokenMissing);
    }
    prompt_for_token(organization)
}
