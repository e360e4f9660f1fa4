use thiserror::Error;

/// Failure of a single Azure DevOps request.
///
/// Callers see these instead of an empty list so that "the request failed"
/// and "there is nothing to show" stay distinguishable.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Authentication failed. The personal access token may be invalid, expired, or missing the Code (Read) scope.")]
    Unauthorized,

    #[error("Not found: {url}. Check the organization, project and repository names.")]
    NotFound { url: String },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Azure DevOps returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Network error while calling {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Could not resolve the authenticated user: {0}")]
    IdentityUnresolved(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl FetchError {
    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else if err.is_decode() {
            FetchError::Decode {
                url: url.to_string(),
                source: err,
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                source: err,
            }
        }
    }

    /// Whether retrying the same request could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Timeout { .. } | FetchError::Transport { .. } => true,
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, FetchError::Unauthorized)
    }
}
