pub mod client;
pub mod error;
pub mod types;

pub use client::{create_client, AzureClient, ClientOptions};
pub use error::FetchError;
pub use types::{
    branch_name, Identity, IdentityRef, Project, PullRequest, PullRequestStatus, Repository,
    RepositoryRef, Reviewer, UserProfile,
};
