//! Browse Azure DevOps projects, repositories and pull requests.
//!
//! The `pipeline` module holds the pure presentation logic (SLA buckets,
//! reviewer votes, title checks, ordering). `azure` talks to the REST API;
//! the rest is the command-line shell around them.

pub mod azure;
pub mod browser;
pub mod clipboard;
pub mod config;
pub mod credentials;
pub mod fetch;
pub mod logging;
pub mod output;
pub mod pipeline;
