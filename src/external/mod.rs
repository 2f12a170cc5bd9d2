//! Third-party APIs the portfolio pulls supplementary data from.

pub mod github;

pub use github::{ExternalError, GitHubClient, RepoSummary};
