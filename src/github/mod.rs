//! Code-host collaborators: the traits the engine consumes and the GitHub
//! REST implementation of them.

pub mod client;
pub mod types;

pub use client::{CheckRunClient, GitHubClient, PullRequestClient, RepoSlug, TeamClient};
pub use types::{ChecksApi, FellowsApi, PullRequestApi, ReviewEvent, TeamApi};
