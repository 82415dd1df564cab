//! Collaborator contracts the engine consumes.
//!
//! The engine never talks to a code host directly. Real implementations live
//! in [`client`](super::client); [`SnapshotSource`](crate::snapshot::SnapshotSource)
//! serves frozen inputs for offline runs and tests.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::fellows::Fellow;
use crate::report::{CheckData, ReviewRequest};

/// A submitted review, as the code host reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEvent {
    pub author_login: String,
    pub author_id: u64,
    /// Increases with submission time.
    pub review_id: u64,
    /// `approved`, `changes_requested`, `commented`, `dismissed`, ...
    pub state: String,
}

impl ReviewEvent {
    pub fn new(author_login: &str, author_id: u64, review_id: u64, state: &str) -> Self {
        Self {
            author_login: author_login.to_string(),
            author_id,
            review_id,
            state: state.to_string(),
        }
    }
}

/// Access to the pull request under evaluation.
#[async_trait]
pub trait PullRequestApi: Send + Sync {
    /// Login of the pull request author.
    fn author(&self) -> &str;

    async fn list_modified_files(&self) -> Result<Vec<String>>;

    /// Every review submitted on the pull request, in any state.
    async fn list_reviews(&self) -> Result<Vec<ReviewEvent>>;

    async fn request_review(&self, request: &ReviewRequest) -> Result<()>;
}

/// Team membership lookup.
#[async_trait]
pub trait TeamApi: Send + Sync {
    /// Logins of every member. Fails if the team is unknown or empty.
    async fn team_members(&self, team: &str) -> Result<Vec<String>>;
}

/// Fellowship rank lookup.
#[async_trait]
pub trait FellowsApi: Send + Sync {
    async fn list_fellows(&self) -> Result<Vec<Fellow>>;
}

/// Publication of the final verdict.
#[async_trait]
pub trait ChecksApi: Send + Sync {
    async fn publish_check(&self, check: &CheckData) -> Result<()>;
}
