//! Frozen pull request state for offline evaluation.
//!
//! A snapshot file captures everything a run would otherwise fetch:
//!
//! ```yaml
//! author: alice
//! files: [src/lib.rs, README.md]
//! reviews:
//!   - authorLogin: bob
//!     authorId: 2
//!     reviewId: 10
//!     state: approved
//! teams:
//!   core: [bob, carol]
//! fellows:
//!   - login: dave
//!     rank: 3
//! ```
//!
//! [`SnapshotSource`] serves it through every collaborator trait and records
//! the review requests and checks it receives instead of sending them.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::fellows::{Fellow, FellowsRoster};
use crate::github::{ChecksApi, FellowsApi, PullRequestApi, ReviewEvent, TeamApi};
use crate::report::{CheckData, ReviewRequest};

/// On-disk shape of a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestSnapshot {
    pub author: String,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub reviews: Vec<ReviewEvent>,
    #[serde(default)]
    pub teams: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub fellows: Vec<Fellow>,
}

impl PullRequestSnapshot {
    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse pull request snapshot")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot at {}", path.display()))?;
        Self::parse(&content)
    }
}

/// In-memory collaborator backed by a [`PullRequestSnapshot`].
#[derive(Debug)]
pub struct SnapshotSource {
    snapshot: PullRequestSnapshot,
    roster: FellowsRoster,
    requests: Mutex<Vec<ReviewRequest>>,
    checks: Mutex<Vec<CheckData>>,
    review_lookups: AtomicUsize,
    team_lookups: AtomicUsize,
    fellows_lookups: AtomicUsize,
}

impl SnapshotSource {
    pub fn new(snapshot: PullRequestSnapshot) -> Result<Self> {
        let roster = FellowsRoster::new(snapshot.fellows.clone())
            .context("Snapshot contains an invalid fellows roster")?;
        Ok(Self {
            snapshot,
            roster,
            requests: Mutex::new(Vec::new()),
            checks: Mutex::new(Vec::new()),
            review_lookups: AtomicUsize::new(0),
            team_lookups: AtomicUsize::new(0),
            fellows_lookups: AtomicUsize::new(0),
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::new(PullRequestSnapshot::load(path)?)
    }

    /// Review requests received so far.
    pub fn requests(&self) -> Vec<ReviewRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// Checks published so far.
    pub fn checks(&self) -> Vec<CheckData> {
        self.checks
            .lock()
            .map(|checks| checks.clone())
            .unwrap_or_default()
    }

    pub fn review_lookups(&self) -> usize {
        self.review_lookups.load(Ordering::SeqCst)
    }

    pub fn team_lookups(&self) -> usize {
        self.team_lookups.load(Ordering::SeqCst)
    }

    pub fn fellows_lookups(&self) -> usize {
        self.fellows_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PullRequestApi for SnapshotSource {
    fn author(&self) -> &str {
        &self.snapshot.author
    }

    async fn list_modified_files(&self) -> Result<Vec<String>> {
        Ok(self.snapshot.files.clone())
    }

    async fn list_reviews(&self) -> Result<Vec<ReviewEvent>> {
        self.review_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.snapshot.reviews.clone())
    }

    async fn request_review(&self, request: &ReviewRequest) -> Result<()> {
        tracing::info!(users = ?request.users, teams = ?request.teams, "Recording review request");
        self.requests
            .lock()
            .map_err(|_| anyhow::anyhow!("Review request log is poisoned"))?
            .push(request.clone());
        Ok(())
    }
}

#[async_trait]
impl TeamApi for SnapshotSource {
    async fn team_members(&self, team: &str) -> Result<Vec<String>> {
        self.team_lookups.fetch_add(1, Ordering::SeqCst);
        match self.snapshot.teams.get(team) {
            Some(members) if !members.is_empty() => Ok(members.clone()),
            Some(_) => anyhow::bail!("Team '{}' has no members", team),
            None => anyhow::bail!("Team '{}' not found in snapshot", team),
        }
    }
}

#[async_trait]
impl FellowsApi for SnapshotSource {
    async fn list_fellows(&self) -> Result<Vec<Fellow>> {
        self.fellows_lookups.fetch_add(1, Ordering::SeqCst);
        self.roster.list_fellows().await
    }
}

#[async_trait]
impl ChecksApi for SnapshotSource {
    async fn publish_check(&self, check: &CheckData) -> Result<()> {
        tracing::info!(conclusion = %check.conclusion, title = %check.title, "Recording check");
        self.checks
            .lock()
            .map_err(|_| anyhow::anyhow!("Check log is poisoned"))?
            .push(check.clone());
        Ok(())
    }
}
