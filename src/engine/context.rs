//! Per-run access to the collaborators, with memoized lookups.
//!
//! Every external lookup is issued at most once per key during a run. The
//! cache lives inside a [`RunContext`], so dropping the context at the end of
//! an evaluation discards it; nothing survives across runs.

use std::collections::HashMap;
use tokio::sync::Mutex;

use super::approvals::ApprovalSet;
use crate::errors::EngineError;
use crate::fellows::Fellow;
use crate::github::{FellowsApi, PullRequestApi, TeamApi};

#[derive(Debug, Default)]
struct RunCache {
    files: Option<Vec<String>>,
    /// Keyed by the `count_author` flag.
    approvals: HashMap<bool, ApprovalSet>,
    teams: HashMap<String, Vec<String>>,
    fellows: Option<Vec<Fellow>>,
}

/// Collaborators plus the lookups already performed during this run.
pub struct RunContext<'a> {
    pr: &'a dyn PullRequestApi,
    teams: &'a dyn TeamApi,
    fellows: &'a dyn FellowsApi,
    cache: Mutex<RunCache>,
}

impl<'a> RunContext<'a> {
    pub fn new(pr: &'a dyn PullRequestApi, teams: &'a dyn TeamApi, fellows: &'a dyn FellowsApi) -> Self {
        Self {
            pr,
            teams,
            fellows,
            cache: Mutex::new(RunCache::default()),
        }
    }

    pub fn author(&self) -> &str {
        self.pr.author()
    }

    pub async fn modified_files(&self) -> Result<Vec<String>, EngineError> {
        let mut cache = self.cache.lock().await;
        if let Some(files) = &cache.files {
            return Ok(files.clone());
        }
        let files = self
            .pr
            .list_modified_files()
            .await
            .map_err(|e| EngineError::external("list modified files", e))?;
        tracing::debug!(count = files.len(), "Fetched modified files");
        cache.files = Some(files.clone());
        Ok(files)
    }

    pub async fn approvals(&self, count_author: bool) -> Result<ApprovalSet, EngineError> {
        let mut cache = self.cache.lock().await;
        if let Some(set) = cache.approvals.get(&count_author) {
            return Ok(set.clone());
        }
        let reviews = self
            .pr
            .list_reviews()
            .await
            .map_err(|e| EngineError::external("list reviews", e))?;
        let set = ApprovalSet::from_reviews(&reviews, self.pr.author(), count_author);
        tracing::debug!(approvals = ?set.logins(), count_author, "Computed approval set");
        cache.approvals.insert(count_author, set.clone());
        Ok(set)
    }

    pub async fn team_members(&self, team: &str) -> Result<Vec<String>, EngineError> {
        let mut cache = self.cache.lock().await;
        if let Some(members) = cache.teams.get(team) {
            return Ok(members.clone());
        }
        tracing::debug!(team, "Fetching team");
        let members = self
            .teams
            .team_members(team)
            .await
            .map_err(|e| EngineError::external(format!("fetch members of team '{}'", team), e))?;
        tracing::debug!(team, members = ?members, "Fetched team members");
        cache.teams.insert(team.to_string(), members.clone());
        Ok(members)
    }

    pub async fn fellows(&self) -> Result<Vec<Fellow>, EngineError> {
        let mut cache = self.cache.lock().await;
        if let Some(fellows) = &cache.fellows {
            return Ok(fellows.clone());
        }
        tracing::debug!("Fellows not cached. Fetching fellows.");
        let fellows = self
            .fellows
            .list_fellows()
            .await
            .map_err(|e| EngineError::external("list fellows", e))?;
        cache.fellows = Some(fellows.clone());
        Ok(fellows)
    }

    /// Logins of every fellow at `min_rank` or above, in roster order.
    pub async fn fellows_of_rank(&self, min_rank: u8) -> Result<Vec<String>, EngineError> {
        let logins: Vec<String> = self
            .fellows()
            .await?
            .into_iter()
            .filter(|fellow| fellow.rank >= min_rank)
            .map(|fellow| fellow.login)
            .collect();
        tracing::info!(min_rank, members = ?logins, "Fellows of rank or higher");
        Ok(logins)
    }
}
