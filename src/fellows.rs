//! Fellowship roster: GitHub logins with their fellowship rank.
//!
//! The roster is read from a YAML or JSON list:
//!
//! ```yaml
//! - login: alice
//!   rank: 4
//! - login: "@bob"
//!   rank: 1
//! ```
//!
//! A leading `@` on a login is dropped. Ranks must lie in 1..=9.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::github::FellowsApi;
use crate::rules::RankScoreTable;

/// A fellowship member known by GitHub login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fellow {
    pub login: String,
    pub rank: u8,
}

impl Fellow {
    pub fn new(login: &str, rank: u8) -> Self {
        Self {
            login: login.trim_start_matches('@').to_string(),
            rank,
        }
    }
}

/// A roster loaded from a local file.
#[derive(Debug, Clone, Default)]
pub struct FellowsRoster {
    fellows: Vec<Fellow>,
}

impl FellowsRoster {
    pub fn new(fellows: Vec<Fellow>) -> Result<Self> {
        let mut roster = Vec::with_capacity(fellows.len());
        for fellow in fellows {
            if !(1..=RankScoreTable::MAX_RANK).contains(&fellow.rank) {
                anyhow::bail!(
                    "Fellow '{}' has rank {} (expected 1-{})",
                    fellow.login,
                    fellow.rank,
                    RankScoreTable::MAX_RANK
                );
            }
            let fellow = Fellow::new(&fellow.login, fellow.rank);
            if fellow.login.is_empty() {
                anyhow::bail!("Fellows roster contains an empty login");
            }
            // A later entry for the same login replaces the earlier one.
            roster.retain(|existing: &Fellow| existing.login != fellow.login);
            roster.push(fellow);
        }
        Ok(Self { fellows: roster })
    }

    pub fn parse(content: &str) -> Result<Self> {
        let fellows: Vec<Fellow> =
            serde_yaml::from_str(content).context("Failed to parse fellows roster")?;
        Self::new(fellows)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fellows roster at {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn fellows(&self) -> &[Fellow] {
        &self.fellows
    }
}

#[async_trait]
impl FellowsApi for FellowsRoster {
    async fn list_fellows(&self) -> Result<Vec<Fellow>> {
        tracing::info!(count = self.fellows.len(), "Listing fellows with their ranks");
        Ok(self.fellows.clone())
    }
}
