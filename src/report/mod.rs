//! Evaluation reports and their aggregation.
//!
//! ## Types
//!
//! - [`RuleReport`]: why a single rule failed and who could fix it
//! - [`ReportDetails`]: the rule-specific part of a failure
//! - [`PullRequestReport`]: every failing rule for one pull request
//! - [`ReviewRequest`]: the users and teams to ask for a review
//! - [`Conclusion`]: the pass/fail verdict published as a check
//!
//! Passing rules never produce a report, so an empty
//! [`PullRequestReport::reports`] means the pull request passes.

pub mod summary;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::rules::{ReviewerGroup, RuleType};
use crate::util::push_unique;

pub use summary::CheckData;

/// A non-approving fellow and the score their approval would add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredFellow {
    pub login: String,
    pub score: u32,
}

/// Rule-specific part of a failure report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ReportDetails {
    /// Not enough approvals from users and teams.
    #[default]
    Requirements,
    /// Not enough approvals from fellows of a given rank or above.
    #[serde(rename_all = "camelCase")]
    MissingRank { missing_rank: u8 },
    /// Enough approvals, but their combined rank score is too low.
    #[serde(rename_all = "camelCase")]
    MissingScore {
        current_score: u32,
        required_score: u32,
        candidates: Vec<ScoredFellow>,
    },
}

/// Why a rule failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleReport {
    pub name: String,
    pub rule_type: RuleType,
    /// Approvals still needed. Always greater than zero.
    pub missing_reviews: usize,
    /// Users whose approval would count towards the rule.
    pub missing_users: Vec<String>,
    /// Approvals that already counted towards the rule.
    pub counting_reviews: Vec<String>,
    #[serde(default)]
    pub users_to_request: Vec<String>,
    #[serde(default)]
    pub teams_to_request: Vec<String>,
    #[serde(default)]
    pub details: ReportDetails,
}

impl RuleReport {
    pub fn new(name: &str, rule_type: RuleType, missing_reviews: usize) -> Self {
        Self {
            name: name.to_string(),
            rule_type,
            missing_reviews,
            missing_users: Vec::new(),
            counting_reviews: Vec::new(),
            users_to_request: Vec::new(),
            teams_to_request: Vec::new(),
            details: ReportDetails::Requirements,
        }
    }

    pub fn with_missing_users(mut self, users: Vec<String>) -> Self {
        self.missing_users = users;
        self
    }

    pub fn with_counting_reviews(mut self, reviews: Vec<String>) -> Self {
        self.counting_reviews = reviews;
        self
    }

    pub fn with_requests(mut self, users: Vec<String>, teams: Vec<String>) -> Self {
        self.users_to_request = users;
        self.teams_to_request = teams;
        self
    }

    pub fn with_details(mut self, details: ReportDetails) -> Self {
        self.details = details;
        self
    }
}

/// Overall verdict of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conclusion {
    Success,
    Failure,
}

impl fmt::Display for Conclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
        }
    }
}

/// Users and teams to ask for a review.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub users: Vec<String>,
    pub teams: Vec<String>,
}

impl ReviewRequest {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.teams.is_empty()
    }
}

/// Failing rules for one pull request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestReport {
    pub modified_files: Vec<String>,
    pub reports: Vec<RuleReport>,
}

impl PullRequestReport {
    pub fn conclusion(&self) -> Conclusion {
        if self.reports.is_empty() {
            Conclusion::Success
        } else {
            Conclusion::Failure
        }
    }

    /// Union of the users and teams every failing rule wants to ask, minus
    /// the `prevent` list and the pull request author.
    pub fn reviewers_to_request(&self, prevent: Option<&ReviewerGroup>, author: &str) -> ReviewRequest {
        let mut request = ReviewRequest::default();
        for report in &self.reports {
            for user in &report.users_to_request {
                push_unique(&mut request.users, user);
            }
            for team in &report.teams_to_request {
                push_unique(&mut request.teams, team);
            }
        }

        if let Some(prevent) = prevent {
            if !prevent.users().is_empty() {
                tracing::info!("Filtering users to request a review from.");
                request.users.retain(|user| !prevent.users().contains(user));
            }
            if !prevent.teams().is_empty() {
                tracing::info!("Filtering teams to request a review from.");
                request.teams.retain(|team| !prevent.teams().contains(team));
            }
        }
        request.users.retain(|user| user != author);

        request
    }
}
