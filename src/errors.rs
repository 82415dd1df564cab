//! Typed error hierarchy for review-gate.
//!
//! Two enums cover the two places a run can go wrong before any report exists:
//! - `ConfigError`: the configuration document cannot be read, parsed or validated
//! - `EngineError`: structural problems found while evaluating the rules
//!
//! A rule whose reviewers have not approved is *not* an error; that outcome is
//! a [`RuleReport`](crate::report::RuleReport).

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating a configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file at {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration file is invalid: {0}")]
    Parse(#[source] serde_yaml::Error),

    #[error("Configuration file is invalid: {0}")]
    Invalid(String),

    #[error("Configuration for rule '{rule}' is invalid: {message}")]
    InvalidRule { rule: String, message: String },

    #[error("Rule '{rule}': {kind} condition '{pattern}' is not a valid regex")]
    InvalidRegex {
        rule: String,
        kind: &'static str,
        pattern: String,
    },
}

/// Structural errors that abort a run. No partial report is produced.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Rule '{rule}' has a reviewer requirement without users or teams")]
    EmptyRequirement { rule: String },

    #[error(
        "Rule '{rule}' requires {required} approvals but only {available} users can approve. \
         The amount of required approvals is smaller than the amount of available users."
    )]
    InsufficientPool {
        rule: String,
        required: usize,
        available: usize,
    },

    #[error("Rule '{rule}': no users have been found with the rank {rank} or above")]
    NoFellowsOfRank { rule: String, rank: u8 },

    #[error("Rule '{rule}' has an invalid regular expression '{pattern}': {source}")]
    InvalidRegex {
        rule: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Rule '{rule}': rank {rank} is out of range for the score table (expected 1-9)")]
    UnknownRank { rule: String, rank: u8 },

    #[error("Rule '{rule}' sets a minimum total score but no score table is configured")]
    MissingScoreTable { rule: String },

    #[error("Failed to {action}: {source}")]
    External {
        action: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Rule '{rule}': failed to {action}: {source}")]
    Lookup {
        rule: String,
        action: String,
        #[source]
        source: anyhow::Error,
    },
}

impl EngineError {
    pub(crate) fn external(action: impl Into<String>, source: anyhow::Error) -> Self {
        Self::External {
            action: action.into(),
            source,
        }
    }

    /// Attach the rule being evaluated to a failed collaborator call.
    pub(crate) fn in_rule(self, rule: &str) -> Self {
        match self {
            Self::External { action, source } => Self::Lookup {
                rule: rule.to_string(),
                action,
                source,
            },
            other => other,
        }
    }
}
