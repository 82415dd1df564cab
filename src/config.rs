//! Loading and validating the policy configuration document.
//!
//! The document may be written in YAML or JSON; both go through `serde_yaml`
//! since JSON is valid YAML. Validation checks what the type system cannot:
//! unique rule names, compilable regexes, non-empty requirements and the
//! numeric bounds of every rule.

use regex::Regex;
use std::collections::HashSet;
use std::path::Path;

use crate::errors::ConfigError;
use crate::rules::{ConfigurationFile, RankScoreTable, ReviewerRequirement, Rule, RuleKind};

impl ConfigurationFile {
    /// Read, parse and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Obtained configuration file");
        Self::parse(&content)
    }

    /// Parse and validate a configuration document.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: ConfigurationFile = serde_yaml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the parsed document, returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rules.is_empty() {
            return Err(ConfigError::Invalid("at least one rule is required".into()));
        }

        let mut names = HashSet::new();
        for rule in &self.rules {
            if !names.insert(rule.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "rule name '{}' is used more than once",
                    rule.name
                )));
            }
            validate_rule(rule, self.score.as_ref())?;
        }

        if let Some(prevent) = &self.prevent_review_requests {
            if prevent.users().is_empty() && prevent.teams().is_empty() {
                return Err(ConfigError::Invalid(
                    "preventReviewRequests must list users or teams".into(),
                ));
            }
        }

        Ok(())
    }
}

fn invalid(rule: &Rule, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidRule {
        rule: rule.name.clone(),
        message: message.into(),
    }
}

fn validate_rule(rule: &Rule, score: Option<&RankScoreTable>) -> Result<(), ConfigError> {
    if rule.name.trim().is_empty() {
        return Err(ConfigError::Invalid("rule name must not be empty".into()));
    }
    if rule.condition.include.is_empty() {
        return Err(invalid(rule, "condition.include must list at least one pattern"));
    }
    validate_patterns(rule, "Include", &rule.condition.include)?;
    validate_patterns(rule, "Exclude", rule.condition.excludes())?;

    if let Some(skip) = &rule.allowed_to_skip_rule {
        if skip.users().is_empty() && skip.teams().is_empty() {
            return Err(invalid(rule, "allowedToSkipRule must list users or teams"));
        }
    }

    match &rule.kind {
        RuleKind::Basic(requirement) => validate_requirement(rule, requirement),
        RuleKind::And { reviewers }
        | RuleKind::Or { reviewers }
        | RuleKind::AndDistinct { reviewers } => {
            if reviewers.len() < 2 {
                return Err(invalid(rule, "reviewers must have at least 2 entries"));
            }
            reviewers
                .iter()
                .try_for_each(|requirement| validate_requirement(rule, requirement))
        }
        RuleKind::Fellows(fellows) => {
            if !(1..=RankScoreTable::MAX_RANK).contains(&fellows.min_rank) {
                return Err(invalid(
                    rule,
                    format!("minRank must be between 1 and {}", RankScoreTable::MAX_RANK),
                ));
            }
            if fellows.min_approvals < 1 {
                return Err(invalid(rule, "minApprovals must be at least 1"));
            }
            if fellows.min_total_score.is_some() && score.is_none() {
                return Err(invalid(
                    rule,
                    "minTotalScore requires a 'score' table in the configuration",
                ));
            }
            Ok(())
        }
    }
}

fn validate_requirement(rule: &Rule, requirement: &ReviewerRequirement) -> Result<(), ConfigError> {
    if requirement.users().is_empty() && requirement.teams().is_empty() {
        return Err(invalid(rule, "each reviewer requirement must list users or teams"));
    }
    if requirement.min_approvals < 1 {
        return Err(invalid(rule, "minApprovals must be at least 1"));
    }
    Ok(())
}

fn validate_patterns(rule: &Rule, kind: &'static str, patterns: &[String]) -> Result<(), ConfigError> {
    for pattern in patterns {
        if let Err(err) = Regex::new(pattern) {
            tracing::error!(rule = %rule.name, %pattern, error = %err, "Invalid regular expression");
            return Err(ConfigError::InvalidRegex {
                rule: rule.name.clone(),
                kind,
                pattern: pattern.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const VALID: &str = r#"
rules:
  - name: Core
    condition:
      include: ['^src/']
      exclude: ['\.md$']
    type: basic
    teams: [core]
    minApprovals: 2
  - name: Runtime
    condition:
      include: ['^runtime/']
    type: or
    reviewers:
      - users: [alice]
      - teams: [runtime]
        minApprovals: 2
preventReviewRequests:
  teams: [bots]
"#;

    fn assert_rule_error(yaml: &str, needle: &str) {
        let err = ConfigurationFile::parse(yaml).unwrap_err();
        let message = err.to_string();
        assert!(
            message.contains(needle),
            "expected '{}' in '{}'",
            needle,
            message
        );
    }

    #[test]
    fn test_parse_valid_config() {
        let config = ConfigurationFile::parse(VALID).unwrap();
        assert_eq!(config.rules.len(), 2);
        assert_eq!(
            config.prevent_review_requests.unwrap().teams(),
            ["bots".to_string()]
        );
        assert!(config.score.is_none());
    }

    #[test]
    fn test_parse_json_config() {
        let json = r#"{"rules":[{"name":"Docs","condition":{"include":["docs"]},"type":"basic","users":["a"]}]}"#;
        let config = ConfigurationFile::parse(json).unwrap();
        assert_eq!(config.rules[0].name, "Docs");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("review-gate.yml");
        fs::write(&path, VALID).unwrap();
        let config = ConfigurationFile::load(&path).unwrap();
        assert_eq!(config.rules[0].name, "Core");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = ConfigurationFile::load(&dir.path().join("nope.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFailed { .. }));
    }

    #[test]
    fn test_duplicate_rule_names_rejected() {
        let yaml = r#"
rules:
  - { name: A, condition: { include: [x] }, type: basic, users: [u] }
  - { name: A, condition: { include: [y] }, type: basic, users: [v] }
"#;
        assert_rule_error(yaml, "more than once");
    }

    #[test]
    fn test_requirement_without_users_or_teams_rejected() {
        let yaml = "rules:\n  - { name: A, condition: { include: [x] }, type: basic, minApprovals: 1 }\n";
        assert_rule_error(yaml, "users or teams");
    }

    #[test]
    fn test_zero_min_approvals_rejected() {
        let yaml = "rules:\n  - { name: A, condition: { include: [x] }, type: basic, users: [u], minApprovals: 0 }\n";
        assert_rule_error(yaml, "at least 1");
    }

    #[test]
    fn test_compound_rule_needs_two_reviewers() {
        let yaml = r#"
rules:
  - name: Single
    condition: { include: [x] }
    type: and
    reviewers:
      - users: [u]
"#;
        assert_rule_error(yaml, "at least 2");
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let yaml = "rules:\n  - { name: A, condition: { include: ['(oops'] }, type: basic, users: [u] }\n";
        let err = ConfigurationFile::parse(yaml).unwrap_err();
        match err {
            ConfigError::InvalidRegex { rule, kind, pattern } => {
                assert_eq!(rule, "A");
                assert_eq!(kind, "Include");
                assert_eq!(pattern, "(oops");
            }
            other => panic!("Expected InvalidRegex, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_rule_type_rejected() {
        let yaml = "rules:\n  - { name: A, condition: { include: [x] }, type: debug, size: 2 }\n";
        assert!(matches!(
            ConfigurationFile::parse(yaml),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_fellows_rank_bounds() {
        let yaml = "rules:\n  - { name: F, condition: { include: [x] }, type: fellows, minRank: 12 }\n";
        assert_rule_error(yaml, "minRank");
    }

    #[test]
    fn test_min_total_score_requires_score_table() {
        let yaml = "rules:\n  - { name: F, condition: { include: [x] }, type: fellows, minRank: 1, minTotalScore: 5 }\n";
        assert_rule_error(yaml, "score");

        let with_table = format!("{}score:\n  dan1: 1\n", yaml);
        assert!(ConfigurationFile::parse(&with_table).is_ok());
    }

    #[test]
    fn test_empty_rules_rejected() {
        assert!(ConfigurationFile::parse("rules: []").is_err());
    }
}
