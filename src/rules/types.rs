//! Rule and reviewer-requirement data model.
//!
//! A configuration document deserializes into [`ConfigurationFile`]. Each
//! [`Rule`] carries the fields every rule shares plus a [`RuleKind`], the
//! tagged union selected by the `type` field:
//!
//! ```yaml
//! rules:
//!   - name: Core developers
//!     condition:
//!       include: ['^src/']
//!       exclude: ['\.md$']
//!     type: basic
//!     teams: [core-devs]
//!     minApprovals: 2
//!   - name: Audit
//!     condition:
//!       include: ['^runtime/']
//!     type: and-distinct
//!     reviewers:
//!       - teams: [core-devs]
//!         minApprovals: 1
//!       - users: [auditor]
//!         minApprovals: 1
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;


/// The rule kinds the engine knows how to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleType {
    Basic,
    And,
    Or,
    AndDistinct,
    Fellows,
}

impl RuleType {
    /// Human-readable explanation of how the rule kind is satisfied.
    pub fn explanation(&self) -> &'static str {
        match self {
            Self::Basic => "Rule 'Basic' requires a given amount of reviews from users/teams",
            Self::And => {
                "Rule 'And' has many required reviewers/teams and requires all of them to be fulfilled."
            }
            Self::Or => {
                "Rule 'Or' has many required reviewers/teams and requires at least one of them to be fulfilled."
            }
            Self::AndDistinct => {
                "Rule 'And Distinct' has many required reviewers/teams and requires all of them to be \
                 fulfilled **by different users**.\n\nThe approval of one user that belongs to _two teams_ \
                 will count only towards one team."
            }
            Self::Fellows => {
                "Rule 'Fellows' requires a given amount of reviews from users whose Fellowship ranking \
                 is the required rank or greater."
            }
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Basic => "basic",
            Self::And => "and",
            Self::Or => "or",
            Self::AndDistinct => "and-distinct",
            Self::Fellows => "fellows",
        };
        write!(f, "{}", s)
    }
}

/// File-matching condition of a rule. Patterns are regular expressions
/// searched anywhere in the path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub include: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,
}

impl Condition {
    pub fn excludes(&self) -> &[String] {
        self.exclude.as_deref().unwrap_or(&[])
    }
}

/// A set of users and teams without an approval count.
///
/// Used for `allowedToSkipRule` and `preventReviewRequests`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewerGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teams: Option<Vec<String>>,
}

impl ReviewerGroup {
    pub fn users(&self) -> &[String] {
        self.users.as_deref().unwrap_or(&[])
    }

    pub fn teams(&self) -> &[String] {
        self.teams.as_deref().unwrap_or(&[])
    }
}

fn default_min_approvals() -> usize {
    1
}

/// Users and teams whose approvals count, and how many are needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewerRequirement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teams: Option<Vec<String>>,
    #[serde(default = "default_min_approvals", alias = "min_approvals")]
    pub min_approvals: usize,
}

impl ReviewerRequirement {
    pub fn new(users: &[&str], teams: &[&str], min_approvals: usize) -> Self {
        let to_owned = |items: &[&str]| -> Option<Vec<String>> {
            (!items.is_empty()).then(|| items.iter().map(|s| s.to_string()).collect())
        };
        Self {
            users: to_owned(users),
            teams: to_owned(teams),
            min_approvals,
        }
    }

    pub fn users(&self) -> &[String] {
        self.users.as_deref().unwrap_or(&[])
    }

    pub fn teams(&self) -> &[String] {
        self.teams.as_deref().unwrap_or(&[])
    }
}

/// Requirement of a `fellows` rule: approvals from ranked fellowship members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FellowsRequirement {
    pub min_rank: u8,
    #[serde(default = "default_min_approvals", alias = "min_approvals")]
    pub min_approvals: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_total_score: Option<u32>,
}

/// Rule-kind specific payload, tagged by the `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RuleKind {
    Basic(ReviewerRequirement),
    And { reviewers: Vec<ReviewerRequirement> },
    Or { reviewers: Vec<ReviewerRequirement> },
    AndDistinct { reviewers: Vec<ReviewerRequirement> },
    Fellows(FellowsRequirement),
}

impl RuleKind {
    pub fn rule_type(&self) -> RuleType {
        match self {
            Self::Basic(_) => RuleType::Basic,
            Self::And { .. } => RuleType::And,
            Self::Or { .. } => RuleType::Or,
            Self::AndDistinct { .. } => RuleType::AndDistinct,
            Self::Fellows(_) => RuleType::Fellows,
        }
    }
}

/// One named policy clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub name: String,
    pub condition: Condition,
    /// Whether the pull request author counts as an approver.
    #[serde(default)]
    pub count_author: bool,
    /// Authors belonging to this group skip the rule entirely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_to_skip_rule: Option<ReviewerGroup>,
    #[serde(flatten)]
    pub kind: RuleKind,
}

impl Rule {
    pub fn rule_type(&self) -> RuleType {
        self.kind.rule_type()
    }
}

/// On-disk shape of the score table: one entry per fellowship rank.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct DanScores {
    #[serde(default)]
    dan1: u32,
    #[serde(default)]
    dan2: u32,
    #[serde(default)]
    dan3: u32,
    #[serde(default)]
    dan4: u32,
    #[serde(default)]
    dan5: u32,
    #[serde(default)]
    dan6: u32,
    #[serde(default)]
    dan7: u32,
    #[serde(default)]
    dan8: u32,
    #[serde(default)]
    dan9: u32,
}

/// Score awarded to an approval from each fellowship rank (1 through 9).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DanScores", into = "DanScores")]
pub struct RankScoreTable {
    scores: [u32; RankScoreTable::MAX_RANK as usize],
}

impl RankScoreTable {
    pub const MAX_RANK: u8 = 9;

    pub fn new(scores: [u32; Self::MAX_RANK as usize]) -> Self {
        Self { scores }
    }

    /// Score for a rank, or `None` for ranks outside 1..=9.
    pub fn score_for(&self, rank: u8) -> Option<u32> {
        match rank {
            1..=Self::MAX_RANK => Some(self.scores[usize::from(rank - 1)]),
            _ => None,
        }
    }
}

impl From<DanScores> for RankScoreTable {
    fn from(d: DanScores) -> Self {
        Self::new([
            d.dan1, d.dan2, d.dan3, d.dan4, d.dan5, d.dan6, d.dan7, d.dan8, d.dan9,
        ])
    }
}

impl From<RankScoreTable> for DanScores {
    fn from(t: RankScoreTable) -> Self {
        let [dan1, dan2, dan3, dan4, dan5, dan6, dan7, dan8, dan9] = t.scores;
        Self {
            dan1,
            dan2,
            dan3,
            dan4,
            dan5,
            dan6,
            dan7,
            dan8,
            dan9,
        }
    }
}

/// The whole policy document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationFile {
    pub rules: Vec<Rule>,
    /// Users and teams that must never be asked for a review.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prevent_review_requests: Option<ReviewerGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<RankScoreTable>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_rule_deserializes_flattened_requirement() {
        let yaml = r#"
name: Core
condition:
  include: ["^src/"]
type: basic
teams: [core]
minApprovals: 2
"#;
        let rule: Rule = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(rule.name, "Core");
        assert!(!rule.count_author);
        match &rule.kind {
            RuleKind::Basic(req) => {
                assert_eq!(req.teams(), ["core".to_string()]);
                assert!(req.users().is_empty());
                assert_eq!(req.min_approvals, 2);
            }
            other => panic!("Expected basic rule, got {:?}", other),
        }
    }

    #[test]
    fn test_min_approvals_defaults_to_one_and_accepts_snake_case() {
        let req: ReviewerRequirement = serde_yaml::from_str("users: [a]").unwrap();
        assert_eq!(req.min_approvals, 1);

        let req: ReviewerRequirement =
            serde_yaml::from_str("users: [a, b]\nmin_approvals: 2").unwrap();
        assert_eq!(req.min_approvals, 2);
    }

    #[test]
    fn test_and_distinct_tag_is_kebab_case() {
        let yaml = r#"
name: Audit
condition:
  include: [".*"]
  exclude: null
type: and-distinct
countAuthor: true
reviewers:
  - users: [a]
  - teams: [t]
    minApprovals: 2
"#;
        let rule: Rule = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(rule.rule_type(), RuleType::AndDistinct);
        assert!(rule.count_author);
        assert!(rule.condition.excludes().is_empty());
        match rule.kind {
            RuleKind::AndDistinct { reviewers } => {
                assert_eq!(reviewers.len(), 2);
                assert_eq!(reviewers[1].min_approvals, 2);
            }
            other => panic!("Expected and-distinct rule, got {:?}", other),
        }
    }

    #[test]
    fn test_fellows_rule_with_score() {
        let yaml = r#"
name: Fellows
condition:
  include: ["runtime"]
type: fellows
minRank: 3
minApprovals: 2
minTotalScore: 10
"#;
        let rule: Rule = serde_yaml::from_str(yaml).unwrap();
        match rule.kind {
            RuleKind::Fellows(req) => {
                assert_eq!(req.min_rank, 3);
                assert_eq!(req.min_approvals, 2);
                assert_eq!(req.min_total_score, Some(10));
            }
            other => panic!("Expected fellows rule, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_rule_type_is_rejected() {
        let yaml = "name: x\ncondition:\n  include: [a]\ntype: debug\n";
        assert!(serde_yaml::from_str::<Rule>(yaml).is_err());
    }

    #[test]
    fn test_score_table_missing_ranks_default_to_zero() {
        let table: RankScoreTable = serde_yaml::from_str("dan1: 1\ndan3: 5\ndan9: 20").unwrap();
        assert_eq!(table.score_for(1), Some(1));
        assert_eq!(table.score_for(2), Some(0));
        assert_eq!(table.score_for(3), Some(5));
        assert_eq!(table.score_for(9), Some(20));
    }

    #[test]
    fn test_score_table_rejects_out_of_range_rank() {
        let table = RankScoreTable::default();
        assert_eq!(table.score_for(0), None);
        assert_eq!(table.score_for(10), None);
    }

    #[test]
    fn test_rule_type_display_matches_tag() {
        assert_eq!(RuleType::AndDistinct.to_string(), "and-distinct");
        assert_eq!(RuleType::Fellows.to_string(), "fellows");
        assert!(RuleType::AndDistinct.explanation().contains("different users"));
    }
}
