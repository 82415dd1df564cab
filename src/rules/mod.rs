//! Policy rules: the data model and file-condition matching.

pub mod condition;
pub mod types;

pub use condition::CompiledCondition;
pub use types::{
    Condition, ConfigurationFile, FellowsRequirement, RankScoreTable, ReviewerGroup,
    ReviewerRequirement, Rule, RuleKind, RuleType,
};
