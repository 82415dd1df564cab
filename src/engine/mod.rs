//! Rule evaluation engine.
//!
//! [`ReviewEngine::evaluate`] walks the configured rules in order. For each
//! rule it matches the modified files against the rule condition, skips the
//! rule when nothing matched or when the author is exempt, and otherwise runs
//! the evaluator for the rule kind. Failing rules become [`RuleReport`]s in
//! the returned [`PullRequestReport`].
//!
//! All lookups go through a [`RunContext`] created for the call, so repeated
//! evaluations never share cached state.
//!
//! [`RuleReport`]: crate::report::RuleReport

pub mod approvals;
pub mod context;
pub mod distinct;
pub mod evaluate;
pub mod resolver;

pub use approvals::ApprovalSet;
pub use context::RunContext;

use crate::errors::EngineError;
use crate::github::{FellowsApi, PullRequestApi, TeamApi};
use crate::report::PullRequestReport;
use crate::rules::{CompiledCondition, ConfigurationFile, Rule};

/// Evaluates a configuration against one pull request.
pub struct ReviewEngine<'a> {
    pr: &'a dyn PullRequestApi,
    teams: &'a dyn TeamApi,
    fellows: &'a dyn FellowsApi,
}

impl<'a> ReviewEngine<'a> {
    pub fn new(pr: &'a dyn PullRequestApi, teams: &'a dyn TeamApi, fellows: &'a dyn FellowsApi) -> Self {
        Self { pr, teams, fellows }
    }

    pub async fn evaluate(&self, config: &ConfigurationFile) -> Result<PullRequestReport, EngineError> {
        let ctx = RunContext::new(self.pr, self.teams, self.fellows);
        let modified_files = ctx.modified_files().await?;
        let mut reports = Vec::new();

        for rule in &config.rules {
            tracing::info!(rule = %rule.name, rule_type = %rule.rule_type(), "Validating rule");
            let condition = CompiledCondition::compile(&rule.name, &rule.condition)?;
            let matched = condition.matching_files(&modified_files);
            if matched.is_empty() {
                tracing::info!("Skipping rule {} as no condition matched", rule.name);
                continue;
            }
            tracing::debug!(rule = %rule.name, files = ?matched, "Files matched the rule condition");

            if author_may_skip(&ctx, rule).await.map_err(|e| e.in_rule(&rule.name))? {
                tracing::info!("Skipping rule {} as author belong to greenlight rule.", rule.name);
                continue;
            }

            let outcome = evaluate::evaluate_rule(&ctx, rule, config.score.as_ref())
                .await
                .map_err(|e| e.in_rule(&rule.name))?;
            match outcome {
                Some(report) => {
                    tracing::error!(
                        rule = %rule.name,
                        missing_reviews = report.missing_reviews,
                        "Missing the reviews from {:?}",
                        report.missing_users
                    );
                    reports.push(report);
                }
                None => tracing::info!(rule = %rule.name, "Rule passed"),
            }
        }

        Ok(PullRequestReport {
            modified_files,
            reports,
        })
    }
}

/// Whether the author belongs to the rule's `allowedToSkipRule` group.
async fn author_may_skip(ctx: &RunContext<'_>, rule: &Rule) -> Result<bool, EngineError> {
    let Some(group) = &rule.allowed_to_skip_rule else {
        return Ok(false);
    };
    let author = ctx.author();
    if group.users().iter().any(|user| user == author) {
        return Ok(true);
    }
    for team in group.teams() {
        if ctx.team_members(team).await?.iter().any(|member| member == author) {
            return Ok(true);
        }
    }
    Ok(false)
}
