//! Expansion of a reviewer requirement into the logins that may satisfy it.

use super::context::RunContext;
use crate::errors::EngineError;
use crate::rules::ReviewerRequirement;
use crate::util::push_unique;

/// Listed users first, then team members in team order, deduplicated.
pub async fn resolve_reviewers(
    ctx: &RunContext<'_>,
    users: &[String],
    teams: &[String],
) -> Result<Vec<String>, EngineError> {
    let mut resolved: Vec<String> = Vec::new();
    for user in users {
        push_unique(&mut resolved, user);
    }
    for team in teams {
        for member in ctx.team_members(team).await? {
            push_unique(&mut resolved, &member);
        }
    }
    Ok(resolved)
}

/// Resolve a requirement and check that enough people exist to satisfy it.
pub async fn resolve_requirement(
    ctx: &RunContext<'_>,
    rule: &str,
    requirement: &ReviewerRequirement,
) -> Result<Vec<String>, EngineError> {
    if requirement.users().is_empty() && requirement.teams().is_empty() {
        return Err(EngineError::EmptyRequirement {
            rule: rule.to_string(),
        });
    }

    let resolved = resolve_reviewers(ctx, requirement.users(), requirement.teams()).await?;
    if resolved.len() < requirement.min_approvals {
        return Err(EngineError::InsufficientPool {
            rule: rule.to_string(),
            required: requirement.min_approvals,
            available: resolved.len(),
        });
    }
    Ok(resolved)
}
