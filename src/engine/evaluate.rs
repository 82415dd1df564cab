//! One evaluator per rule kind.
//!
//! Every evaluator returns `Ok(None)` when the rule is satisfied and
//! `Ok(Some(report))` when reviews are missing. Structural problems are
//! returned as [`EngineError`] and abort the run.

use super::approvals::ApprovalSet;
use super::context::RunContext;
use super::distinct::{DistinctGroup, can_assign};
use super::resolver::resolve_requirement;
use crate::errors::EngineError;
use crate::report::{ReportDetails, RuleReport, ScoredFellow};
use crate::rules::{FellowsRequirement, RankScoreTable, ReviewerRequirement, Rule, RuleKind};
use crate::util::{concat_unique, push_unique};

/// How far a set of candidates is from satisfying a minimum.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Measure {
    missing_reviews: usize,
    missing_users: Vec<String>,
    counting_reviews: Vec<String>,
}

/// Compare candidates against approvals.
///
/// The author is left out of `missing_users` unless named in `explicit_users`.
fn measure(
    candidates: &[String],
    min_approvals: usize,
    approvals: &ApprovalSet,
    author: &str,
    explicit_users: &[String],
) -> Measure {
    let mut counting_reviews = Vec::new();
    let mut missing_users = Vec::new();
    for login in candidates {
        if approvals.contains(login) {
            push_unique(&mut counting_reviews, login);
        } else if login != author || explicit_users.contains(login) {
            push_unique(&mut missing_users, login);
        }
    }
    Measure {
        missing_reviews: min_approvals.saturating_sub(counting_reviews.len()),
        missing_users,
        counting_reviews,
    }
}

pub async fn evaluate_rule(
    ctx: &RunContext<'_>,
    rule: &Rule,
    score: Option<&RankScoreTable>,
) -> Result<Option<RuleReport>, EngineError> {
    match &rule.kind {
        RuleKind::Basic(requirement) => evaluate_basic(ctx, rule, requirement).await,
        RuleKind::And { reviewers } => evaluate_and(ctx, rule, reviewers).await,
        RuleKind::Or { reviewers } => evaluate_or(ctx, rule, reviewers).await,
        RuleKind::AndDistinct { reviewers } => evaluate_and_distinct(ctx, rule, reviewers).await,
        RuleKind::Fellows(requirement) => evaluate_fellows(ctx, rule, requirement, score).await,
    }
}

/// Evaluate a single requirement as if it were the whole rule.
async fn check_requirement(
    ctx: &RunContext<'_>,
    rule: &Rule,
    requirement: &ReviewerRequirement,
) -> Result<Option<RuleReport>, EngineError> {
    let approvals = ctx.approvals(rule.count_author).await?;
    let resolved = resolve_requirement(ctx, &rule.name, requirement).await?;
    let measured = measure(
        &resolved,
        requirement.min_approvals,
        &approvals,
        ctx.author(),
        requirement.users(),
    );

    if measured.missing_reviews == 0 {
        return Ok(None);
    }

    tracing::warn!(
        rule = %rule.name,
        "Not enough approvals. Need at least {} and got {}",
        requirement.min_approvals,
        measured.counting_reviews.len()
    );
    Ok(Some(
        RuleReport::new(&rule.name, rule.rule_type(), measured.missing_reviews)
            .with_missing_users(measured.missing_users)
            .with_counting_reviews(measured.counting_reviews)
            .with_requests(requirement.users().to_vec(), requirement.teams().to_vec()),
    ))
}

/// Fold `other` into `report`, deduplicating every list.
fn merge_lists(report: &mut RuleReport, other: &RuleReport) {
    report.missing_users = concat_unique(&report.missing_users, &other.missing_users);
    report.counting_reviews = concat_unique(&report.counting_reviews, &other.counting_reviews);
    report.users_to_request = concat_unique(&report.users_to_request, &other.users_to_request);
    report.teams_to_request = concat_unique(&report.teams_to_request, &other.teams_to_request);
}

async fn evaluate_basic(
    ctx: &RunContext<'_>,
    rule: &Rule,
    requirement: &ReviewerRequirement,
) -> Result<Option<RuleReport>, EngineError> {
    check_requirement(ctx, rule, requirement).await
}

async fn evaluate_and(
    ctx: &RunContext<'_>,
    rule: &Rule,
    reviewers: &[ReviewerRequirement],
) -> Result<Option<RuleReport>, EngineError> {
    let mut aggregate: Option<RuleReport> = None;
    for requirement in reviewers {
        let Some(failure) = check_requirement(ctx, rule, requirement).await? else {
            continue;
        };
        match aggregate.as_mut() {
            None => aggregate = Some(failure),
            Some(report) => {
                report.missing_reviews += failure.missing_reviews;
                merge_lists(report, &failure);
            }
        }
    }
    Ok(aggregate)
}

async fn evaluate_or(
    ctx: &RunContext<'_>,
    rule: &Rule,
    reviewers: &[ReviewerRequirement],
) -> Result<Option<RuleReport>, EngineError> {
    let mut aggregate: Option<RuleReport> = None;
    for requirement in reviewers {
        let Some(failure) = check_requirement(ctx, rule, requirement).await? else {
            tracing::info!(rule = %rule.name, "One of the requirements is fulfilled");
            return Ok(None);
        };
        match aggregate.as_mut() {
            None => aggregate = Some(failure),
            Some(report) => {
                report.missing_reviews = report.missing_reviews.min(failure.missing_reviews);
                merge_lists(report, &failure);
            }
        }
    }
    Ok(aggregate)
}

async fn evaluate_and_distinct(
    ctx: &RunContext<'_>,
    rule: &Rule,
    reviewers: &[ReviewerRequirement],
) -> Result<Option<RuleReport>, EngineError> {
    let approvals = ctx.approvals(rule.count_author).await?;

    let mut groups: Vec<DistinctGroup> = Vec::with_capacity(reviewers.len());
    for requirement in reviewers {
        let candidates = resolve_requirement(ctx, &rule.name, requirement).await?;
        groups.push(DistinctGroup {
            candidates,
            min_approvals: requirement.min_approvals,
        });
    }
    let total: usize = groups.iter().map(|group| group.min_approvals).sum();

    let approvals_per_group: Vec<usize> = groups
        .iter()
        .map(|group| {
            group
                .candidates
                .iter()
                .filter(|login| approvals.contains(login))
                .count()
        })
        .collect();

    let satisfied = if approvals.len() < total {
        tracing::warn!(
            rule = %rule.name,
            "Not enough approvals. Need at least {} and got {}",
            total,
            approvals.len()
        );
        false
    } else if approvals_per_group.contains(&0) {
        tracing::warn!(rule = %rule.name, "One of the groups does not have any approvals");
        false
    } else if groups
        .iter()
        .zip(&approvals_per_group)
        .any(|(group, approved)| *approved < group.min_approvals)
    {
        tracing::warn!(
            rule = %rule.name,
            "Not enough positive reviews to match a subcondition"
        );
        false
    } else if can_assign(&groups, approvals.logins()) {
        true
    } else {
        tracing::warn!(
            rule = %rule.name,
            "Didn't find any matches to match all the rules requirements"
        );
        false
    };

    if satisfied {
        return Ok(None);
    }

    let mut report = RuleReport::new(&rule.name, rule.rule_type(), total);
    for (group, requirement) in groups.iter().zip(reviewers) {
        let measured = measure(
            &group.candidates,
            group.min_approvals,
            &approvals,
            ctx.author(),
            requirement.users(),
        );
        let partial = RuleReport::new(&rule.name, rule.rule_type(), total)
            .with_missing_users(measured.missing_users)
            .with_counting_reviews(measured.counting_reviews)
            .with_requests(requirement.users().to_vec(), requirement.teams().to_vec());
        merge_lists(&mut report, &partial);
    }
    Ok(Some(report))
}

async fn evaluate_fellows(
    ctx: &RunContext<'_>,
    rule: &Rule,
    requirement: &FellowsRequirement,
    score: Option<&RankScoreTable>,
) -> Result<Option<RuleReport>, EngineError> {
    let approvals = ctx.approvals(rule.count_author).await?;
    let qualifying = ctx.fellows_of_rank(requirement.min_rank).await?;
    if qualifying.is_empty() {
        return Err(EngineError::NoFellowsOfRank {
            rule: rule.name.clone(),
            rank: requirement.min_rank,
        });
    }
    if qualifying.len() < requirement.min_approvals {
        return Err(EngineError::InsufficientPool {
            rule: rule.name.clone(),
            required: requirement.min_approvals,
            available: qualifying.len(),
        });
    }

    let measured = measure(
        &qualifying,
        requirement.min_approvals,
        &approvals,
        ctx.author(),
        &[],
    );
    if measured.missing_reviews > 0 {
        tracing::warn!(
            rule = %rule.name,
            "Not enough approvals. Need at least {} and got {}",
            requirement.min_approvals,
            measured.counting_reviews.len()
        );
        return Ok(Some(
            RuleReport::new(&rule.name, rule.rule_type(), measured.missing_reviews)
                .with_missing_users(measured.missing_users)
                .with_counting_reviews(measured.counting_reviews)
                .with_details(ReportDetails::MissingRank {
                    missing_rank: requirement.min_rank,
                }),
        ));
    }

    let Some(required_score) = requirement.min_total_score else {
        return Ok(None);
    };
    let table = score.ok_or_else(|| EngineError::MissingScoreTable {
        rule: rule.name.clone(),
    })?;

    let mut current_score: u32 = 0;
    let mut counting_reviews = Vec::new();
    let mut candidates: Vec<ScoredFellow> = Vec::new();
    for fellow in ctx.fellows().await? {
        let fellow_score = table.score_for(fellow.rank).ok_or_else(|| EngineError::UnknownRank {
            rule: rule.name.clone(),
            rank: fellow.rank,
        })?;
        if approvals.contains(&fellow.login) {
            current_score = current_score.saturating_add(fellow_score);
            push_unique(&mut counting_reviews, &fellow.login);
        } else if fellow_score > 0 && fellow.login != ctx.author() {
            candidates.push(ScoredFellow {
                login: fellow.login,
                score: fellow_score,
            });
        }
    }
    tracing::debug!(rule = %rule.name, current_score, required_score, "Computed fellowship score");

    if current_score >= required_score {
        return Ok(None);
    }

    tracing::warn!(
        rule = %rule.name,
        "Not enough score. Need at least {} and got {}",
        required_score,
        current_score
    );
    candidates.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.login.cmp(&b.login)));
    let missing_users = candidates.iter().map(|fellow| fellow.login.clone()).collect();
    Ok(Some(
        RuleReport::new(&rule.name, rule.rule_type(), 1)
            .with_missing_users(missing_users)
            .with_counting_reviews(counting_reviews)
            .with_details(ReportDetails::MissingScore {
                current_score,
                required_score,
                candidates,
            }),
    ))
}
