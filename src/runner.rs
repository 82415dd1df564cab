//! One end-to-end run: evaluate, request reviewers, publish the verdict.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::engine::ReviewEngine;
use crate::github::{ChecksApi, FellowsApi, PullRequestApi, TeamApi};
use crate::report::{CheckData, Conclusion, PullRequestReport, ReviewRequest};
use crate::rules::ConfigurationFile;

/// Switches for a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Ask the missing reviewers for a review.
    pub request_reviewers: bool,
}

/// Everything a run decided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutcome {
    pub conclusion: Conclusion,
    pub report: PullRequestReport,
    pub check: CheckData,
    /// The request that was sent, if any.
    pub requested: Option<ReviewRequest>,
}

pub struct ActionRunner<'a> {
    pr: &'a dyn PullRequestApi,
    teams: &'a dyn TeamApi,
    fellows: &'a dyn FellowsApi,
    checks: &'a dyn ChecksApi,
}

impl<'a> ActionRunner<'a> {
    pub fn new(
        pr: &'a dyn PullRequestApi,
        teams: &'a dyn TeamApi,
        fellows: &'a dyn FellowsApi,
        checks: &'a dyn ChecksApi,
    ) -> Self {
        Self {
            pr,
            teams,
            fellows,
            checks,
        }
    }

    /// Evaluate the pull request and publish the result.
    ///
    /// An evaluation error returns before anything is requested or published.
    pub async fn run(&self, config: &ConfigurationFile, options: RunOptions) -> Result<RunOutcome> {
        let report = ReviewEngine::new(self.pr, self.teams, self.fellows)
            .evaluate(config)
            .await
            .context("Failed to evaluate the pull request")?;
        let conclusion = report.conclusion();
        tracing::info!(%conclusion, failing_rules = report.reports.len(), "Evaluation finished");

        let mut requested = None;
        if options.request_reviewers {
            let request =
                report.reviewers_to_request(config.prevent_review_requests.as_ref(), self.pr.author());
            if request.is_empty() {
                tracing::info!("No reviewers to request");
            } else {
                self.pr
                    .request_review(&request)
                    .await
                    .context("Failed to request reviewers")?;
                requested = Some(request);
            }
        }

        let check = CheckData::from_report(&report);
        self.checks
            .publish_check(&check)
            .await
            .context("Failed to publish check")?;

        Ok(RunOutcome {
            conclusion,
            report,
            check,
            requested,
        })
    }
}
