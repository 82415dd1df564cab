//! Markdown rendering of a [`PullRequestReport`] for check runs and the CLI.

use serde::{Deserialize, Serialize};
use std::fmt::Write;

use super::{Conclusion, PullRequestReport, ReportDetails, RuleReport};
use crate::util::to_handle;

const RULES_DOCUMENTATION: &str =
    "For more info found out how the rules work in the review-gate rule types documentation.";

/// Payload of a published check result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckData {
    pub conclusion: Conclusion,
    pub title: String,
    pub summary: String,
    pub text: String,
}

impl CheckData {
    pub fn from_report(report: &PullRequestReport) -> Self {
        let conclusion = report.conclusion();
        let (title, summary) = match conclusion {
            Conclusion::Success => (
                "All required reviews fulfilled".to_string(),
                "# All rules passed".to_string(),
            ),
            Conclusion::Failure => {
                let names: Vec<&str> = report.reports.iter().map(|r| r.name.as_str()).collect();
                (
                    format!("Missing reviews from {}", names.join(", ")),
                    format!(
                        "# {} rule{} failed",
                        report.reports.len(),
                        plural(report.reports.len())
                    ),
                )
            }
        };

        let text = report
            .reports
            .iter()
            .map(render_rule)
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            conclusion,
            title,
            summary,
            text,
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

fn push_list(out: &mut String, heading: &str, items: impl IntoIterator<Item = String>) {
    let items: Vec<String> = items.into_iter().collect();
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "### {}\n", heading);
    for item in items {
        let _ = writeln!(out, "- {}", item);
    }
    out.push('\n');
}

/// One markdown section for a failing rule.
pub fn render_rule(report: &RuleReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "## {}\n", report.name);
    let _ = writeln!(
        out,
        "#### Missing {} review{}\n",
        report.missing_reviews,
        plural(report.missing_reviews)
    );
    let _ = writeln!(
        out,
        "<details><summary>Rule explanation</summary>\n\n{}\n\n{}\n\n</details>\n",
        report.rule_type.explanation(),
        RULES_DOCUMENTATION
    );

    match &report.details {
        ReportDetails::Requirements => {
            push_list(
                &mut out,
                "Missing users",
                report.missing_users.iter().map(|u| to_handle(u)),
            );
            push_list(
                &mut out,
                "Missing reviews from teams",
                report.teams_to_request.iter().cloned(),
            );
        }
        ReportDetails::MissingRank { missing_rank } => {
            let _ = writeln!(
                out,
                "### Missing reviews from Fellows\n\nMissing reviews from rank `{}` or above\n",
                missing_rank
            );
            push_list(
                &mut out,
                &format!("GitHub users who are rank {} or above", missing_rank),
                report.missing_users.iter().map(|u| to_handle(u)),
            );
        }
        ReportDetails::MissingScore {
            current_score,
            required_score,
            candidates,
        } => {
            let _ = writeln!(
                out,
                "### Missing fellowship score\n\nCurrent score is `{}` and the rule requires `{}`\n",
                current_score, required_score
            );
            push_list(
                &mut out,
                "Fellows whose approval adds to the score",
                candidates
                    .iter()
                    .map(|c| format!("{} (score {})", to_handle(&c.login), c.score)),
            );
        }
    }

    push_list(
        &mut out,
        "Users approvals that counted towards this rule",
        report.counting_reviews.iter().map(|u| to_handle(u)),
    );

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ScoredFellow;
    use crate::rules::RuleType;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_success_check() {
        let check = CheckData::from_report(&PullRequestReport::default());
        assert_eq!(check.conclusion, Conclusion::Success);
        assert_eq!(check.title, "All required reviews fulfilled");
        assert!(check.text.is_empty());
    }

    #[test]
    fn test_failure_check_names_rules() {
        let report = PullRequestReport {
            modified_files: strings(&["src/a.rs"]),
            reports: vec![
                RuleReport::new("Core", RuleType::Basic, 1),
                RuleReport::new("Docs", RuleType::Or, 2),
            ],
        };
        let check = CheckData::from_report(&report);
        assert_eq!(check.conclusion, Conclusion::Failure);
        assert_eq!(check.title, "Missing reviews from Core, Docs");
        assert_eq!(check.summary, "# 2 rules failed");
        assert!(check.text.contains("## Core"));
        assert!(check.text.contains("## Docs"));
        assert!(check.text.contains("Missing 2 reviews"));
    }

    #[test]
    fn test_render_common_failure_lists_every_field() {
        let report = RuleReport::new("Core", RuleType::Basic, 1)
            .with_missing_users(strings(&["b", "c"]))
            .with_counting_reviews(strings(&["a"]))
            .with_requests(strings(&["b"]), strings(&["core"]));
        let text = render_rule(&report);
        assert!(text.contains("#### Missing 1 review\n"));
        assert!(text.contains("- @b\n- @c"));
        assert!(text.contains("### Missing reviews from teams\n\n- core"));
        assert!(text.contains("### Users approvals that counted towards this rule\n\n- @a"));
        assert!(text.contains("Rule 'Basic'"));
    }

    #[test]
    fn test_render_missing_rank() {
        let report = RuleReport::new("Fellows", RuleType::Fellows, 1)
            .with_missing_users(strings(&["f1"]))
            .with_details(ReportDetails::MissingRank { missing_rank: 4 });
        let text = render_rule(&report);
        assert!(text.contains("rank `4` or above"));
        assert!(text.contains("- @f1"));
    }

    #[test]
    fn test_render_missing_score() {
        let report = RuleReport::new("Score", RuleType::Fellows, 1).with_details(
            ReportDetails::MissingScore {
                current_score: 3,
                required_score: 10,
                candidates: vec![ScoredFellow {
                    login: "f2".into(),
                    score: 8,
                }],
            },
        );
        let text = render_rule(&report);
        assert!(text.contains("Current score is `3` and the rule requires `10`"));
        assert!(text.contains("- @f2 (score 8)"));
    }
}
