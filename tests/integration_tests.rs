//! Integration tests for review-gate
//!
//! These tests drive the binary end to end with configuration and snapshot
//! files written to a temporary directory.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to create a review-gate Command
fn review_gate() -> Command {
    cargo_bin_cmd!("review-gate")
}

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

const CONFIG: &str = r#"
rules:
  - name: Core developers
    condition:
      include: ['^src/']
      exclude: ['\.md$']
    type: basic
    teams: [core]
    minApprovals: 2
  - name: Docs
    condition:
      include: ['^docs/']
    type: basic
    users: [writer]
preventReviewRequests:
  users: [bot]
"#;

fn snapshot(approvers: &[&str]) -> String {
    let mut reviews = String::new();
    for (i, login) in approvers.iter().enumerate() {
        reviews.push_str(&format!(
            "  - authorLogin: {login}\n    authorId: {id}\n    reviewId: {review}\n    state: approved\n",
            id = i + 1,
            review = 100 + i
        ));
    }
    if reviews.is_empty() {
        reviews.push_str("  []\n");
    }
    format!(
        "author: alice\nfiles: [src/lib.rs, README.md]\nreviews:\n{reviews}teams:\n  core: [bob, carol, dave]\n"
    )
}

// =============================================================================
// Basic CLI Tests
// =============================================================================

mod cli_basics {
    use super::*;

    #[test]
    fn test_help() {
        review_gate().arg("--help").assert().success();
    }

    #[test]
    fn test_version() {
        review_gate().arg("--version").assert().success();
    }

    #[test]
    fn test_github_requires_repo() {
        review_gate()
            .args(["github", "--config", "rules.yml", "--pr", "1"])
            .assert()
            .failure();
    }
}

// =============================================================================
// Validate Tests
// =============================================================================

mod validate {
    use super::*;

    #[test]
    fn test_valid_config() {
        let dir = TempDir::new().unwrap();
        let config = write(&dir, "rules.yml", CONFIG);

        review_gate()
            .arg("validate")
            .arg(&config)
            .assert()
            .success()
            .stdout(predicate::str::contains("Config is valid!"))
            .stdout(predicate::str::contains("Core developers"));
    }

    #[test]
    fn test_json_config_is_accepted() {
        let dir = TempDir::new().unwrap();
        let config = write(
            &dir,
            "rules.json",
            r#"{"rules": [{"name": "All", "condition": {"include": [".*"]}, "type": "basic", "users": ["bob"]}]}"#,
        );

        review_gate().arg("validate").arg(&config).assert().success();
    }

    #[test]
    fn test_duplicate_rule_names_rejected() {
        let dir = TempDir::new().unwrap();
        let config = write(
            &dir,
            "rules.yml",
            r#"
rules:
  - name: Same
    condition: { include: ['.*'] }
    type: basic
    users: [bob]
  - name: Same
    condition: { include: ['.*'] }
    type: basic
    users: [carol]
"#,
        );

        review_gate()
            .arg("validate")
            .arg(&config)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Same"));
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let dir = TempDir::new().unwrap();
        let config = write(
            &dir,
            "rules.yml",
            r#"
rules:
  - name: Broken
    condition: { include: ['(unclosed'] }
    type: basic
    users: [bob]
"#,
        );

        review_gate()
            .arg("validate")
            .arg(&config)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Broken"));
    }

    #[test]
    fn test_missing_file_reported() {
        let dir = TempDir::new().unwrap();
        review_gate()
            .arg("validate")
            .arg(dir.path().join("nope.yml"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("nope.yml"));
    }
}

// =============================================================================
// Evaluate Tests
// =============================================================================

mod evaluate {
    use super::*;

    #[test]
    fn test_passing_pull_request() {
        let dir = TempDir::new().unwrap();
        let config = write(&dir, "rules.yml", CONFIG);
        let snapshot = write(&dir, "pr.yml", &snapshot(&["bob", "carol"]));

        review_gate()
            .args(["evaluate", "--config"])
            .arg(&config)
            .arg("--snapshot")
            .arg(&snapshot)
            .assert()
            .success()
            .stdout(predicate::str::contains("All required reviews fulfilled"));
    }

    #[test]
    fn test_failing_pull_request_exits_with_one() {
        let dir = TempDir::new().unwrap();
        let config = write(&dir, "rules.yml", CONFIG);
        let snapshot = write(&dir, "pr.yml", &snapshot(&["bob"]));

        review_gate()
            .args(["evaluate", "--config"])
            .arg(&config)
            .arg("--snapshot")
            .arg(&snapshot)
            .assert()
            .code(1)
            .stdout(predicate::str::contains("Missing reviews from Core developers"))
            .stdout(predicate::str::contains("carol"));
    }

    #[test]
    fn test_json_output() {
        let dir = TempDir::new().unwrap();
        let config = write(&dir, "rules.yml", CONFIG);
        let snapshot = write(&dir, "pr.yml", &snapshot(&[]));

        let output = review_gate()
            .args(["evaluate", "--json", "--request-reviewers", "--config"])
            .arg(&config)
            .arg("--snapshot")
            .arg(&snapshot)
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(1));

        let outcome: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(outcome["conclusion"], "failure");
        let report = &outcome["report"]["reports"][0];
        assert_eq!(report["name"], "Core developers");
        assert_eq!(report["missingReviews"], 2);
        assert_eq!(outcome["requested"]["teams"][0], "core");
    }

    #[test]
    fn test_unknown_team_is_an_error() {
        let dir = TempDir::new().unwrap();
        let config = write(
            &dir,
            "rules.yml",
            r#"
rules:
  - name: Ghosts
    condition: { include: ['.*'] }
    type: basic
    teams: [ghosts]
"#,
        );
        let snapshot = write(&dir, "pr.yml", &snapshot(&[]));

        review_gate()
            .args(["evaluate", "--config"])
            .arg(&config)
            .arg("--snapshot")
            .arg(&snapshot)
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Rule 'Ghosts'"))
            .stderr(predicate::str::contains("ghosts"));
    }

    #[test]
    fn test_fellows_rule_from_snapshot() {
        let dir = TempDir::new().unwrap();
        let config = write(
            &dir,
            "rules.yml",
            r#"
rules:
  - name: Fellowship
    condition: { include: ['.*'] }
    type: fellows
    minRank: 2
    minApprovals: 1
    minTotalScore: 3
score:
  dan2: 1
  dan3: 2
"#,
        );
        let snapshot = write(
            &dir,
            "pr.yml",
            r#"
author: alice
files: [src/lib.rs]
reviews:
  - authorLogin: bob
    authorId: 2
    reviewId: 10
    state: approved
fellows:
  - login: bob
    rank: 2
  - login: carol
    rank: 3
"#,
        );

        review_gate()
            .args(["evaluate", "--config"])
            .arg(&config)
            .arg("--snapshot")
            .arg(&snapshot)
            .assert()
            .code(1)
            .stdout(predicate::str::contains("carol"));
    }
}
