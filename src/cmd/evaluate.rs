//! Offline evaluation command: `review-gate evaluate`.

use anyhow::{Context, Result};
use std::path::Path;

use review_gate::report::Conclusion;
use review_gate::runner::RunOutcome;

pub async fn cmd_evaluate(
    config_path: &Path,
    snapshot_path: &Path,
    json: bool,
    request_reviewers: bool,
) -> Result<Conclusion> {
    use review_gate::rules::ConfigurationFile;
    use review_gate::runner::{ActionRunner, RunOptions};
    use review_gate::snapshot::SnapshotSource;

    let config = ConfigurationFile::load(config_path)
        .with_context(|| format!("Invalid configuration at {}", config_path.display()))?;
    let source = SnapshotSource::load(snapshot_path)?;

    let outcome = ActionRunner::new(&source, &source, &source, &source)
        .run(&config, RunOptions { request_reviewers })
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }
    Ok(outcome.conclusion)
}

/// Human-readable rendering of a run on stdout.
pub fn print_outcome(outcome: &RunOutcome) {
    println!();
    match outcome.conclusion {
        Conclusion::Success => println!("{}", console::style(&outcome.check.title).green().bold()),
        Conclusion::Failure => println!("{}", console::style(&outcome.check.title).red().bold()),
    }
    println!(
        "{}",
        console::style(format!(
            "{} modified file(s) checked",
            outcome.report.modified_files.len()
        ))
        .dim()
    );
    println!();

    if !outcome.check.text.is_empty() {
        println!("{}", outcome.check.text);
    }

    if let Some(request) = &outcome.requested {
        println!("{}", console::style("Requested reviews").bold());
        for user in &request.users {
            println!("  - @{}", user);
        }
        for team in &request.teams {
            println!("  - team {}", team);
        }
        println!();
    }
}
