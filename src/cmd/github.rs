//! Live run against the GitHub API: `review-gate github`.

use anyhow::{Context, Result};
use std::path::PathBuf;

use review_gate::report::Conclusion;

use super::evaluate::print_outcome;

/// Inputs for a live run.
pub struct GithubArgs {
    pub config: PathBuf,
    pub repo: String,
    pub pr: u64,
    pub token: String,
    /// Token used for organization team lookups. Defaults to `token`.
    pub team_token: Option<String>,
    pub fellows: Option<PathBuf>,
    pub api_url: Option<String>,
    pub details_url: Option<String>,
    pub request_reviewers: bool,
    pub json: bool,
}

pub async fn cmd_github(args: &GithubArgs) -> Result<Conclusion> {
    use review_gate::fellows::FellowsRoster;
    use review_gate::github::client::is_valid_github_token;
    use review_gate::github::{
        CheckRunClient, GitHubClient, PullRequestApi, PullRequestClient, RepoSlug, TeamClient,
    };
    use review_gate::rules::ConfigurationFile;
    use review_gate::runner::{ActionRunner, RunOptions};

    let repo = RepoSlug::parse(&args.repo)
        .with_context(|| format!("'{}' is not an owner/repo slug or GitHub URL", args.repo))?;
    let config = ConfigurationFile::load(&args.config)
        .with_context(|| format!("Invalid configuration at {}", args.config.display()))?;

    if args.token.is_empty() {
        anyhow::bail!("A GitHub token is required (--token or GITHUB_TOKEN)");
    }
    if !is_valid_github_token(&args.token) {
        tracing::warn!("GitHub token does not have a known prefix");
    }
    let team_token = args.team_token.as_deref().unwrap_or(&args.token);

    let client = |token: &str| match &args.api_url {
        Some(url) => GitHubClient::with_api_url(token, url),
        None => GitHubClient::new(token),
    };

    let pull_request = PullRequestClient::fetch(client(&args.token), repo.clone(), args.pr)
        .await
        .with_context(|| format!("Failed to load pull request {}#{}", repo, args.pr))?;
    let teams = TeamClient::new(client(team_token), &repo.owner);
    let fellows = match &args.fellows {
        Some(path) => FellowsRoster::load(path)?,
        None => FellowsRoster::default(),
    };
    let checks = CheckRunClient::new(
        client(&args.token),
        repo.clone(),
        pull_request.head_sha(),
        args.details_url.clone(),
    );

    tracing::info!(%repo, pr = args.pr, author = pull_request.author(), "Evaluating pull request");
    let outcome = ActionRunner::new(&pull_request, &teams, &fellows, &checks)
        .run(
            &config,
            RunOptions {
                request_reviewers: args.request_reviewers,
            },
        )
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }
    Ok(outcome.conclusion)
}
