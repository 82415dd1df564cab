use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use review_gate::logging::{self, LogFormat};
use review_gate::report::Conclusion;

mod cmd;

#[derive(Parser)]
#[command(name = "review-gate")]
#[command(version, about = "Pull request review policy evaluator")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log output format (logs are written to stderr)
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse and validate a rules configuration file
    Validate {
        /// Path to the configuration file (YAML or JSON)
        config: PathBuf,
    },
    /// Evaluate a pull request snapshot offline
    Evaluate {
        #[arg(short, long)]
        config: PathBuf,

        /// Snapshot of the pull request (author, files, reviews, teams, fellows)
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Print the full outcome as JSON
        #[arg(long)]
        json: bool,

        /// Record the reviewers that would be requested
        #[arg(long)]
        request_reviewers: bool,
    },
    /// Evaluate a live pull request on GitHub and publish a check run
    Github {
        #[arg(short, long)]
        config: PathBuf,

        /// Repository as owner/repo or a GitHub URL
        #[arg(long)]
        repo: String,

        /// Pull request number
        #[arg(long)]
        pr: u64,

        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: String,

        /// Token with read:org scope for team lookups
        #[arg(long, env = "TEAM_TOKEN", hide_env_values = true)]
        team_token: Option<String>,

        /// Fellowship roster file (YAML or JSON list of login and rank)
        #[arg(long)]
        fellows: Option<PathBuf>,

        /// GitHub API base URL
        #[arg(long, env = "GITHUB_API_URL")]
        api_url: Option<String>,

        /// Link shown on the published check run
        #[arg(long)]
        details_url: Option<String>,

        /// Ask the missing reviewers for a review
        #[arg(long)]
        request_reviewers: bool,

        /// Print the full outcome as JSON
        #[arg(long)]
        json: bool,
    },
}

async fn run(cli: Cli) -> Result<Option<Conclusion>> {
    match cli.command {
        Commands::Validate { config } => {
            cmd::cmd_validate(&config)?;
            Ok(None)
        }
        Commands::Evaluate {
            config,
            snapshot,
            json,
            request_reviewers,
        } => {
            let conclusion = cmd::cmd_evaluate(&config, &snapshot, json, request_reviewers).await?;
            Ok(Some(conclusion))
        }
        Commands::Github {
            config,
            repo,
            pr,
            token,
            team_token,
            fellows,
            api_url,
            details_url,
            request_reviewers,
            json,
        } => {
            let args = cmd::github::GithubArgs {
                config,
                repo,
                pr,
                token,
                team_token,
                fellows,
                api_url,
                details_url,
                request_reviewers,
                json,
            };
            Ok(Some(cmd::cmd_github(&args).await?))
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_format);

    match run(cli).await {
        Ok(Some(Conclusion::Failure)) => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", console::style("Error:").red().bold(), e);
            ExitCode::from(2)
        }
    }
}
