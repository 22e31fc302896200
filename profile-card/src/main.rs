// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Command-line interface for the profile card renderer.
//!
//! Every option can also be supplied through the environment, which is how
//! the scheduled workflow drives the binary.

use std::{convert::Infallible, path::PathBuf, process, time::Duration};

use chrono::Local;
use clap::{ArgAction, Args, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use profile_card::{
    CardConfig, DEFAULT_BIRTHDAY, DEFAULT_DARK_OUTPUT, DEFAULT_LIGHT_OUTPUT, DEFAULT_REFERENCE_DIR,
    Error, MetricsBundle, RenderMode, RenderPlan, format_age, github, load_ascii_lines,
    render_cards
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Command line interface for rendering the dark and light profile cards.
#[derive(Debug, Parser)]
#[command(name = "profile-card", version, about = "Render dark and light GitHub profile cards")]
struct Cli {
    /// GitHub login whose follower count is shown.
    #[arg(long = "user", env = "USER_NAME", value_name = "LOGIN")]
    user: Option<String>,

    /// Personal access token used for the GraphQL API.
    #[arg(long = "token", env = "ACCESS_TOKEN", value_name = "TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Birthday used for the uptime line, formatted as YYYY-MM-DD.
    #[arg(long = "birthday", env = "BIRTHDAY", value_name = "DATE", default_value = DEFAULT_BIRTHDAY)]
    birthday: String,

    /// Build cards from a blank canvas instead of patching templates.
    #[arg(
        long = "generate",
        env = "GENERATE_SVG",
        value_name = "BOOL",
        default_value = "0",
        action = ArgAction::Set,
        value_parser = parse_flag
    )]
    generate: bool,

    /// Optional YAML file with profile fields and ASCII sources.
    #[arg(long = "config", env = "CARD_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory holding the reference templates.
    #[arg(
        long = "reference-dir",
        env = "REFERENCE_DIR",
        value_name = "DIR",
        default_value = DEFAULT_REFERENCE_DIR
    )]
    reference_dir: PathBuf,

    /// Output path of the dark card.
    #[arg(long = "dark-output", value_name = "PATH", default_value = DEFAULT_DARK_OUTPUT)]
    dark_output: PathBuf,

    /// Output path of the light card.
    #[arg(long = "light-output", value_name = "PATH", default_value = DEFAULT_LIGHT_OUTPUT)]
    light_output: PathBuf,

    #[command(flatten)]
    metrics: MetricArgs
}

/// Precomputed metric values.
#[derive(Debug, Args)]
struct MetricArgs {
    /// Follower count; skips the GitHub API call when set.
    #[arg(long = "followers", env = "FOLLOWERS", value_name = "COUNT")]
    followers: Option<u64>,

    /// Commit count.
    #[arg(long = "commits", value_name = "COUNT", default_value_t = 0)]
    commits: u64,

    /// Star count.
    #[arg(long = "stars", value_name = "COUNT", default_value_t = 0)]
    stars: u64,

    /// Repository count.
    #[arg(long = "repos", value_name = "COUNT", default_value_t = 0)]
    repos: u64,

    /// Contributed repository count.
    #[arg(long = "contributions", value_name = "COUNT", default_value_t = 0)]
    contributions: u64,

    /// Lines of code added.
    #[arg(long = "loc-added", value_name = "COUNT", default_value_t = 0)]
    loc_added: u64,

    /// Lines of code deleted.
    #[arg(long = "loc-deleted", value_name = "COUNT", default_value_t = 0)]
    loc_deleted: u64
}

/// Entry point that reports errors and sets the appropriate exit status.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();

    if let Err(error) = run(Cli::parse()).await {
        eprintln!("{}", error.to_display_string());
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Executes the CLI using parsed arguments.
///
/// # Errors
///
/// Propagates configuration, GitHub API, template and write errors.
async fn run(cli: Cli) -> Result<(), Error> {
    let config = match cli.config.as_deref() {
        Some(path) => CardConfig::load(path)?,
        None => CardConfig::default()
    };

    let followers = resolve_followers(&cli).await?;
    let metrics = collect_metrics(&cli, followers);
    debug!(?metrics, "collected metrics");

    let plan = RenderPlan {
        outputs:        vec![cli.dark_output.clone(), cli.light_output.clone()],
        reference_dir:  cli.reference_dir.clone(),
        mode:           if cli.generate { RenderMode::Generate } else { RenderMode::Patch },
        title:          cli.user.clone().unwrap_or_default(),
        ascii_lines:    load_ascii_lines(&config.ascii_sources),
        profile_fields: config.profile_fields
    };

    let cards = render_cards(&plan, &metrics)?;
    info!(cards = cards.len(), "profile cards updated");

    Ok(())
}

fn collect_metrics(cli: &Cli, followers: u64) -> MetricsBundle {
    MetricsBundle {
        age: format_age(&cli.birthday, Local::now().date_naive()),
        followers,
        commits: cli.metrics.commits,
        stars: cli.metrics.stars,
        repositories: cli.metrics.repos,
        contributions: cli.metrics.contributions,
        lines_added: cli.metrics.loc_added,
        lines_deleted: cli.metrics.loc_deleted
    }
}

async fn resolve_followers(cli: &Cli) -> Result<u64, Error> {
    if let Some(followers) = cli.metrics.followers {
        debug!(followers, "using precomputed follower count");
        return Ok(followers);
    }

    let user = required(cli.user.as_deref(), "USER_NAME")?;
    let token = required(cli.token.as_deref(), "ACCESS_TOKEN")?;
    let client = github::client(token)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Fetching followers for {user}..."));

    let result = github::fetch_follower_count(&client, user).await;
    spinner.finish_and_clear();

    let followers = result?;
    info!(user, followers, "fetched follower count");
    Ok(followers)
}

fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, Error> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| Error::configuration(format!("{name} must be set")))
}

/// Parses boolean-like flag values such as `1`, `true` or `no`.
///
/// Unrecognized values select patch mode rather than aborting the run.
fn parse_flag(raw: &str) -> Result<bool, Infallible> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => {
            warn!(value = other, "unrecognized GENERATE_SVG value, patching templates");
            Ok(false)
        }
    }
}
