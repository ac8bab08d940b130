use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tweetie_common::OutputFormat;
use tweetie_common::observability::{LogConfig, init_logging};
use tweetie_config::{TweetieConfig, TweetieConfigLoader};
use tweetie_http::HttpClient;
use tweetie_social::twitter::{TwitterApi, authenticate_with};
mod render;

const DEFAULT_CONFIG_FILE: &str = "tweetie.yaml";

/// Collect a Twitter account's recent posts or followed accounts.
#[derive(Debug, Parser)]
#[command(name = "tweetie", version)]
struct Cli {
    /// YAML config file. Without this flag `tweetie.yaml` is used if present.
    #[arg(long, env = "TWEETIE_CONFIG")]
    config: Option<PathBuf>,

    /// Credential file (`consumer_key, consumer_secret, access_token, access_token_secret`)
    #[arg(long)]
    credentials: Option<PathBuf>,

    /// Output format: text or json
    #[arg(long, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Accounts followed by ACCOUNT (default command)
    Following { account: Option<String> },
    /// Recent posts of ACCOUNT with their sentiment scores
    Tweets { account: Option<String> },
    /// Profile of ACCOUNT
    Profile { account: Option<String> },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Load config (env wins over file)
    let cfg = load_config(cli.config.as_deref())?;

    // 2) Logging from the merged config; RUST_LOG still overrides the level
    let log_path = init_logging(LogConfig {
        app_name: "tweetie",
        log_dir: cfg.logging.dir.clone(),
        emit_stderr: cfg.logging.emit_stderr,
        format: cfg.logging.format,
        default_filter: cfg.logging.level.clone(),
    })?;
    tracing::debug!(log_file = %log_path.display(), "tweetie.start");

    // 3) Authenticate (local only; rejected keys surface on the first request)
    let api = build_api(&cfg, cli.credentials)?;

    let command = cli.command.unwrap_or(Command::Following { account: None });
    let mut stdout = std::io::stdout();
    match command {
        Command::Following { account } => {
            let account = account.unwrap_or_else(|| cfg.account.clone());
            let following = api.fetch_following(&account).await?;
            render::following(&mut stdout.lock(), &following, cli.format)?;
        }
        Command::Tweets { account } => {
            let account = account.unwrap_or_else(|| cfg.account.clone());
            let summary = api.fetch_tweets(&account).await?;
            render::tweets(&mut stdout.lock(), &summary, cli.format)?;
        }
        Command::Profile { account } => {
            let account = account.unwrap_or_else(|| cfg.account.clone());
            let user = api.get_user(&account).await?;
            render::profile(&mut stdout.lock(), &user, cli.format)?;
        }
    }
    Ok(())
}

fn load_config(explicit: Option<&std::path::Path>) -> Result<TweetieConfig> {
    let loader = match explicit {
        Some(path) => TweetieConfigLoader::new().with_file(path),
        None => TweetieConfigLoader::new().with_optional_file(DEFAULT_CONFIG_FILE),
    };
    loader.load().context("failed to load configuration")
}

fn build_api(cfg: &TweetieConfig, credentials: Option<PathBuf>) -> Result<TwitterApi> {
    let credentials = credentials.unwrap_or_else(|| cfg.credentials_file.clone());
    let http = HttpClient::new(&cfg.api_base)?
        .with_timeout(Duration::from_secs(cfg.http.timeout_secs))
        .with_retries(cfg.http.max_retries);

    let api = authenticate_with(&credentials, http)
        .with_context(|| format!("failed to authenticate with {}", credentials.display()))?;
    Ok(api
        .with_timeline_count(cfg.timeline_count)
        .with_friends_page_size(cfg.friends_page_size))
}
