// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Dispatch to the appropriate subcommand handler
//    - run: start the Scanner -> Filter -> Revealer pipeline
//    - resolve: unshorten the URLs given on the command line
// 3. Exit with proper code (0 = success, 1 = some URLs failed, 2 = error)
//
// Rust concepts used:
// - async/await: The pipeline stages are tokio tasks
// - Arc: Shares the pattern set and queues between tasks
// - Result<T, E>: For error handling
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - config file loading
mod error; // src/error.rs - error types
mod feed; // src/feed/ - where comments come from
mod logging; // src/logging.rs - tracing setup
mod patterns; // src/patterns.rs - regexes and service list
mod pipeline; // src/pipeline/ - the three stages and their queues
mod reply; // src/reply.rs - what to do with revealed links
mod resolver; // src/resolver/ - following redirects

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{error, info};

use cli::{Cli, Commands};
use config::Config;
use error::UnshortenError;
use feed::PushshiftFeed;
use patterns::{PatternSet, ShortUrlServices};
use pipeline::{Filter, Queue, Revealer, Scanner};
use reply::LogReplier;
use resolver::{HttpResolver, Unshortener};

// How many command-line URLs are resolved at the same time
const RESOLVE_CONCURRENCY: usize = 8;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.log_json);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = everything resolved (or was not shortened)
//   Ok(1) = at least one URL could not be resolved
//   Err = config or startup error
async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Run {
            config,
            services,
            subreddit,
        } => handle_run(&config, services.as_deref(), subreddit).await,
        Commands::Resolve { urls, json, config } => {
            handle_resolve(urls, json, config.as_deref()).await
        }
    }
}

// Handles the 'run' subcommand
//
// Builds everything from the config, spawns one task per stage and waits
// until one of them ends or the user presses Ctrl-C. Items still sitting in
// the queues at that point are dropped.
async fn handle_run(
    config_path: &Path,
    services_override: Option<&Path>,
    subreddit_override: Option<String>,
) -> Result<i32> {
    info!(config = %config_path.display(), "program started");

    let mut config = Config::load(config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;
    if let Some(path) = services_override {
        config.patterns.services_path = path.to_path_buf();
    }
    if subreddit_override.is_some() {
        config.feed.subreddit = subreddit_override;
    }

    let services = ShortUrlServices::load(&config.patterns.services_path).with_context(|| {
        "please check the service list file or patterns.services_path in the config"
    })?;
    info!(count = services.len(), "loaded short-url services");

    let patterns = Arc::new(PatternSet::new(&config.patterns, services)?);
    info!(
        subreddit = config.feed.subreddit.as_deref().unwrap_or("all"),
        "subreddits to scan"
    );

    let feed_client = reqwest::Client::builder()
        .timeout(config.resolver.request_timeout())
        .user_agent(config.resolver.user_agent.clone())
        .build()
        .context("building feed HTTP client")?;
    let feed = Arc::new(PushshiftFeed::new(feed_client, &config.feed));

    let resolver = HttpResolver::new(&config.resolver).context("building resolver HTTP client")?;
    let unshortener = Unshortener::from_config(resolver, &config.resolver);

    // Queue A: candidates waiting for the Filter
    // Queue B: short-link matches waiting for the Revealer
    let to_filter = Arc::new(Queue::new());
    let to_reveal = Arc::new(Queue::new());

    let scanner = Scanner::new(feed, Arc::clone(&patterns), Arc::clone(&to_filter), &config.scanner);
    let filter = Filter::new(Arc::clone(&patterns), to_filter, Arc::clone(&to_reveal));
    let revealer = Revealer::new(patterns, to_reveal, unshortener, Arc::new(LogReplier));

    let scan_task = tokio::spawn(scanner.run());
    let filter_task = tokio::spawn(filter.run());
    let reveal_task = tokio::spawn(revealer.run());

    // The stages loop forever; getting past this select means something
    // stopped them
    tokio::select! {
        result = scan_task => error!(?result, "scanner stopped"),
        result = filter_task => error!(?result, "filter stopped"),
        result = reveal_task => error!(?result, "revealer stopped"),
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted, shutting down");
            return Ok(0);
        }
    }

    Ok(2)
}

// What happened to one URL given on the command line
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum ResolveStatus {
    /// Resolved to somewhere else
    Revealed { resolved_url: String },
    /// Resolved to itself
    NotShortened,
    /// Every attempt failed
    Failed { message: String },
}

#[derive(Debug, Clone, Serialize)]
struct ResolveReport {
    url: String,
    #[serde(flatten)]
    status: ResolveStatus,
}

impl ResolveReport {
    fn is_ok(&self) -> bool {
        !matches!(self.status, ResolveStatus::Failed { .. })
    }
}

// Handles the 'resolve' subcommand
//
// Parameters:
//   urls: URLs from the command line, with or without scheme
//   json: whether to output JSON format
//   config_path: optional config for retry/timeout settings
async fn handle_resolve(urls: Vec<String>, json: bool, config_path: Option<&Path>) -> Result<i32> {
    let config = match config_path {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };

    let resolver = HttpResolver::new(&config.resolver).context("building resolver HTTP client")?;
    let unshortener = Unshortener::from_config(resolver, &config.resolver);

    // Results come back in the order the URLs were given
    let reports: Vec<ResolveReport> = stream::iter(urls)
        .map(|url| {
            let unshortener = &unshortener;
            async move {
                let status = match unshortener.unshorten(&url).await {
                    Ok(resolved_url) => ResolveStatus::Revealed { resolved_url },
                    Err(UnshortenError::NotShortened { .. }) => ResolveStatus::NotShortened,
                    Err(e) => ResolveStatus::Failed {
                        message: e.to_string(),
                    },
                };
                ResolveReport { url, status }
            }
        })
        .buffered(RESOLVE_CONCURRENCY)
        .collect()
        .await;

    print_results(&reports, json)?;

    let failed = reports.iter().filter(|r| !r.is_ok()).count();
    Ok(if failed > 0 { 1 } else { 0 })
}

// Prints the results either as a table or JSON
fn print_results(reports: &[ResolveReport], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(reports)?);
    } else {
        print_table(reports);
    }
    Ok(())
}

// Prints results as a human-readable table in the terminal
fn print_table(reports: &[ResolveReport]) {
    println!("{:<40} {:<15} {:<50}", "URL", "STATUS", "DESTINATION");
    println!("{}", "=".repeat(105));

    for report in reports {
        let (status, detail) = match &report.status {
            ResolveStatus::Revealed { resolved_url } => ("REVEALED", resolved_url.as_str()),
            ResolveStatus::NotShortened => ("NOT SHORTENED", ""),
            ResolveStatus::Failed { message } => ("FAILED", message.as_str()),
        };
        println!("{:<40} {:<15} {:<50}", truncate(&report.url, 37), status, detail);
    }

    println!();

    let failed = reports.iter().filter(|r| !r.is_ok()).count();
    println!("Summary:");
    println!("   Resolved: {}", reports.len() - failed);
    println!("   Failed: {}", failed);
}

// Shortens long strings for table display
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}
