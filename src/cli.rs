// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Rust concepts:
// - Structs: Custom data types that group related data
// - Enums: Types that can be one of several variants
// - Derive macros: Automatically generate code for our types
// =============================================================================

use std::path::PathBuf;

use clap::{Parser, Subcommand};

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "url-unshortener",
    version,
    about = "Finds shortened links in a comment feed and reveals where they point",
    long_about = "url-unshortener watches a comment feed for links to short-url services \
                  (bit.ly, ow.ly, ...), follows each one through its redirects and reports \
                  the real destination."
)]
pub struct Cli {
    /// Write logs as JSON lines instead of plain text
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

// This enum defines our subcommands (run, resolve)
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch the comment feed and reveal short links as they appear
    ///
    /// Example: url-unshortener run --config urlunshortener.toml
    Run {
        /// Path to the TOML config file
        #[arg(long, short, default_value = "urlunshortener.toml")]
        config: PathBuf,

        /// Short-url service list, overrides patterns.services_path
        #[arg(long)]
        services: Option<PathBuf>,

        /// Subreddit to scan, overrides feed.subreddit
        #[arg(long)]
        subreddit: Option<String>,
    },

    /// Resolve one or more URLs right now and print where they lead
    ///
    /// Example: url-unshortener resolve bit.ly/3xYz http://ow.ly/h4p230754Gt
    Resolve {
        /// URLs to resolve (the http:// prefix is optional)
        #[arg(required = true)]
        urls: Vec<String>,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,

        /// Path to a TOML config file for retry/timeout settings
        #[arg(long, short)]
        config: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_defaults() {
        let cli = Cli::parse_from(["url-unshortener", "run"]);
        match cli.command {
            Commands::Run { config, services, subreddit } => {
                assert_eq!(config, PathBuf::from("urlunshortener.toml"));
                assert!(services.is_none());
                assert!(subreddit.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(!cli.log_json);
    }

    #[test]
    fn test_resolve_takes_several_urls() {
        let cli = Cli::parse_from(["url-unshortener", "resolve", "bit.ly/a", "ow.ly/b", "--json", "--log-json"]);
        match cli.command {
            Commands::Resolve { urls, json, config } => {
                assert_eq!(urls, vec!["bit.ly/a", "ow.ly/b"]);
                assert!(json);
                assert!(config.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(cli.log_json);
    }

    #[test]
    fn test_resolve_needs_a_url() {
        assert!(Cli::try_parse_from(["url-unshortener", "resolve"]).is_err());
    }
}
