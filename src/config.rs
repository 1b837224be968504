// src/config.rs
// =============================================================================
// Configuration loading.
//
// Everything lives in one TOML file (urlunshortener.toml by default). Every
// section and every key is optional, so an empty file gives you the defaults
// below. The short-url service list is a separate plain-text file, one service
// per line.
//
// Example:
//   [scanner]
//   max_comment_length = 1000
//
//   [patterns]
//   services_path = "shorturl-services.txt"
//
//   [resolver]
//   max_attempts = 3
//   retry_delay_secs = 5
//
//   [feed]
//   subreddit = "all"
// =============================================================================

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scanner: ScannerConfig,
    pub patterns: PatternConfig,
    pub resolver: ResolverConfig,
    pub feed: FeedConfig,
}

impl Config {
    /// Reads and parses a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}

/// Scanner settings: which comments are eligible and how often to poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Comments with this many characters or more are skipped
    pub max_comment_length: usize,
    /// Sleep after reaching the newest page
    pub idle_interval_secs: u64,
    /// Sleep between pages while catching up
    pub active_interval_secs: u64,
}

impl ScannerConfig {
    pub fn idle_interval(&self) -> Duration {
        Duration::from_secs(self.idle_interval_secs)
    }

    pub fn active_interval(&self) -> Duration {
        Duration::from_secs(self.active_interval_secs)
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            max_comment_length: 1000,
            idle_interval_secs: 30,
            active_interval_secs: 1,
        }
    }
}

/// Pattern strings plus where to find the service list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    pub loose: String,
    pub strict: String,
    pub extraction: String,
    pub services_path: PathBuf,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            loose: r"(?i)[a-z0-9-]+\.[a-z]{2,}/\S+".to_string(),
            strict: r"(?i)(?:https?://)?(?:[a-z0-9-]+\.)+[a-z]{2,}/[a-z0-9_-]+ ?".to_string(),
            extraction: r"(?i)(?:https?://)?(?:[a-z0-9-]+\.)+[a-z]{2,}/[a-z0-9_-]+".to_string(),
            services_path: PathBuf::from("shorturl-services.txt"),
        }
    }
}

/// Retry and HTTP settings for resolving links.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub max_attempts: u32,
    pub retry_delay_secs: u64,
    pub max_hops: usize,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl ResolverConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay_secs: 5,
            max_hops: 10,
            request_timeout_secs: 10,
            user_agent: concat!("url-unshortener/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Where comments come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub search_url: String,
    /// Feed target; `None` means every subreddit
    pub subreddit: Option<String>,
    pub page_size: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            search_url: "https://apiv2.pushshift.io/reddit/comment/search".to_string(),
            subreddit: None,
            page_size: 50,
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does #[serde(default)] do?
//    - Missing keys are filled from the type's Default impl
//    - On the struct, it applies to every field, so partial files work
//
// 2. Why store seconds as u64 and return Duration from methods?
//    - TOML has no duration type, plain numbers are easy to write
//    - The rest of the code only ever sees Duration
//
// 3. What is concat!/env! in the user agent?
//    - Both run at compile time
//    - env!("CARGO_PKG_VERSION") is the version from Cargo.toml
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.scanner.max_comment_length, 1000);
        assert_eq!(config.resolver.max_attempts, 3);
        assert_eq!(config.resolver.retry_delay(), Duration::from_secs(5));
        assert_eq!(config.resolver.max_hops, 10);
        assert_eq!(config.feed.page_size, 50);
        assert!(config.feed.subreddit.is_none());
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = Config::from_toml(
            r#"
            [scanner]
            idle_interval_secs = 60

            [feed]
            subreddit = "rust"
            "#,
        )
        .unwrap();

        assert_eq!(config.scanner.idle_interval(), Duration::from_secs(60));
        assert_eq!(config.scanner.active_interval(), Duration::from_secs(1));
        assert_eq!(config.feed.subreddit.as_deref(), Some("rust"));
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        let result = Config::from_toml("[scanner\nmax_comment_length = ");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = Config::load(Path::new("definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("definitely/not/here.toml"));
    }
}
