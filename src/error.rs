// src/error.rs
// =============================================================================
// Error types for the parts of the program that can fail.
//
// Each concern gets its own enum so callers can match on exactly what went
// wrong:
// - ResolveError: a single resolution attempt failed
// - UnshortenError: the outcome of the retrying unshorten() call
// - FeedError: polling the comment feed failed
// - ConfigError: the config or service list could not be loaded
//
// main.rs wraps these in anyhow::Error when it only needs to report them.
// =============================================================================

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for resolution attempts.
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;

/// Why one attempt at following a redirect chain failed.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Transport failure: timeout, DNS, TLS, refused connection
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A 3xx response came back without a Location header
    #[error("HTTP {status} from {url} has no Location header")]
    MissingLocation { url: String, status: u16 },

    /// The Location header could not be turned into a URL
    #[error("invalid redirect target '{location}' from {url}: {message}")]
    InvalidLocation {
        url: String,
        location: String,
        message: String,
    },

    /// A meta-refresh tag was present but its content made no sense
    #[error("unparseable meta refresh '{content}' on {url}")]
    InvalidMetaRefresh { url: String, content: String },

    /// Anything outside 2xx/3xx
    #[error("{status} HTTP response, URL could not be unshortened ({url})")]
    UnresolvableStatus { url: String, status: u16 },

    /// Redirect chain longer than the configured limit (usually a loop)
    #[error("more than {max_hops} redirects while resolving {url}")]
    TooManyHops { url: String, max_hops: usize },
}

impl ResolveError {
    /// Create an invalid-location error.
    pub fn invalid_location(
        url: impl Into<String>,
        location: impl Into<String>,
        message: impl std::fmt::Display,
    ) -> Self {
        Self::InvalidLocation {
            url: url.into(),
            location: location.into(),
            message: message.to_string(),
        }
    }
}

/// Outcome of `Unshortener::unshorten` when no new URL is produced.
#[derive(Error, Debug)]
pub enum UnshortenError {
    /// Resolution worked but ended where it started
    #[error("URL is not shortened: {url}")]
    NotShortened { url: String },

    /// Every attempt failed
    #[error("all {attempts} attempts to resolve {url} failed: {source}")]
    ExhaustedRetries {
        url: String,
        attempts: u32,
        #[source]
        source: ResolveError,
    },
}

/// Polling the comment feed failed. Always recoverable.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("feed request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("feed returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("could not decode feed page from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected feed response: {0}")]
    Unexpected(String),
}

/// Loading configuration failed. Fatal at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid {name} pattern: {source}")]
    Pattern {
        name: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("short-url service list {} is empty", .0.display())]
    EmptyServices(PathBuf),
}
