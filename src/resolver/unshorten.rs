// src/resolver/unshorten.rs
// =============================================================================
// Retrying resolution of a single short link.
//
// unshorten() gives each link a few attempts with a fixed wait in between.
// A link that resolves to itself was never shortened and is reported as
// NotShortened so the caller can skip it quietly.
// =============================================================================

use std::time::Duration;

use tracing::{debug, error, warn};

use super::Resolve;
use crate::config::ResolverConfig;
use crate::error::UnshortenError;
use crate::patterns::complete_url;

/// Wraps a resolver with retry/backoff and the "was it shortened?" check.
#[derive(Debug, Clone)]
pub struct Unshortener<R> {
    resolver: R,
    max_attempts: u32,
    retry_delay: Duration,
}

impl<R: Resolve> Unshortener<R> {
    pub fn new(resolver: R, max_attempts: u32, retry_delay: Duration) -> Self {
        Self {
            resolver,
            // Zero attempts would never resolve anything
            max_attempts: max_attempts.max(1),
            retry_delay,
        }
    }

    pub fn from_config(resolver: R, config: &ResolverConfig) -> Self {
        Self::new(resolver, config.max_attempts, config.retry_delay())
    }

    /// Resolves `url` to its final destination.
    ///
    /// Returns `NotShortened` when the destination is the URL itself and
    /// `ExhaustedRetries` when every attempt failed.
    pub async fn unshorten(&self, url: &str) -> Result<String, UnshortenError> {
        let url = complete_url(url);
        let mut attempt = 0;

        let resolution = loop {
            attempt += 1;

            match self.resolver.resolve(&url).await {
                Ok(resolution) => break resolution,
                Err(source) => {
                    warn!(
                        url = %url,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %source,
                        "resolution attempt failed"
                    );

                    if attempt >= self.max_attempts {
                        error!(url = %url, attempts = attempt, "all resolution attempts failed");
                        return Err(UnshortenError::ExhaustedRetries {
                            url,
                            attempts: attempt,
                            source,
                        });
                    }

                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        };

        if resolution.url == url {
            return Err(UnshortenError::NotShortened { url });
        }

        debug!(url = %url, resolved = %resolution.url, hops = resolution.hops, attempt, "resolved");

        Ok(resolution.url)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is `loop { ... break value }`?
//    - A loop is an expression in Rust
//    - `break resolution` ends it and hands the value to `let resolution =`
//
// 2. Why check `attempt >= self.max_attempts` before sleeping?
//    - There is no point waiting after the last attempt
//    - The caller gets its error as soon as it is known
//
// 3. What is `impl<R: Resolve>`?
//    - The methods exist for any R that implements the Resolve trait
//    - The bound is checked at compile time
//
// 4. Why return UnshortenError instead of logging and returning Option?
//    - The caller decides how loud each case is
//    - NotShortened is normal, ExhaustedRetries is worth a warning
// -----------------------------------------------------------------------------
