// src/resolver/mod.rs
// =============================================================================
// This module contains all link resolution logic.
//
// Submodules:
// - http: Follows a redirect chain over the network, hop by hop
// - html: Finds meta-refresh redirects inside HTML pages
// - unshorten: Retries resolution and decides whether a link was shortened
//
// The Resolve trait sits between the retry logic and the network, so tests
// can swap the network for a stub.
// =============================================================================

mod html;
mod http;
mod unshorten;

use async_trait::async_trait;

use crate::error::ResolveResult;

pub use http::HttpResolver;
pub use unshorten::Unshortener;

/// Where a chain of redirects ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The terminal URL
    pub url: String,
    /// How many redirects / meta refreshes were followed to get there
    pub hops: usize,
}

/// Anything that can follow a URL to its destination.
#[async_trait]
pub trait Resolve: Send + Sync {
    async fn resolve(&self, url: &str) -> ResolveResult<Resolution>;
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a Resolve trait?
//    - The retry logic does not care how a URL is followed
//    - Tests plug in a resolver that never touches the network
//
// 2. Why `Send + Sync` on the trait?
//    - The resolver is used from tokio tasks, which can move between threads
//    - Send = can be moved to another thread, Sync = can be shared by reference
//
// 3. What is ResolveResult<T>?
//    - A type alias for Result<T, ResolveError>
//    - It saves repeating the error type on every signature
// -----------------------------------------------------------------------------
