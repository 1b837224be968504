// src/pipeline/mod.rs
// =============================================================================
// The three-stage comment pipeline.
//
//   Scanner --Queue<Comment>--> Filter --Queue<ShortLinkMatch>--> Revealer
//
// Submodules:
// - queue: The blocking FIFO between two stages
// - scanner: Polls the feed, keeps comments that might contain a link
// - filter: Keeps comments that contain a known short-url service
// - revealer: Resolves every short link in a comment and replies
//
// Each stage runs as its own tokio task, forever. The queues are the only
// thing the stages share besides the read-only PatternSet.
// =============================================================================

mod filter;
mod queue;
mod revealer;
mod scanner;

use serde::{Deserialize, Serialize};

use crate::feed::Comment;

pub use filter::Filter;
pub use queue::Queue;
pub use revealer::Revealer;
pub use scanner::Scanner;

/// A comment that contains a short link, produced by the Filter.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortLinkMatch {
    pub comment: Comment,
    /// The first short link found, already passed through complete_url
    pub short_url: String,
}

/// One revealed link: what the comment said and where it really goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLink {
    pub short_url: String,
    pub resolved_url: String,
}

impl ResolvedLink {
    pub fn new(short_url: impl Into<String>, resolved_url: impl Into<String>) -> Self {
        Self {
            short_url: short_url.into(),
            resolved_url: resolved_url.into(),
        }
    }
}
