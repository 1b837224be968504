// src/feed/mod.rs
// =============================================================================
// This module is where comments come from.
//
// The Scanner only ever talks to the CommentFeed trait: "give me everything
// after this cursor". The concrete feed lives in a submodule:
// - pushshift: Pages through a Pushshift-style comment search API
//
// Rust concepts:
// - Traits: The Scanner works with any feed, including test stubs
// - serde(flatten): Keeps fields we don't interpret without naming them
// =============================================================================

mod pushshift;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::FeedError;

pub use pushshift::PushshiftFeed;

/// One comment from the feed.
///
/// Only `id` and `body` are looked at. Everything else the feed sends
/// (author, permalink, subreddit, ...) is kept in `metadata` and carried
/// through to the logs and the reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub body: String,
    #[serde(flatten)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Comment {
    #[cfg(test)]
    pub fn new(id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            body: body.into(),
            metadata: serde_json::Map::new(),
        }
    }

    /// Looks up a metadata field as text, e.g. "author" or "permalink".
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|value| value.as_str())
    }
}

/// Opaque position in the feed: "everything up to here was handed out".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(marker: impl Into<String>) -> Self {
        Self(marker.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of one poll.
#[derive(Debug, Clone)]
pub struct FeedBatch {
    /// New comments, oldest first
    pub comments: Vec<Comment>,
    /// Where the next poll should start
    pub cursor: Cursor,
    /// False when the feed had nothing newer than the cursor
    pub has_new: bool,
}

/// A source of comments that can be resumed from a cursor.
///
/// Polling the same cursor twice must not change anything on the feed's side.
#[async_trait]
pub trait CommentFeed: Send + Sync {
    /// Fetches comments strictly after `cursor`. `None` means "start now".
    async fn poll(&self, cursor: Option<&Cursor>) -> Result<FeedBatch, FeedError>;
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does #[serde(flatten)] do on metadata?
//    - Any JSON field not named in the struct lands in the map
//    - Serializing the Comment writes them back at the top level
//
// 2. What is #[async_trait]?
//    - Plain traits could not have async methods for a long time
//    - The macro rewrites each async fn into one returning a boxed future
//    - That makes `Arc<dyn CommentFeed>` possible
//
// 3. Why a Cursor newtype instead of a String?
//    - The compiler will not let a comment id be passed where a cursor is
//      expected by accident
//    - Only the feed knows what is inside it
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_keeps_unknown_fields() {
        let json = r#"{"id":"k2x9","body":"see bit.ly/x","author":"someone","score":3}"#;
        let comment: Comment = serde_json::from_str(json).unwrap();

        assert_eq!(comment.id, "k2x9");
        assert_eq!(comment.meta_str("author"), Some("someone"));
        assert_eq!(comment.metadata.get("score"), Some(&serde_json::json!(3)));

        let back = serde_json::to_value(&comment).unwrap();
        assert_eq!(back["author"], "someone");
    }
}
