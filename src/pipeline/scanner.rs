// src/pipeline/scanner.rs
// =============================================================================
// First pass: pull new comments from the feed.
//
// How it works:
// 1. Ask the feed for everything after our cursor
// 2. Keep comments that are short enough and match the loose pattern
// 3. Push them onto the Filter's queue, in feed order
// 4. Move the cursor forward and sleep a little (catching up) or a lot
//    (nothing new yet)
//
// The cursor only ever moves forward, so no comment is forwarded twice.
// A failed poll leaves the cursor where it was and is retried next cycle.
// =============================================================================

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::Queue;
use crate::config::ScannerConfig;
use crate::error::FeedError;
use crate::feed::{Comment, CommentFeed, Cursor};
use crate::patterns::PatternSet;

/// What a single poll found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Nothing newer than the cursor
    Idle,
    /// A new batch: how many comments it had and how many were forwarded
    Active { received: usize, forwarded: usize },
}

pub struct Scanner {
    feed: Arc<dyn CommentFeed>,
    patterns: Arc<PatternSet>,
    output: Arc<Queue<Comment>>,
    max_comment_length: usize,
    idle_interval: Duration,
    active_interval: Duration,
    cursor: Option<Cursor>,
    idle: Option<bool>,
}

impl Scanner {
    pub fn new(
        feed: Arc<dyn CommentFeed>,
        patterns: Arc<PatternSet>,
        output: Arc<Queue<Comment>>,
        config: &ScannerConfig,
    ) -> Self {
        Self {
            feed,
            patterns,
            output,
            max_comment_length: config.max_comment_length,
            idle_interval: config.idle_interval(),
            active_interval: config.active_interval(),
            cursor: None,
            idle: None,
        }
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    /// Polls the feed once and forwards eligible comments.
    pub async fn poll_once(&mut self) -> Result<PollOutcome, FeedError> {
        let batch = self.feed.poll(self.cursor.as_ref()).await?;

        if !batch.has_new {
            // The feed may still hand out a starting position
            self.cursor = Some(batch.cursor);
            return Ok(PollOutcome::Idle);
        }

        let received = batch.comments.len();
        let mut forwarded = 0;
        for comment in batch.comments {
            if self.is_eligible(&comment) {
                self.output.push(comment);
                forwarded += 1;
            }
        }

        self.cursor = Some(batch.cursor);
        Ok(PollOutcome::Active { received, forwarded })
    }

    // Length is counted in characters, not bytes
    fn is_eligible(&self, comment: &Comment) -> bool {
        comment.body.chars().count() < self.max_comment_length
            && self.patterns.is_candidate(&comment.body)
    }

    /// Polls forever, sleeping between polls.
    pub async fn run(mut self) {
        info!(pattern = %self.patterns.loose(), "scanner started");

        loop {
            let pause = match self.poll_once().await {
                Ok(PollOutcome::Idle) => {
                    if self.idle != Some(true) {
                        info!(wait_secs = self.idle_interval.as_secs(), "reached newest comments, waiting");
                    } else {
                        debug!(cursor = ?self.cursor().map(Cursor::as_str), "still no new comments");
                    }
                    self.idle = Some(true);
                    self.idle_interval
                }
                Ok(PollOutcome::Active { received, forwarded }) => {
                    if self.idle != Some(false) {
                        info!("new comments available, fetching");
                    }
                    debug!(received, forwarded, queued = self.output.len(), "scanned batch");
                    self.idle = Some(false);
                    self.active_interval
                }
                Err(error) => {
                    warn!(error = %error, "feed poll failed, retrying next cycle");
                    self.idle_interval
                }
            };

            tokio::time::sleep(pause).await;
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why does run() take `mut self`?
//    - The Scanner moves into its tokio task and owns its cursor there
//    - Nothing else needs the Scanner once it is running
//
// 2. What is Option<bool> for `idle`?
//    - None = first poll, Some(true) = idle, Some(false) = catching up
//    - It lets run() log only when the state changes
//
// 3. Why does a failed poll not stop the loop?
//    - poll_once() returns Result, and run() matches on it
//    - The error is logged and the next cycle tries again from the same cursor
//
// 4. What does tokio::time::sleep do?
//    - It pauses this task without blocking the thread
//    - Other stages keep running while the Scanner waits
// -----------------------------------------------------------------------------
