// src/pipeline/revealer.rs
// =============================================================================
// Third pass: resolve every short link in a comment and reply.
//
// A comment can contain several short links, so the extraction pattern runs
// over the whole body again rather than trusting the Filter's single match.
// Each link is resolved on its own: one dead link does not stop the others.
// If at least one link resolved, the Replier gets all of them in one call.
// =============================================================================

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{Queue, ResolvedLink, ShortLinkMatch};
use crate::error::UnshortenError;
use crate::feed::Comment;
use crate::patterns::PatternSet;
use crate::reply::Replier;
use crate::resolver::{Resolve, Unshortener};

pub struct Revealer<R> {
    patterns: Arc<PatternSet>,
    input: Arc<Queue<ShortLinkMatch>>,
    unshortener: Unshortener<R>,
    replier: Arc<dyn Replier>,
}

impl<R: Resolve> Revealer<R> {
    pub fn new(
        patterns: Arc<PatternSet>,
        input: Arc<Queue<ShortLinkMatch>>,
        unshortener: Unshortener<R>,
        replier: Arc<dyn Replier>,
    ) -> Self {
        Self {
            patterns,
            input,
            unshortener,
            replier,
        }
    }

    /// Resolves the short links in one comment and replies if any resolved.
    pub async fn reveal(&self, comment: &Comment) -> Vec<ResolvedLink> {
        let mut links = Vec::new();

        for short_url in self.short_urls(&comment.body) {
            match self.unshortener.unshorten(short_url).await {
                Ok(resolved_url) => links.push(ResolvedLink::new(short_url, resolved_url)),
                Err(UnshortenError::NotShortened { url }) => {
                    debug!(comment_id = %comment.id, url = %url, "link was not shortened");
                }
                Err(error) => {
                    warn!(comment_id = %comment.id, url = short_url, error = %error, "could not reveal link");
                }
            }
        }

        if !links.is_empty() {
            self.replier.reply(comment, &links).await;
            log_revealed(comment, &links);
        }

        links
    }

    // Every extracted occurrence that points at a known service, duplicates
    // removed, in the order they appear
    fn short_urls<'a>(&'a self, body: &'a str) -> Vec<&'a str> {
        let mut urls: Vec<&str> = Vec::new();
        for candidate in self.patterns.extract(body) {
            if self.patterns.is_short_url(candidate) && !urls.contains(&candidate) {
                urls.push(candidate);
            }
        }
        urls
    }

    pub async fn run(self) {
        info!(pattern = %self.patterns.extraction(), "revealer started");

        loop {
            let found = self.input.pop().await;
            self.reveal(&found.comment).await;

            if self.input.is_empty() {
                debug!("revealer caught up, waiting for more comments");
            }
        }
    }
}

fn log_revealed(comment: &Comment, links: &[ResolvedLink]) {
    let mut text = format!("Found comment containing {} short-url(s):", links.len());
    for link in links {
        text.push_str(&format!(
            "\nShort link: {} ; Unshortened link: {}",
            link.short_url, link.resolved_url
        ));
    }

    let record = serde_json::to_string(comment).unwrap_or_else(|_| format!("{:?}", comment));
    info!(
        comment_id = %comment.id,
        link_count = links.len(),
        links = %links_field(links),
        comment = %record,
        "{}",
        text
    );
}

// The short -> resolved pairs as a JSON array, for the structured log sink
fn links_field(links: &[ResolvedLink]) -> String {
    serde_json::to_string(links).unwrap_or_else(|_| format!("{:?}", links))
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is Revealer generic over R?
//    - R is whatever implements Resolve
//    - In production it is HttpResolver, in tests a lookup table
//    - Generics are resolved at compile time, so there is no runtime cost
//
// 2. Why Arc<dyn Replier> instead of a generic?
//    - `dyn Replier` is a trait object: the concrete type is picked at runtime
//    - Either style works; the replier is called once per comment, so the
//      small cost of dynamic dispatch does not matter
//
// 3. What does `for short_url in ...` with `match` do here?
//    - Each link gets its own Result
//    - The Err arm logs and moves on, so one failure never ends the loop
//
// 4. Why the lifetime 'a on short_urls()?
//    - The returned &str slices point into the comment body
//    - 'a tells the compiler they cannot outlive that body
// -----------------------------------------------------------------------------
