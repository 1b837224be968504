// src/reply.rs
// =============================================================================
// What happens once a comment's short links have been revealed.
//
// The Revealer hands its results to a Replier and moves on. Posting an actual
// reply on the comment source needs an authenticated account, so the only
// implementation here is a dry run that writes the reply to the log.
// =============================================================================

use async_trait::async_trait;
use tracing::info;

use crate::feed::Comment;
use crate::pipeline::ResolvedLink;

/// Delivers revealed links for a comment. Fire-and-forget.
#[async_trait]
pub trait Replier: Send + Sync {
    async fn reply(&self, comment: &Comment, links: &[ResolvedLink]);
}

/// Logs the reply text instead of posting it.
#[derive(Debug, Default, Clone)]
pub struct LogReplier;

#[async_trait]
impl Replier for LogReplier {
    async fn reply(&self, comment: &Comment, links: &[ResolvedLink]) {
        info!(
            comment_id = %comment.id,
            permalink = comment.meta_str("permalink").unwrap_or(""),
            "dry run, would reply:\n{}",
            reply_text(links)
        );
    }
}

/// The body of a reply, one line per revealed link.
pub fn reply_text(links: &[ResolvedLink]) -> String {
    let mut text = String::from("Short links in this comment point to:\n");
    for link in links {
        text.push_str(&format!("\n* {} -> {}", link.short_url, link.resolved_url));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_text_lists_every_link() {
        let links = vec![
            ResolvedLink::new("bit.ly/a", "https://example.com/a"),
            ResolvedLink::new("ow.ly/b", "https://example.org/b"),
        ];
        let text = reply_text(&links);

        assert!(text.contains("* bit.ly/a -> https://example.com/a"));
        assert!(text.contains("* ow.ly/b -> https://example.org/b"));
        assert_eq!(text.lines().filter(|l| l.starts_with("* ")).count(), 2);
    }
}
