// src/pipeline/filter.rs
// =============================================================================
// Second pass: keep only comments that link to a known short-url service.
//
// The loose pattern lets through anything that looks like a link. Here we
// apply the stricter pattern, normalize what it matched into a URL and check
// it against the service list. Everything else is dropped without fuss.
// =============================================================================

use std::sync::Arc;

use tracing::{debug, info};

use super::{Queue, ShortLinkMatch};
use crate::feed::Comment;
use crate::patterns::{complete_url, PatternSet};

pub struct Filter {
    patterns: Arc<PatternSet>,
    input: Arc<Queue<Comment>>,
    output: Arc<Queue<ShortLinkMatch>>,
}

impl Filter {
    pub fn new(
        patterns: Arc<PatternSet>,
        input: Arc<Queue<Comment>>,
        output: Arc<Queue<ShortLinkMatch>>,
    ) -> Self {
        Self {
            patterns,
            input,
            output,
        }
    }

    /// Returns a match if the comment contains a short link.
    pub fn inspect(&self, comment: Comment) -> Option<ShortLinkMatch> {
        let short_url = complete_url(self.patterns.strict_match(&comment.body)?);

        if !self.patterns.is_short_url(&short_url) {
            debug!(comment_id = %comment.id, url = %short_url, "not a known short-url service");
            return None;
        }

        Some(ShortLinkMatch { comment, short_url })
    }

    pub async fn run(self) {
        info!(pattern = %self.patterns.strict(), "filter started");

        loop {
            let comment = self.input.pop().await;
            if let Some(found) = self.inspect(comment) {
                debug!(comment_id = %found.comment.id, url = %found.short_url, "short link candidate");
                self.output.push(found);
            }
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why does inspect() take the Comment by value?
//    - A matching comment moves into the ShortLinkMatch without a copy
//    - A dropped comment is simply freed when the function returns
//
// 2. What does the ? do on an Option?
//    - strict_match() returns Option<&str>
//    - `?` returns None from inspect() straight away when there is no match
//    - It is the Option version of early-returning an error
//
// 3. Why Arc<PatternSet>?
//    - All three stages read the same compiled regexes
//    - Arc (atomically reference counted) lets several tasks own one value
//    - Nobody mutates it, so no Mutex is needed
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PatternConfig;
    use crate::patterns::ShortUrlServices;
    use std::time::Duration;

    fn filter() -> (Filter, Arc<Queue<Comment>>, Arc<Queue<ShortLinkMatch>>) {
        let patterns = PatternSet::new(
            &PatternConfig::default(),
            ShortUrlServices::from_list("bit.ly\now.ly\ntinyurl.com"),
        )
        .unwrap();
        let input = Arc::new(Queue::new());
        let output = Arc::new(Queue::new());
        let filter = Filter::new(Arc::new(patterns), Arc::clone(&input), Arc::clone(&output));
        (filter, input, output)
    }

    #[test]
    fn test_known_service_is_kept_and_normalized() {
        let (filter, _, _) = filter();
        let found = filter.inspect(Comment::new("c1", "look: bit.ly/3xYz please")).unwrap();
        assert_eq!(found.short_url, "http://bit.ly/3xYz");
        assert_eq!(found.comment.id, "c1");
    }

    #[test]
    fn test_unknown_service_is_dropped() {
        let (filter, _, _) = filter();
        assert!(filter.inspect(Comment::new("c1", "docs at https://docs.rs/regex")).is_none());
        assert!(filter.inspect(Comment::new("c2", "no link at all")).is_none());
    }

    #[tokio::test]
    async fn test_order_is_preserved_through_the_stage() {
        let (filter, input, output) = filter();
        input.push(Comment::new("c1", "one http://bit.ly/one"));
        input.push(Comment::new("c2", "two https://ow.ly/two"));
        input.push(Comment::new("c3", "three tinyurl.com/three"));

        let stage = tokio::spawn(filter.run());

        let mut ids = Vec::new();
        for _ in 0..3 {
            let found = tokio::time::timeout(Duration::from_secs(5), output.pop())
                .await
                .expect("filter produced a match");
            ids.push(found.comment.id);
        }
        stage.abort();

        assert_eq!(ids, vec!["c1", "c2", "c3"]);
    }
}
