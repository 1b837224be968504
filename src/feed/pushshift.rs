// src/feed/pushshift.rs
// =============================================================================
// This module reads comments from a Pushshift-style search API.
//
// Strategy:
// - On the first poll, fetch the newest comments once and remember the id of
//   the newest one
// - Build a page URL asking for comments after that id, oldest first
// - Every later poll fetches the page the cursor points at. The response's
//   metadata.next_page tells us where the following page is; when it is
//   missing or unchanged we are at the newest comment and should wait
//
// The cursor is simply the URL of the next page to fetch.
//
// Rust concepts:
// - async functions: For network I/O
// - serde derive: To decode the JSON pages
// - Result: Every failure becomes a FeedError the Scanner can log
// =============================================================================

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::{Comment, CommentFeed, Cursor, FeedBatch};
use crate::config::FeedConfig;
use crate::error::FeedError;

// One page of search results
#[derive(Debug, Deserialize)]
struct SearchPage {
    data: Vec<Comment>,
    #[serde(default)]
    metadata: Option<PageMetadata>,
}

#[derive(Debug, Deserialize)]
struct PageMetadata {
    #[serde(default)]
    next_page: Option<String>,
}

/// Comment feed backed by a Pushshift-compatible HTTP API.
#[derive(Debug, Clone)]
pub struct PushshiftFeed {
    client: Client,
    search_url: String,
    subreddit: Option<String>,
    page_size: u32,
}

impl PushshiftFeed {
    pub fn new(client: Client, config: &FeedConfig) -> Self {
        Self {
            client,
            search_url: config.search_url.clone(),
            subreddit: config.subreddit.clone(),
            page_size: config.page_size,
        }
    }

    // Finds the newest comment and positions the cursor right after it
    //
    // Returns an empty batch: comments older than the start are not scanned.
    async fn bootstrap(&self) -> Result<FeedBatch, FeedError> {
        let mut params = Vec::new();
        if let Some(subreddit) = &self.subreddit {
            params.push(("subreddit", subreddit.clone()));
        }
        let url = self.build_url(&params)?;

        let page = self.fetch(url.as_str()).await?;
        let newest = page
            .data
            .first()
            .ok_or_else(|| FeedError::Unexpected(format!("no comments returned by {}", url)))?;

        let cursor = self.page_after(&newest.id)?;
        debug!(cursor = %cursor, "feed positioned after newest comment");

        Ok(FeedBatch {
            comments: Vec::new(),
            cursor,
            has_new: false,
        })
    }

    // URL of the page of comments strictly after `after_id`, oldest first
    fn page_after(&self, after_id: &str) -> Result<Cursor, FeedError> {
        let mut params = vec![
            ("sort", "asc".to_string()),
            ("limit", self.page_size.to_string()),
            ("after_id", after_id.to_string()),
        ];
        if let Some(subreddit) = &self.subreddit {
            params.push(("subreddit", subreddit.clone()));
        }

        Ok(Cursor::new(self.build_url(&params)?.to_string()))
    }

    fn build_url(&self, params: &[(&str, String)]) -> Result<Url, FeedError> {
        Url::parse_with_params(&self.search_url, params)
            .map_err(|e| FeedError::Unexpected(format!("invalid search URL '{}': {}", self.search_url, e)))
    }

    // Fetches and decodes one page
    async fn fetch(&self, url: &str) -> Result<SearchPage, FeedError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FeedError::Request {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(FeedError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|source| FeedError::Request {
            url: url.to_string(),
            source,
        })?;

        serde_json::from_slice(&bytes).map_err(|source| FeedError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl CommentFeed for PushshiftFeed {
    async fn poll(&self, cursor: Option<&Cursor>) -> Result<FeedBatch, FeedError> {
        match cursor {
            None => self.bootstrap().await,
            Some(cursor) => {
                let page = self.fetch(cursor.as_str()).await?;
                Ok(interpret_page(cursor, page))
            }
        }
    }
}

// Decides whether a fetched page is new
//
// A page counts as new only when it links to a next page other than the one
// we are on; otherwise we have reached the newest comments and hand out
// nothing, so the same comments are never forwarded twice.
fn interpret_page(cursor: &Cursor, page: SearchPage) -> FeedBatch {
    match page.metadata.and_then(|meta| meta.next_page) {
        Some(next) if next != cursor.as_str() => FeedBatch {
            comments: page.data,
            cursor: Cursor::new(next),
            has_new: true,
        },
        _ => FeedBatch {
            comments: Vec::new(),
            cursor: cursor.clone(),
            has_new: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn page(json: serde_json::Value) -> SearchPage {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_new_page_advances_cursor() {
        let cursor = Cursor::new("https://feed.example/search?after_id=a");
        let batch = interpret_page(
            &cursor,
            page(serde_json::json!({
                "data": [{"id": "b", "body": "one"}, {"id": "c", "body": "two"}],
                "metadata": {"next_page": "https://feed.example/search?after_id=c"}
            })),
        );

        assert!(batch.has_new);
        assert_eq!(batch.comments.len(), 2);
        assert_eq!(batch.comments[0].id, "b");
        assert_eq!(batch.cursor.as_str(), "https://feed.example/search?after_id=c");
    }

    #[test]
    fn test_same_page_is_not_new() {
        let cursor = Cursor::new("https://feed.example/search?after_id=c");
        let batch = interpret_page(
            &cursor,
            page(serde_json::json!({
                "data": [{"id": "d", "body": "partial"}],
                "metadata": {"next_page": "https://feed.example/search?after_id=c"}
            })),
        );

        assert!(!batch.has_new);
        assert!(batch.comments.is_empty());
        assert_eq!(batch.cursor, cursor);
    }

    #[test]
    fn test_missing_metadata_is_not_new() {
        let cursor = Cursor::new("https://feed.example/search?after_id=c");
        let batch = interpret_page(&cursor, page(serde_json::json!({ "data": [] })));
        assert!(!batch.has_new);
        assert_eq!(batch.cursor, cursor);
    }

    #[tokio::test]
    async fn test_bootstrap_then_poll() {
        let server = MockServer::start().await;
        let search_url = format!("{}/reddit/comment/search", server.uri());
        let next_page = format!("{}/reddit/comment/search?page=2", server.uri());

        // Higher priority so the paged request wins over the bare bootstrap mock
        Mock::given(method("GET"))
            .and(path("/reddit/comment/search"))
            .and(query_param("after_id", "newest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"id": "n1", "body": "first new comment", "author": "a"}],
                "metadata": {"next_page": next_page}
            })))
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/reddit/comment/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"id": "newest", "body": "latest"}, {"id": "older", "body": "before"}]
            })))
            .mount(&server)
            .await;

        let config = FeedConfig {
            search_url,
            subreddit: Some("rust".to_string()),
            page_size: 25,
        };
        let feed = PushshiftFeed::new(Client::new(), &config);

        let start = feed.poll(None).await.unwrap();
        assert!(!start.has_new);
        assert!(start.comments.is_empty());
        assert!(start.cursor.as_str().contains("after_id=newest"));
        assert!(start.cursor.as_str().contains("limit=25"));
        assert!(start.cursor.as_str().contains("subreddit=rust"));

        let batch = feed.poll(Some(&start.cursor)).await.unwrap();
        assert!(batch.has_new);
        assert_eq!(batch.comments[0].id, "n1");
        assert_eq!(batch.comments[0].meta_str("author"), Some("a"));
        assert_eq!(batch.cursor.as_str(), next_page);
    }

    #[tokio::test]
    async fn test_server_error_is_feed_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let feed = PushshiftFeed::new(
            Client::new(),
            &FeedConfig {
                search_url: server.uri(),
                ..FeedConfig::default()
            },
        );

        let err = feed.poll(None).await.unwrap_err();
        assert!(matches!(err, FeedError::Status { status: 502, .. }));
    }
}
