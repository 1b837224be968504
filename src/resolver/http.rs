// src/resolver/http.rs
// =============================================================================
// This module follows a redirect chain hop by hop over HTTP.
//
// Key functionality:
// - Makes HTTP HEAD requests with automatic redirects turned off, so we see
//   every 3xx ourselves
// - Only downloads a body (GET) when a page answers 2xx, to look for a
//   meta-refresh redirect
// - Stops after a fixed number of hops so a redirect loop cannot run forever
//
// HTTP status codes:
// - 200-299: Success, possibly the end of the chain
// - 300-399: Redirect, follow the Location header
// - anything else: the link cannot be resolved
//
// Rust concepts:
// - async/await: For network I/O
// - Result<T, E>: Every hop can fail in several distinct ways
// - loop + counter: Instead of recursion
// =============================================================================

use async_trait::async_trait;
use reqwest::{header, redirect, Client, Response};
use tracing::debug;
use url::Url;

use super::html::{find_meta_refresh, MetaRefresh};
use super::{Resolution, Resolve};
use crate::config::ResolverConfig;
use crate::error::{ResolveError, ResolveResult};
use crate::patterns::complete_url;

// What one request told us about where to go next
#[derive(Debug, PartialEq, Eq)]
enum Hop {
    /// Keep going, this is the next URL
    Next(String),
    /// This URL is the destination
    Terminal,
}

/// Resolves URLs against the real network.
#[derive(Debug, Clone)]
pub struct HttpResolver {
    client: Client,
    max_hops: usize,
}

impl HttpResolver {
    // Creates a resolver with its own HTTP client
    //
    // The client never follows redirects by itself, and every request gets
    // the configured timeout so a silent server cannot stall the caller.
    pub fn new(config: &ResolverConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .redirect(redirect::Policy::none())
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            max_hops: config.max_hops,
        })
    }

    // Performs one hop: HEAD, then GET on 2xx to check for a meta refresh
    async fn hop(&self, url: &str) -> ResolveResult<Hop> {
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|source| request_error(url, source))?;

        let status = response.status();

        if status.is_redirection() {
            let location = redirect_target(url, &response)?;
            debug!(url, status = status.as_u16(), location = %location, "following redirect");
            return Ok(Hop::Next(location));
        }

        if status.is_success() {
            // The body is only fetched here, on a page that looks final
            let body = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|source| request_error(url, source))?
                .text()
                .await
                .map_err(|source| request_error(url, source))?;

            return match find_meta_refresh(&body) {
                MetaRefresh::Target(target) => {
                    let next = join_location(url, &target)?;
                    // A page that refreshes itself is already the destination
                    if is_same_url(url, &next) {
                        debug!(url, "meta refresh points back at the page, stopping");
                        return Ok(Hop::Terminal);
                    }
                    debug!(url, target = %next, "following meta refresh");
                    Ok(Hop::Next(next))
                }
                MetaRefresh::Absent | MetaRefresh::DelayOnly => Ok(Hop::Terminal),
                MetaRefresh::Malformed(content) => Err(ResolveError::InvalidMetaRefresh {
                    url: url.to_string(),
                    content,
                }),
            };
        }

        Err(ResolveError::UnresolvableStatus {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl Resolve for HttpResolver {
    async fn resolve(&self, url: &str) -> ResolveResult<Resolution> {
        let start = complete_url(url);
        let mut current = start.clone();
        let mut hops = 0;

        loop {
            match self.hop(&current).await? {
                Hop::Terminal => return Ok(Resolution { url: current, hops }),
                Hop::Next(next) => {
                    hops += 1;
                    if hops > self.max_hops {
                        return Err(ResolveError::TooManyHops {
                            url: start,
                            max_hops: self.max_hops,
                        });
                    }
                    current = complete_url(&next);
                }
            }
        }
    }
}

// Reads the Location header of a 3xx response
fn redirect_target(url: &str, response: &Response) -> ResolveResult<String> {
    let location = response
        .headers()
        .get(header::LOCATION)
        .ok_or_else(|| ResolveError::MissingLocation {
            url: url.to_string(),
            status: response.status().as_u16(),
        })?;

    let location = location
        .to_str()
        .map_err(|e| ResolveError::invalid_location(url, "<non-ascii>", e))?;

    join_location(url, location)
}

// Resolves a possibly-relative target against the URL it came from
//
// Examples:
//   base = "http://bit.ly/abc"
//   target = "https://example.com/x" -> "https://example.com/x"
//   target = "/landing"              -> "http://bit.ly/landing"
fn join_location(base: &str, target: &str) -> ResolveResult<String> {
    let target = target.trim();
    if target.is_empty() {
        return Err(ResolveError::invalid_location(base, target, "empty location"));
    }

    let base_url = Url::parse(base).map_err(|e| ResolveError::invalid_location(base, target, e))?;

    base_url
        .join(target)
        .map(|joined| joined.to_string())
        .map_err(|e| ResolveError::invalid_location(base, target, e))
}

// Compares two absolute URLs after normalization, so "http://a.com" and
// "http://a.com/" count as the same page
fn is_same_url(a: &str, b: &str) -> bool {
    match (Url::parse(a), Url::parse(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn request_error(url: &str, source: reqwest::Error) -> ResolveError {
    ResolveError::Request {
        url: url.to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn resolver() -> HttpResolver {
        HttpResolver::new(&ResolverConfig::default()).unwrap()
    }

    async fn mount_redirect(server: &MockServer, from: &str, status: u16, to: &str) {
        Mock::given(method("HEAD"))
            .and(path(from))
            .respond_with(ResponseTemplate::new(status).insert_header("Location", to))
            .mount(server)
            .await;
    }

    async fn mount_page(server: &MockServer, at: &str, html: &str) {
        Mock::given(method("HEAD"))
            .and(path(at))
            .respond_with(ResponseTemplate::new(200))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "text/html")
                    .set_body_string(html),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_redirect_chain_takes_two_hops() {
        let server = MockServer::start().await;
        let b = format!("{}/b", server.uri());
        let c = format!("{}/c", server.uri());

        mount_redirect(&server, "/a", 301, &b).await;
        mount_redirect(&server, "/b", 302, &c).await;
        mount_page(&server, "/c", "<html><body>done</body></html>").await;

        let resolution = resolver().resolve(&format!("{}/a", server.uri())).await.unwrap();
        assert_eq!(resolution.url, c);
        assert_eq!(resolution.hops, 2);
    }

    #[tokio::test]
    async fn test_relative_location() {
        let server = MockServer::start().await;
        mount_redirect(&server, "/short", 302, "/landing").await;
        mount_page(&server, "/landing", "").await;

        let resolution = resolver().resolve(&format!("{}/short", server.uri())).await.unwrap();
        assert_eq!(resolution.url, format!("{}/landing", server.uri()));
        assert_eq!(resolution.hops, 1);
    }

    #[tokio::test]
    async fn test_meta_refresh_is_followed() {
        let server = MockServer::start().await;
        let html = format!(
            r#"<html><head><meta http-equiv="Refresh" content="0;url={}/final"></head></html>"#,
            server.uri()
        );
        mount_page(&server, "/interstitial", &html).await;
        mount_page(&server, "/final", "<p>final</p>").await;

        let resolution = resolver()
            .resolve(&format!("{}/interstitial", server.uri()))
            .await
            .unwrap();
        assert_eq!(resolution.url, format!("{}/final", server.uri()));
        assert_eq!(resolution.hops, 1);
    }

    #[tokio::test]
    async fn test_self_refreshing_page_is_terminal() {
        let server = MockServer::start().await;
        let article = format!("{}/article", server.uri());
        let html = format!(r#"<html><head><meta http-equiv="refresh" content="300;url={article}"></head></html>"#);

        mount_redirect(&server, "/s", 301, &article).await;
        mount_page(&server, "/article", &html).await;

        let resolution = resolver().resolve(&format!("{}/s", server.uri())).await.unwrap();
        assert_eq!(resolution.url, article);
        assert_eq!(resolution.hops, 1);
    }

    #[tokio::test]
    async fn test_relative_self_refresh_is_terminal() {
        let server = MockServer::start().await;
        mount_page(&server, "/live", r#"<meta http-equiv="refresh" content="60; URL='/live'">"#).await;

        let url = format!("{}/live", server.uri());
        let resolution = resolver().resolve(&url).await.unwrap();
        assert_eq!(resolution.url, url);
        assert_eq!(resolution.hops, 0);
    }

    #[test]
    fn test_is_same_url_normalizes() {
        assert!(is_same_url("http://a.com", "http://a.com/"));
        assert!(!is_same_url("http://a.com/x", "http://a.com/y"));
    }

    #[tokio::test]
    async fn test_final_url_resolves_to_itself() {
        let server = MockServer::start().await;
        mount_page(&server, "/page", "<p>nothing to see</p>").await;

        let url = format!("{}/page", server.uri());
        let resolution = resolver().resolve(&url).await.unwrap();
        assert_eq!(resolution.url, url);
        assert_eq!(resolution.hops, 0);
    }

    #[tokio::test]
    async fn test_not_found_is_unresolvable() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = resolver().resolve(&format!("{}/gone", server.uri())).await.unwrap_err();
        assert!(matches!(err, ResolveError::UnresolvableStatus { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_redirect_without_location() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(301))
            .mount(&server)
            .await;

        let err = resolver().resolve(&format!("{}/broken", server.uri())).await.unwrap_err();
        assert!(matches!(err, ResolveError::MissingLocation { status: 301, .. }));
    }

    #[tokio::test]
    async fn test_redirect_loop_is_cut_off() {
        let server = MockServer::start().await;
        mount_redirect(&server, "/ping", 302, "/pong").await;
        mount_redirect(&server, "/pong", 302, "/ping").await;

        let err = resolver().resolve(&format!("{}/ping", server.uri())).await.unwrap_err();
        assert!(matches!(err, ResolveError::TooManyHops { max_hops: 10, .. }));
    }

    #[test]
    fn test_join_location() {
        assert_eq!(
            join_location("http://bit.ly/abc", "https://example.com/x").unwrap(),
            "https://example.com/x"
        );
        assert_eq!(join_location("http://bit.ly/abc", "/landing").unwrap(), "http://bit.ly/landing");
        assert!(join_location("http://bit.ly/abc", "   ").is_err());
    }
}
