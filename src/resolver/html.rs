// src/resolver/html.rs
// =============================================================================
// This module finds meta-refresh redirects in HTML pages.
//
// Some short-url services answer with "200 OK" and a page like:
//   <meta http-equiv="Refresh" content="0;url=https://real.example/page">
// instead of a proper 3xx status. Browsers follow these, so we do too.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Copes with the broken HTML short-url landing pages tend to serve
//
// Rust concepts:
// - Enums with data: To describe the different things a page can contain
// - Option: For the content attribute that may be missing
// =============================================================================

use scraper::{Html, Selector};

// What a page said about redirecting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaRefresh {
    /// No refresh tag on the page
    Absent,
    /// A refresh tag that only reloads the page after a delay
    DelayOnly,
    /// A refresh tag pointing at another URL
    Target(String),
    /// A refresh tag whose content we could not make sense of
    Malformed(String),
}

// Looks for a meta-refresh tag in an HTML document
//
// Parameters:
//   html: the page body (borrowed as &str)
//
// Returns: what the first refresh tag on the page says
//
// Example:
//   html = r#"<meta http-equiv="Refresh" content="0;url=http://final.example">"#
//   result = MetaRefresh::Target("http://final.example")
pub fn find_meta_refresh(html: &str) -> MetaRefresh {
    let document = Html::parse_document(html);

    // "meta[http-equiv]" is a constant selector, parsing it cannot fail
    let Ok(selector) = Selector::parse("meta[http-equiv]") else {
        return MetaRefresh::Absent;
    };

    // http-equiv is matched case-insensitively: "Refresh", "refresh", "REFRESH"
    let tag = document.select(&selector).find(|element| {
        element
            .value()
            .attr("http-equiv")
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("refresh"))
    });

    match tag {
        Some(element) => parse_refresh_content(element.value().attr("content").unwrap_or("")),
        None => MetaRefresh::Absent,
    }
}

// Parses the content attribute of a refresh tag
//
// Accepted shapes:
//   "5"                      -> DelayOnly
//   "0;url=http://x"         -> Target("http://x")
//   "0; URL='http://x'"      -> Target("http://x")
//   "0;http://x"             -> Malformed (no url= prefix)
//   "0;url="                 -> Malformed (empty target)
fn parse_refresh_content(content: &str) -> MetaRefresh {
    let Some((_delay, rest)) = content.split_once(';') else {
        return MetaRefresh::DelayOnly;
    };

    let rest = rest.trim();
    if rest.is_empty() {
        return MetaRefresh::DelayOnly;
    }

    // The prefix check is case-insensitive, "url=" and "URL =" both work
    let target = rest
        .get(..3)
        .filter(|prefix| prefix.eq_ignore_ascii_case("url"))
        .and_then(|_| rest[3..].trim_start().strip_prefix('='));

    match target.map(strip_quotes) {
        Some(url) if !url.is_empty() => MetaRefresh::Target(url.to_string()),
        _ => MetaRefresh::Malformed(content.to_string()),
    }
}

// Removes matching single or double quotes around a value
fn strip_quotes(value: &str) -> &str {
    let value = value.trim();
    for quote in ['\'', '"'] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner.trim();
        }
    }
    value
}
