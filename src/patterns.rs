// src/patterns.rs
// =============================================================================
// The text patterns each pipeline stage uses to narrow down comments.
//
// There are three regexes, from cheapest to strictest:
// - loose:      "does this comment look like it has a link at all?" (Scanner)
// - strict:     "does it look like a short link?" (Filter)
// - extraction: "give me every short link in the body" (Revealer)
//
// Plus a list of known short-url services (bit.ly, ow.ly, ...). A URL only
// counts as a short link if it contains one of those identifiers.
//
// The PatternSet is built once at startup and shared read-only between the
// stages through an Arc.
// =============================================================================

use std::path::Path;

use regex::Regex;

use crate::config::PatternConfig;
use crate::error::ConfigError;

/// Known short-url service identifiers (host fragments like "bit.ly").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShortUrlServices {
    identifiers: Vec<String>,
}

impl ShortUrlServices {
    /// Parses a service list: one identifier per line, `#` starts a comment line.
    pub fn from_list(text: &str) -> Self {
        let identifiers = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();

        Self { identifiers }
    }

    /// Reads the service list from disk. An empty list is an error since
    /// nothing could ever match.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let services = Self::from_list(&text);
        if services.is_empty() {
            return Err(ConfigError::EmptyServices(path.to_path_buf()));
        }
        Ok(services)
    }

    /// True if any identifier appears anywhere in `url`.
    pub fn matches(&self, url: &str) -> bool {
        self.identifiers.iter().any(|id| url.contains(id.as_str()))
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }
}

/// The compiled patterns plus the service list.
#[derive(Debug, Clone)]
pub struct PatternSet {
    loose: Regex,
    strict: Regex,
    extraction: Regex,
    services: ShortUrlServices,
}

impl PatternSet {
    /// Compiles the three patterns. The error names which one was invalid.
    pub fn new(config: &PatternConfig, services: ShortUrlServices) -> Result<Self, ConfigError> {
        Ok(Self {
            loose: compile("loose", &config.loose)?,
            strict: compile("strict", &config.strict)?,
            extraction: compile("extraction", &config.extraction)?,
            services,
        })
    }

    pub fn loose(&self) -> &Regex {
        &self.loose
    }

    pub fn strict(&self) -> &Regex {
        &self.strict
    }

    pub fn extraction(&self) -> &Regex {
        &self.extraction
    }

    /// First pass: anything that might contain a link.
    pub fn is_candidate(&self, body: &str) -> bool {
        self.loose.is_match(body)
    }

    /// Second pass: the first short-link-shaped substring, if any.
    pub fn strict_match<'a>(&self, body: &'a str) -> Option<&'a str> {
        self.strict.find(body).map(|m| m.as_str())
    }

    /// Third pass: every occurrence in the body, in order.
    pub fn extract<'a>(&'a self, body: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.extraction.find_iter(body).map(|m| m.as_str())
    }

    /// Does this URL point at a known short-url service?
    pub fn is_short_url(&self, url: &str) -> bool {
        self.services.matches(url)
    }
}

fn compile(name: &'static str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::Pattern { name, source })
}

/// Turns a matched substring into something we can send a request to.
///
/// Drops one trailing space and adds `http://` if there is no scheme.
///
/// Example:
///   "bit.ly/abc " -> "http://bit.ly/abc"
///   "https://bit.ly/abc" -> "https://bit.ly/abc"
pub fn complete_url(raw: &str) -> String {
    let url = raw.strip_suffix(' ').unwrap_or(raw);

    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("http://{}", url)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is a Regex?
//    - A compiled pattern for searching text
//    - Compiling is slow, matching is fast, so we compile once at startup
//
// 2. What does find_iter() return?
//    - An iterator over every non-overlapping match in the text
//    - It is lazy: matches are only found as the caller asks for them
//
// 3. Why `impl Iterator<Item = &'a str>` as a return type?
//    - The caller gets "some iterator" without naming the regex crate's type
//    - The 'a ties each match to the body it was found in
//
// 4. Why is the service check a substring test?
//    - "bit.ly" should match "http://bit.ly/x" and "https://www.bit.ly/x"
//    - contains() covers both without parsing the URL
// -----------------------------------------------------------------------------
