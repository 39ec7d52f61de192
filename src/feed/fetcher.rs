use feed_rs::parser;
use thiserror::Error;

use crate::storage::NewsEntry;

/// Errors retrieving or parsing a feed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The string is not a URL at all.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// Network-level error (DNS, connection, TLS, timeout).
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code.
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Body could not be parsed as RSS or Atom.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// A downloaded, parsed feed: its title plus entries in feed order.
#[derive(Debug)]
pub struct FetchedFeed {
    pub title: String,
    pub entries: Vec<NewsEntry>,
}

/// Downloads and parses the feed at `url`.
///
/// Doubles as URL validation for the add-source prompt: any failure here
/// means the URL does not point at a parseable feed. Entries come back in
/// the feed's own order, with transient ids (0) and HTML-stripped
/// summaries.
pub async fn fetch_feed(client: &reqwest::Client, url: &str) -> Result<FetchedFeed, FetchError> {
    url::Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;

    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::HttpStatus(status.as_u16()));
    }
    let bytes = response.bytes().await?;
    parse_entries(&bytes)
}

fn parse_entries(bytes: &[u8]) -> Result<FetchedFeed, FetchError> {
    let feed = parser::parse(bytes).map_err(|e| FetchError::Parse(e.to_string()))?;

    let title = feed
        .title
        .map(|t| t.content)
        .unwrap_or_else(|| "Untitled feed".to_string());

    let entries = feed
        .entries
        .into_iter()
        .map(|entry| {
            let url = entry
                .links
                .first()
                .map(|l| l.href.clone())
                .unwrap_or_default();
            let author = entry
                .authors
                .first()
                .map(|a| a.name.clone())
                .unwrap_or_else(|| "Unknown author".to_string());
            let summary = entry
                .summary
                .map(|s| s.content)
                .or_else(|| entry.content.and_then(|c| c.body))
                .map(|s| strip_html(&s))
                .unwrap_or_default();
            let title = entry
                .title
                .map(|t| t.content)
                .unwrap_or_else(|| "Untitled".to_string());
            let published_at = entry.published.or(entry.updated).map(|dt| dt.timestamp());

            NewsEntry {
                id: 0,
                title,
                author,
                url,
                summary,
                published_at,
                bookmarked: false,
            }
        })
        .collect();

    Ok(FetchedFeed { title, entries })
}

/// Strips `<...>` tag runs from feed-supplied HTML fragments and decodes
/// entities, leaving plain text for the summary panel.
pub fn strip_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    html_escape::decode_html_entities(&out).trim().to_string()
}
