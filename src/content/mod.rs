//! Article content retrieval for the full-text overlay.
//!
//! Fetches the entry's page and pulls out the text of its `<p>` elements,
//! in document order. Real-world pages are not well-formed XML, so the
//! tokenizer runs in lenient mode and extraction stops quietly at the
//! first unrecoverable token, keeping whatever was collected up to there.

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

/// Errors retrieving a page for content extraction.
#[derive(Debug, Error)]
pub enum ContentError {
    /// Network-level error (DNS, connection, TLS, timeout).
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code.
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
}

/// Downloads `url` and returns the text of its paragraphs in order.
pub async fn fetch_paragraphs(
    client: &reqwest::Client,
    url: &str,
) -> Result<Vec<String>, ContentError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ContentError::HttpStatus(status.as_u16()));
    }
    let body = response.text().await?;
    Ok(extract_paragraphs(&body))
}

/// Collects the text content of every `<p>` element in `html`.
///
/// Text inside nested inline tags (`<b>`, `<a>`, ...) is kept; entities
/// are decoded; blank paragraphs are dropped.
pub fn extract_paragraphs(html: &str) -> Vec<String> {
    let mut reader = Reader::from_str(html);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"p" => {
                current = Some(String::new());
            }
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"p" => {
                if let Some(text) = current.take() {
                    let text = text.trim().to_string();
                    if !text.is_empty() {
                        paragraphs.push(text);
                    }
                }
            }
            Ok(Event::Text(t)) => {
                if let Some(ref mut text) = current {
                    let raw = String::from_utf8_lossy(t.as_ref()).into_owned();
                    text.push_str(&html_escape::decode_html_entities(&raw));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                // Messy HTML; keep what we have.
                tracing::debug!(error = %e, "Stopping paragraph extraction on tokenizer error");
                break;
            }
            Ok(_) => {}
        }
    }

    paragraphs
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extracts_paragraphs_in_order() {
        let html = "<html><body><p>first</p><div>skip</div><p>second</p></body></html>";
        assert_eq!(extract_paragraphs(html), vec!["first", "second"]);
    }

    #[test]
    fn test_keeps_text_of_nested_inline_tags() {
        let html = "<p>one <b>bold</b> two</p>";
        assert_eq!(extract_paragraphs(html), vec!["one bold two"]);
    }

    #[test]
    fn test_decodes_entities() {
        let html = "<p>fish &amp; chips</p>";
        assert_eq!(extract_paragraphs(html), vec!["fish & chips"]);
    }

    #[test]
    fn test_ignores_text_outside_paragraphs() {
        let html = "<div>outside</div><p>inside</p>";
        assert_eq!(extract_paragraphs(html), vec!["inside"]);
    }

    #[test]
    fn test_drops_empty_paragraphs() {
        let html = "<p>  </p><p>kept</p>";
        assert_eq!(extract_paragraphs(html), vec!["kept"]);
    }

    #[test]
    fn test_no_paragraphs() {
        assert!(extract_paragraphs("<html><body>plain</body></html>").is_empty());
    }
}
