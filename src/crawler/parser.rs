//! Sitemap parser for extracting location entries
//!
//! Works on already-fetched content only. The bounded wait for a
//! location-bearing node happens inside the fetch session; this module turns
//! a timed-out wait into a [`ParseError::Timeout`] and otherwise returns the
//! text of every `<loc>` node.
//!
//! Raw sitemap XML is read with an XML reader so CDATA sections and entities
//! come through intact. Browser-rendered pages are HTML and go through the
//! selector engine instead.

use crate::crawler::fetcher::{RenderedContent, WaitOutcome, LOCATION_SELECTOR};
use crate::ParseError;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Extracts every location entry from a sitemap document
///
/// # Extraction Rules
///
/// - Entries come from `<loc>` nodes, in document order
/// - CDATA sections count as text
/// - Surrounding whitespace is trimmed
/// - Empty nodes are dropped
/// - Works on both `<urlset>` and `<sitemapindex>` documents
///
/// # Arguments
///
/// * `content` - The fetched document
///
/// # Returns
///
/// * `Ok(Vec<String>)` - The location entries (possibly empty)
/// * `Err(ParseError::Timeout)` - No location node appeared before the wait deadline
///
/// # Example
///
/// ```
/// use sitemap_sieve::crawler::{parse_locations, RenderedContent};
///
/// let xml = "<urlset><url><loc>https://example.com/a</loc></url></urlset>";
/// let content = RenderedContent::new("https://example.com/sitemap.xml", xml);
/// assert_eq!(parse_locations(&content).unwrap(), vec!["https://example.com/a"]);
/// ```
pub fn parse_locations(content: &RenderedContent) -> Result<Vec<String>, ParseError> {
    if let WaitOutcome::TimedOut { selector, waited } = &content.wait {
        return Err(ParseError::Timeout {
            url: content.url.clone(),
            selector: selector.clone(),
            waited_ms: waited.as_millis() as u64,
        });
    }

    let entries = if is_xml_document(&content.body) {
        match xml_locations(&content.body) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("Malformed XML from {} ({}), falling back to HTML", content.url, e);
                content.extract_all(LOCATION_SELECTOR)
            }
        }
    } else {
        content.extract_all(LOCATION_SELECTOR)
    };

    Ok(entries.into_iter().filter(|entry| !entry.is_empty()).collect())
}

/// True for bodies served as sitemap XML rather than a rendered page
fn is_xml_document(body: &str) -> bool {
    let head = body.trim_start_matches('\u{feff}').trim_start();
    head.starts_with("<?xml") || head.starts_with("<urlset") || head.starts_with("<sitemapindex")
}

/// Reads the trimmed text of every `<loc>` element with an XML reader
fn xml_locations(body: &str) -> Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(body);
    let mut locations = Vec::new();
    let mut current: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == LOCATION_SELECTOR.as_bytes() => {
                current = Some(String::new());
            }
            Event::End(e) if e.local_name().as_ref() == LOCATION_SELECTOR.as_bytes() => {
                if let Some(text) = current.take() {
                    locations.push(text.trim().to_string());
                }
            }
            Event::Text(t) => {
                if let Some(text) = current.as_mut() {
                    text.push_str(&t.unescape()?);
                }
            }
            Event::CData(c) => {
                if let Some(text) = current.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(locations)
}

/// Convenience function collapsing a parse timeout into "no entries"
pub fn parse_locations_or_empty(content: &RenderedContent) -> Vec<String> {
    match parse_locations(content) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("{}", e);
            Vec::new()
        }
    }
}
