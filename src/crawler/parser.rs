//! HTML parser for extracting links and metadata
//!
//! This module handles parsing fetched HTML to extract:
//! - Raw `href` values from `<a>` tags, in document order
//! - The page title

use scraper::{Html, Selector};

/// Maximum number of anchors read from one page
pub const MAX_LINKS_PER_PAGE: usize = 100;

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedHtml {
    /// The page title, or an empty string
    pub title: String,

    /// Raw `href` values of the first anchors on the page, unresolved
    pub hrefs: Vec<String>,
}

/// Parses HTML content and extracts the title and anchor hrefs
///
/// The parser is tolerant: malformed markup and invalid UTF-8 never fail,
/// they just yield fewer results.
///
/// # Title Rules
///
/// 1. Text of the first `<title>` element, if non-empty
/// 2. `content` of `<meta name="title">`
/// 3. Empty string
///
/// # Example
///
/// ```
/// use ows_crawler::crawler::parse_html;
///
/// let html = br#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let parsed = parse_html(html);
/// assert_eq!(parsed.title, "Test");
/// assert_eq!(parsed.hrefs, vec!["/page".to_string()]);
/// ```
pub fn parse_html(content: &[u8]) -> ParsedHtml {
    let html = String::from_utf8_lossy(content);
    let document = Html::parse_document(&html);

    ParsedHtml {
        title: extract_title(&document),
        hrefs: extract_hrefs(&document),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> String {
    if let Ok(title_selector) = Selector::parse("title") {
        let title = document
            .select(&title_selector)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty());

        if let Some(title) = title {
            return title;
        }
    }

    if let Ok(meta_selector) = Selector::parse(r#"meta[name="title"][content]"#) {
        if let Some(content) = document
            .select(&meta_selector)
            .next()
            .and_then(|element| element.value().attr("content"))
        {
            return content.trim().to_string();
        }
    }

    String::new()
}

/// Extracts `href` values from the first [`MAX_LINKS_PER_PAGE`] anchors
fn extract_hrefs(document: &Html) -> Vec<String> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .take(MAX_LINKS_PER_PAGE)
        .map(str::to_string)
        .collect()
}
