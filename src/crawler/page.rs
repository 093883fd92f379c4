use crate::crawler::parser::{parse_html, ParsedHtml};
use crate::url::{get_protocol_and_domain_from_url, resolve_link};
use crate::UrlResult;
use reqwest::header::HeaderMap;
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;

/// One fetched page
///
/// URL-derived fields are computed when the page is built. The HTML is parsed
/// at most once, on the first call to [`Page::html_title`] or [`Page::links`].
pub struct Page {
    status_code: u16,
    elapsed: Duration,
    headers: HeaderMap,
    content: Vec<u8>,
    url: String,

    base_url: String,
    path: String,
    protocol: String,
    domain: String,

    html: OnceLock<ParsedHtml>,
}

impl Page {
    /// Builds a page from a completed response
    ///
    /// # Errors
    ///
    /// Returns [`crate::UrlError::Invalid`] if `url` has no `//`.
    pub fn new(
        status_code: u16,
        elapsed: Duration,
        headers: HeaderMap,
        content: Vec<u8>,
        url: &str,
    ) -> UrlResult<Self> {
        let (protocol, domain) = get_protocol_and_domain_from_url(url)?;
        let base_url = format!("{}//{}", protocol, domain);

        let rest = url.get(base_url.len()..).unwrap_or("");
        let path = match rest.split(['?', '#']).next() {
            Some(path) if !path.is_empty() => path.to_string(),
            _ => "/".to_string(),
        };

        Ok(Self {
            status_code,
            elapsed,
            headers,
            content,
            url: url.to_string(),
            base_url,
            path,
            protocol: protocol.trim_end_matches(':').to_string(),
            domain,
            html: OnceLock::new(),
        })
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Time from sending the request until the body was read
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// `scheme://host[:port]`
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The URL path without query or fragment (`/` if empty)
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The scheme without the colon, e.g. `https`
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn html_title(&self) -> &str {
        &self.parsed().title
    }

    /// Absolute http(s) URLs linked from the first anchors of the page
    pub fn links(&self) -> HashSet<String> {
        self.parsed()
            .hrefs
            .iter()
            .filter_map(|href| resolve_link(&self.base_url, &self.path, &self.protocol, href))
            .collect()
    }

    fn parsed(&self) -> &ParsedHtml {
        self.html.get_or_init(|| parse_html(&self.content))
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("url", &self.url)
            .field("status_code", &self.status_code)
            .field("elapsed", &self.elapsed)
            .field("content_length", &self.content.len())
            .finish()
    }
}
