use crate::config::CrawlerOptions;
use crate::net::HostValidator;
use crate::url::{get_protocol_and_domain_from_url, host_without_port};
use std::sync::Arc;

/// Pre-fetch gate for discovered URLs
///
/// Rejects URLs that end in an ignored file extension and URLs whose host
/// resolves into private or local network space.
pub struct ComplianceEngine {
    options: Arc<CrawlerOptions>,
    validator: HostValidator,
}

impl ComplianceEngine {
    pub fn new(options: Arc<CrawlerOptions>, validator: HostValidator) -> Self {
        Self { options, validator }
    }

    pub fn options(&self) -> &CrawlerOptions {
        &self.options
    }

    /// Returns true if `url` may be added to the frontier
    ///
    /// Host resolution failures reject the URL.
    pub async fn admit(&self, url: &str) -> bool {
        if self.options.check_url_ending && has_ignored_ending(url, &self.options) {
            tracing::debug!("Ignoring {}: file extension", crate::short_url(url));
            return false;
        }

        if self.options.allow_private_hosts {
            return true;
        }

        let domain = match get_protocol_and_domain_from_url(url) {
            Ok((_, domain)) => domain,
            Err(e) => {
                tracing::debug!("Rejecting URL: {}", e);
                return false;
            }
        };

        match self.validator.is_host_private(host_without_port(&domain)).await {
            Ok(false) => true,
            Ok(true) => {
                tracing::debug!("Rejecting {}: private host", crate::short_url(url));
                false
            }
            Err(e) => {
                tracing::debug!("Rejecting {}: {}", crate::short_url(url), e);
                false
            }
        }
    }
}

/// Returns true if the URL's last path segment carries an ignored extension
///
/// Only applies when the URL has a path segment after the authority and that
/// segment contains a `.`. Query and fragment are ignored.
pub fn has_ignored_ending(url: &str, options: &CrawlerOptions) -> bool {
    let url = url.split(['?', '#']).next().unwrap_or(url);
    let rest = url.split_once("//").map_or(url, |(_, rest)| rest);

    let Some((_, path)) = rest.split_once('/') else {
        return false;
    };
    let last = path.rsplit('/').next().unwrap_or(path);

    match last.rsplit_once('.') {
        Some((_, ext)) => options.ignored_url_endings.contains(&ext.to_lowercase()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options_with(extensions: &[&str]) -> CrawlerOptions {
        CrawlerOptions::default().with_ignored_extensions(extensions.iter().copied())
    }

    fn engine(options: CrawlerOptions) -> ComplianceEngine {
        ComplianceEngine::new(Arc::new(options), HostValidator::default())
    }

    #[test]
    fn test_ignored_ending_matches() {
        let options = options_with(&["pdf", "jpg"]);
        assert!(has_ignored_ending("https://example.com/file.pdf", &options));
        assert!(has_ignored_ending("https://example.com/a/b/photo.JPG", &options));
        assert!(has_ignored_ending("https://example.com/file.pdf?dl=1", &options));
        assert!(has_ignored_ending("https://example.com/file.pdf#page=2", &options));
    }

    #[test]
    fn test_ignored_ending_skips_non_files() {
        let options = options_with(&["pdf", "com"]);
        assert!(!has_ignored_ending("https://example.com", &options));
        assert!(!has_ignored_ending("https://example.com/", &options));
        assert!(!has_ignored_ending("https://example.com/docs", &options));
        assert!(!has_ignored_ending("https://example.com/page.html", &options));
        assert!(!has_ignored_ending("https://example.com/?q=a.pdf", &options));
    }

    #[tokio::test]
    async fn test_admit_rejects_ignored_extension() {
        let mut options = options_with(&["pdf"]);
        options.allow_private_hosts = true;
        let engine = engine(options);

        assert!(!engine.admit("http://127.0.0.1/file.pdf").await);
        assert!(engine.admit("http://127.0.0.1/file.html").await);
    }

    #[tokio::test]
    async fn test_ending_check_can_be_disabled() {
        let mut options = options_with(&["pdf"]);
        options.allow_private_hosts = true;
        options.check_url_ending = false;
        let engine = engine(options);

        assert!(engine.admit("http://127.0.0.1/file.pdf").await);
    }

    #[tokio::test]
    async fn test_admit_rejects_private_hosts() {
        let engine = engine(CrawlerOptions::default());

        assert!(!engine.admit("http://127.0.0.1/").await);
        assert!(!engine.admit("http://localhost:8080/page").await);
        assert!(!engine.admit("http://10.0.0.1/").await);
        assert!(!engine.admit("http://[::1]/").await);
    }

    #[tokio::test]
    async fn test_admit_accepts_public_literal() {
        let engine = engine(CrawlerOptions::default());
        assert!(engine.admit("http://8.8.8.8/").await);
        assert!(engine.admit("https://1.1.1.1:443/page").await);
    }

    #[tokio::test]
    async fn test_admit_rejects_unresolvable_host() {
        let engine = engine(CrawlerOptions::default());
        assert!(!engine.admit("http://this-host-does-not-exist.invalid/").await);
    }

    #[tokio::test]
    async fn test_admit_rejects_invalid_url() {
        let engine = engine(CrawlerOptions::default());
        assert!(!engine.admit("not a url").await);
    }
}
