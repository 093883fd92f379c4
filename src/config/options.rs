use crate::config::types::CrawlerConfig;
use crate::ConfigError;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

/// Immutable crawler options shared by every component
///
/// Built once at process start from [`CrawlerConfig`] and the ignored
/// extensions file, then shared as `Arc<CrawlerOptions>`.
#[derive(Debug, Clone)]
pub struct CrawlerOptions {
    /// User agent sent with every request
    pub user_agent: String,

    /// Whether robots.txt rules and crawl delays are enforced
    pub follow_robots_txt: bool,

    /// Timeout for robots.txt requests
    pub robots_timeout: Duration,

    /// Timeout for page requests
    pub page_timeout: Duration,

    /// Whether discovered URLs are filtered by extension
    pub check_url_ending: bool,

    /// Lowercase extensions without the leading dot
    pub ignored_url_endings: HashSet<String>,

    /// Whether stored pages must carry an accepted content type
    pub check_content_type: bool,

    /// Content types accepted for storage
    pub accepted_content_types: Vec<String>,

    /// Maximum bytes read from a page body
    pub max_page_size: usize,

    /// Streaming read buffer size
    pub content_buffer_size: usize,

    /// Capacity of the in-process robots cache
    pub robots_cache_size: usize,

    /// Skip the private-network host check
    pub allow_private_hosts: bool,

    /// Maximum bytes read from a robots.txt body
    pub max_robots_size: usize,
}

impl CrawlerOptions {
    /// Builds options from the crawler config, reading the ignored extensions file if set
    pub fn from_config(config: &CrawlerConfig) -> Result<Self, ConfigError> {
        let ignored_url_endings = match &config.ignored_extensions_path {
            Some(path) => load_ignored_extensions(Path::new(path))?,
            None => HashSet::new(),
        };

        Ok(Self::from_parts(config, ignored_url_endings))
    }

    fn from_parts(config: &CrawlerConfig, ignored_url_endings: HashSet<String>) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            follow_robots_txt: config.follow_robots_txt,
            robots_timeout: Duration::from_secs(config.robots_timeout),
            page_timeout: Duration::from_secs(config.page_timeout),
            check_url_ending: config.check_url_ending,
            ignored_url_endings,
            check_content_type: config.check_content_type,
            accepted_content_types: config.accepted_content_types.clone(),
            max_page_size: config.max_page_size,
            content_buffer_size: config.content_buffer_size,
            robots_cache_size: config.robots_cache_size,
            allow_private_hosts: config.allow_private_hosts,
            max_robots_size: 512 * 1024,
        }
    }

    /// Returns a copy of these options with the given ignored extensions
    pub fn with_ignored_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ignored_url_endings = extensions
            .into_iter()
            .filter_map(|ext| normalize_extension(ext.as_ref()))
            .collect();
        self
    }

    /// The user agent's product token (the part before the first `/`)
    ///
    /// robots.txt groups are matched against this token.
    pub fn robots_agent(&self) -> &str {
        self.user_agent
            .split('/')
            .next()
            .unwrap_or(&self.user_agent)
            .trim()
    }
}

impl Default for CrawlerOptions {
    fn default() -> Self {
        Self::from_parts(&CrawlerConfig::default(), HashSet::new())
    }
}

/// Reads an ignored extensions file
///
/// The first line is a header and is skipped. Each remaining line holds one
/// extension; surrounding whitespace and a leading `.` are removed.
pub fn load_ignored_extensions(path: &Path) -> Result<HashSet<String>, ConfigError> {
    let content =
        std::fs::read_to_string(path).map_err(|source| ConfigError::IgnoredExtensions {
            path: path.display().to_string(),
            source,
        })?;

    Ok(content
        .lines()
        .skip(1)
        .filter_map(normalize_extension)
        .collect())
}

fn normalize_extension(raw: &str) -> Option<String> {
    let ext = raw.trim().trim_start_matches('.').to_lowercase();
    if ext.is_empty() || ext.starts_with('#') {
        None
    } else {
        Some(ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_options() {
        let options = CrawlerOptions::default();
        assert!(options.follow_robots_txt);
        assert_eq!(options.robots_timeout, Duration::from_secs(10));
        assert_eq!(options.page_timeout, Duration::from_secs(20));
        assert_eq!(options.max_page_size, 15_000_000);
        assert_eq!(options.content_buffer_size, 2048);
        assert!(options.ignored_url_endings.is_empty());
        assert!(!options.allow_private_hosts);
    }

    #[test]
    fn test_robots_agent_is_product_token() {
        let options = CrawlerOptions::default();
        assert_eq!(options.robots_agent(), "OWS-CRAWLER");
    }

    #[test]
    fn test_load_ignored_extensions_skips_header() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "pdf").unwrap();
        writeln!(file, "png").unwrap();
        writeln!(file, " .JPG ").unwrap();
        writeln!(file).unwrap();
        file.flush().unwrap();

        let extensions = load_ignored_extensions(file.path()).unwrap();
        assert_eq!(extensions.len(), 2);
        assert!(extensions.contains("png"));
        assert!(extensions.contains("jpg"));
        assert!(!extensions.contains("pdf"));
    }

    #[test]
    fn test_load_ignored_extensions_missing_file() {
        let result = load_ignored_extensions(Path::new("/nonexistent/extensions.txt"));
        assert!(matches!(
            result,
            Err(ConfigError::IgnoredExtensions { .. })
        ));
    }

    #[test]
    fn test_with_ignored_extensions() {
        let options = CrawlerOptions::default().with_ignored_extensions([".PDF", "zip", ""]);
        assert_eq!(options.ignored_url_endings.len(), 2);
        assert!(options.ignored_url_endings.contains("pdf"));
        assert!(options.ignored_url_endings.contains("zip"));
    }
}
