use serde::Deserialize;

/// Default user agent sent with every request
pub const DEFAULT_USER_AGENT: &str = "OWS-CRAWLER/0.1-DEV (https://github.com/quintindunn/OWS)";

/// Main configuration structure, as read from the TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// User agent sent with every request and matched against robots.txt
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Whether to follow the rules of /robots.txt (RFC 9309)
    #[serde(default = "default_true")]
    pub follow_robots_txt: bool,

    /// Timeout for robots.txt requests (seconds)
    #[serde(default = "default_robots_timeout")]
    pub robots_timeout: u64,

    /// Timeout for page requests, robots.txt excluded (seconds)
    #[serde(default = "default_page_timeout")]
    pub page_timeout: u64,

    /// Whether discovered URLs are filtered by their file extension
    #[serde(default = "default_true")]
    pub check_url_ending: bool,

    /// File listing ignored extensions, one per line after a header line
    #[serde(default)]
    pub ignored_extensions_path: Option<String>,

    /// Whether stored pages must carry an accepted content type
    #[serde(default = "default_true")]
    pub check_content_type: bool,

    /// Content types accepted for storage
    #[serde(default = "default_accepted_content_types")]
    pub accepted_content_types: Vec<String>,

    /// Maximum page content size in bytes
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,

    /// Streaming read buffer size in bytes
    #[serde(default = "default_content_buffer_size")]
    pub content_buffer_size: usize,

    /// Number of domains kept in the in-process robots cache
    #[serde(default = "default_robots_cache_size")]
    pub robots_cache_size: usize,

    /// Allow crawling hosts that resolve into private address space
    #[serde(default)]
    pub allow_private_hosts: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            follow_robots_txt: true,
            robots_timeout: default_robots_timeout(),
            page_timeout: default_page_timeout(),
            check_url_ending: true,
            ignored_extensions_path: None,
            check_content_type: true,
            accepted_content_types: default_accepted_content_types(),
            max_page_size: default_max_page_size(),
            content_buffer_size: default_content_buffer_size(),
            robots_cache_size: default_robots_cache_size(),
            allow_private_hosts: false,
        }
    }
}

/// Output locations
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Path of the frontier checkpoint written on shutdown
    #[serde(default = "default_checkpoint_path")]
    pub checkpoint_path: String,

    /// Newline-delimited seed URL list
    #[serde(default = "default_seeds_path")]
    pub seeds_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            checkpoint_path: default_checkpoint_path(),
            seeds_path: default_seeds_path(),
        }
    }
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_true() -> bool {
    true
}

fn default_robots_timeout() -> u64 {
    10
}

fn default_page_timeout() -> u64 {
    20
}

fn default_accepted_content_types() -> Vec<String> {
    vec!["text/html".to_string()]
}

fn default_max_page_size() -> usize {
    15_000_000
}

fn default_content_buffer_size() -> usize {
    2048
}

fn default_robots_cache_size() -> usize {
    1024
}

fn default_database_path() -> String {
    "./dbs/pages.db".to_string()
}

fn default_checkpoint_path() -> String {
    "./dumps/checkpoint.json".to_string()
}

fn default_seeds_path() -> String {
    "./configs/seeds.txt".to_string()
}
