//! URL handling module
//!
//! This module provides protocol/domain extraction and the resolution of raw
//! anchor `href` values into absolute http(s) URLs.

mod domain;
mod normalize;

pub use domain::{get_protocol_and_domain_from_url, host_without_port};
pub use normalize::resolve_link;

/// Returns true if the URL starts with `http://` or `https://` (any case)
pub fn is_http_url(url: &str) -> bool {
    let prefix: String = url.chars().take(8).collect::<String>().to_ascii_lowercase();
    prefix.starts_with("http://") || prefix.starts_with("https://")
}
