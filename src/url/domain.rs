use crate::{UrlError, UrlResult};

/// Splits a URL into its protocol and domain
///
/// The protocol is everything before the first `//` (including the trailing
/// colon), and the domain is the authority that follows it, up to the first
/// `/`, `?` or `#`. Ports and IPv6 brackets are kept as written.
///
/// Unlike a split on only `/` and `?`, `https://example.com#fragment`
/// yields `example.com` rather than `example.com#fragment`.
///
/// # Errors
///
/// Returns [`UrlError::Invalid`] if the URL contains no `//` separator.
///
/// # Examples
///
/// ```
/// use ows_crawler::url::get_protocol_and_domain_from_url;
///
/// let (protocol, domain) =
///     get_protocol_and_domain_from_url("https://example.com:8080/path").unwrap();
/// assert_eq!(protocol, "https:");
/// assert_eq!(domain, "example.com:8080");
///
/// let (_, domain) = get_protocol_and_domain_from_url("https://example.com#top").unwrap();
/// assert_eq!(domain, "example.com");
/// ```
pub fn get_protocol_and_domain_from_url(url: &str) -> UrlResult<(String, String)> {
    let (protocol, rest) = url
        .split_once("//")
        .ok_or_else(|| UrlError::Invalid(format!("\"{}\"", crate::short_url(url))))?;

    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    Ok((protocol.to_string(), rest[..end].to_string()))
}

/// Strips a trailing `:port` from a domain, leaving bracketed hosts untouched
pub fn host_without_port(domain: &str) -> &str {
    if domain.contains(']') {
        return domain;
    }
    match domain.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => host,
        _ => domain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_and_domain_cases() {
        let cases = [
            ("http://example.com/path?query=123#section", "http:", "example.com"),
            ("https://example.com?query", "https:", "example.com"),
            ("http://example.com/path", "http:", "example.com"),
            ("http://example.com", "http:", "example.com"),
            ("https://example.com/path?query#section", "https:", "example.com"),
            ("http://example.com/path/another#section", "http:", "example.com"),
            ("http://example.com/path/another?query", "http:", "example.com"),
            ("http://example.com?query#section", "http:", "example.com"),
            ("http://subdomain.example.com/path", "http:", "subdomain.example.com"),
            ("https://example.com:8080/path", "https:", "example.com:8080"),
            ("http://example.com//////path", "http:", "example.com"),
            ("http://example.com/path?query=1/2/3", "http:", "example.com"),
            ("http://example.com/path#", "http:", "example.com"),
            ("http://example.com?query?more", "http:", "example.com"),
            ("http://example.com/path;param?query#fragment", "http:", "example.com"),
            ("https://example.com#fragment", "https:", "example.com"),
            ("http://192.168.0.1/path", "http:", "192.168.0.1"),
            ("http://[::1]/path", "http:", "[::1]"),
        ];

        for (url, expected_protocol, expected_domain) in cases {
            let (protocol, domain) = get_protocol_and_domain_from_url(url).unwrap();
            assert_eq!(protocol, expected_protocol, "protocol of {}", url);
            assert_eq!(domain, expected_domain, "domain of {}", url);
        }
    }

    #[test]
    fn test_missing_separator_is_invalid() {
        let result = get_protocol_and_domain_from_url("example.com/path");
        assert!(matches!(result, Err(UrlError::Invalid(_))));

        let result = get_protocol_and_domain_from_url("mailto:someone@example.com");
        assert!(matches!(result, Err(UrlError::Invalid(_))));
    }

    #[test]
    fn test_host_without_port() {
        assert_eq!(host_without_port("example.com:8080"), "example.com");
        assert_eq!(host_without_port("example.com"), "example.com");
        assert_eq!(host_without_port("127.0.0.1:3000"), "127.0.0.1");
        assert_eq!(host_without_port("[::1]:8080"), "[::1]:8080");
        assert_eq!(host_without_port("[::1]"), "[::1]");
    }
}
