/// Resolves a raw `href` against the page it was found on
///
/// # Resolution Rules
///
/// | `href` | Result |
/// |--------|--------|
/// | `//host/a` | `protocol:` + `href` |
/// | `/a/b` | `base_url` + `href` |
/// | `#frag` | discarded |
/// | no `:` (e.g. `page`) | `base_url` + `path` + `href` |
/// | scheme other than http/https | discarded |
/// | anything else | `href` unchanged |
///
/// Path-relative links are appended to the page path verbatim: `.` and `..`
/// segments are not collapsed.
///
/// # Arguments
///
/// * `base_url` - The page's `scheme://host[:port]`
/// * `path` - The page's URL path, without query
/// * `protocol` - The page's scheme without the colon (e.g. `https`)
/// * `href` - The raw attribute value
///
/// # Examples
///
/// ```
/// use ows_crawler::url::resolve_link;
///
/// let link = resolve_link("http://y.com", "/p/", "http", "relative");
/// assert_eq!(link.as_deref(), Some("http://y.com/p/relative"));
///
/// assert_eq!(resolve_link("http://y.com", "/", "http", "mailto:x@y.com"), None);
/// ```
pub fn resolve_link(base_url: &str, path: &str, protocol: &str, href: &str) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("//") {
        return Some(format!("{}:{}", protocol, href));
    }

    if href.starts_with('/') {
        return Some(format!("{}{}", base_url, href));
    }

    match href.split_once(':') {
        None => Some(format!("{}{}{}", base_url, path, href)),
        Some((scheme, _)) if is_http_scheme(scheme) => Some(href.to_string()),
        Some(_) => None,
    }
}

fn is_http_scheme(scheme: &str) -> bool {
    scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")
}
