//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the shared HTTP client with the configured user agent
//! - Bounded streaming GET requests for pages
//! - robots.txt retrieval
//! - Error classification

use crate::config::CrawlerOptions;
use crate::crawler::Page;
use crate::net::is_ip_private;
use crate::robots::robots_url;
use crate::CrawlError;
use futures_util::StreamExt;
use reqwest::{redirect, Client, Response};
use std::time::Instant;
use url::Host;

/// Maximum number of redirects followed per request
const MAX_REDIRECTS: usize = 10;

/// Builds an HTTP client with proper configuration
///
/// Unless private hosts are allowed, redirects to loopback, `localhost` and
/// private IP literals are not followed.
///
/// # Example
///
/// ```no_run
/// use ows_crawler::config::CrawlerOptions;
/// use ows_crawler::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerOptions::default()).unwrap();
/// ```
pub fn build_http_client(options: &CrawlerOptions) -> Result<Client, reqwest::Error> {
    let allow_private_hosts = options.allow_private_hosts;

    let policy = redirect::Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error("too many redirects");
        }
        if !allow_private_hosts && redirects_to_private(attempt.url()) {
            tracing::debug!("Not following redirect to {}", attempt.url());
            return attempt.stop();
        }
        attempt.follow()
    });

    Client::builder()
        .user_agent(options.user_agent.as_str())
        .connect_timeout(options.page_timeout)
        .redirect(policy)
        .gzip(true)
        .brotli(true)
        .build()
}

fn redirects_to_private(url: &url::Url) -> bool {
    match url.host() {
        Some(Host::Ipv4(ip)) => is_ip_private(ip),
        Some(Host::Ipv6(_)) => true,
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        None => true,
    }
}

/// Fetches a page with a bounded body read
///
/// The body is streamed until it ends or `max_page_size` bytes are held;
/// anything past the limit is dropped.
///
/// # Returns
///
/// * `Ok(Some(Page))` - The response, whatever its status code
/// * `Ok(None)` - The response body was empty
/// * `Err(CrawlError::Timeout | CrawlError::Connection)` - Transport failure
pub async fn fetch_page(
    client: &Client,
    options: &CrawlerOptions,
    url: &str,
) -> Result<Option<Page>, CrawlError> {
    let start = Instant::now();

    let response = client
        .get(url)
        .timeout(options.page_timeout)
        .send()
        .await
        .map_err(|e| CrawlError::from_transport(url, e))?;

    let status_code = response.status().as_u16();
    let headers = response.headers().clone();

    let content = read_bounded(response, options.max_page_size, options.content_buffer_size)
        .await
        .map_err(|e| CrawlError::from_transport(url, e))?;

    if content.is_empty() {
        return Ok(None);
    }

    let page = Page::new(status_code, start.elapsed(), headers, content, url)?;
    Ok(Some(page))
}

/// Fetches a domain's robots.txt body
///
/// A 4xx response yields an empty body (no restrictions). Transport errors
/// are returned so the caller can decide to fail open.
///
/// # Arguments
///
/// * `protocol` - The scheme including the colon (e.g. `https:`)
/// * `domain` - The authority, possibly with a port
pub async fn fetch_robots_txt(
    client: &Client,
    options: &CrawlerOptions,
    protocol: &str,
    domain: &str,
) -> Result<String, CrawlError> {
    let url = robots_url(protocol, domain);
    tracing::info!("Getting robots.txt for {}", domain);

    let response = client
        .get(&url)
        .timeout(options.robots_timeout)
        .send()
        .await
        .map_err(|e| CrawlError::from_transport(&url, e))?;

    if response.status().is_client_error() {
        tracing::debug!("No robots.txt for {} (HTTP {})", domain, response.status());
        return Ok(String::new());
    }

    let body = read_bounded(response, options.max_robots_size, options.content_buffer_size)
        .await
        .map_err(|e| CrawlError::from_transport(&url, e))?;

    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Reads at most `limit` bytes of a response body
async fn read_bounded(
    response: Response,
    limit: usize,
    capacity_hint: usize,
) -> Result<Vec<u8>, reqwest::Error> {
    let mut body = Vec::with_capacity(capacity_hint.min(limit));
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        let remaining = limit - body.len();

        if chunk.len() >= remaining {
            body.extend_from_slice(&chunk[..remaining]);
            break;
        }

        body.extend_from_slice(&chunk);
    }

    Ok(body)
}
