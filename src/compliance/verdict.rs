use crate::config::CrawlerOptions;
use crate::robots::ParsedRobots;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Outcome of checking a URL against a domain's robots.txt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotsVerdict {
    /// The URL may be fetched now
    Allowed,
    /// robots.txt disallows the URL for this agent
    Denied,
    /// The domain's crawl delay has not elapsed; try again after this long
    RetryAfter(Duration),
}

/// Checks a URL against robots rules and the domain's crawl delay
///
/// The agent used for matching is the user agent's product token. The
/// minimum gap between fetches is the larger of `Crawl-delay` and the
/// `Request-rate` interval of the matching group.
///
/// # Arguments
///
/// * `options` - Crawler options (for the user agent)
/// * `url` - The URL about to be fetched
/// * `robots` - The domain's parsed robots.txt
/// * `last_crawled` - When a page of this domain was last fetched
/// * `now` - The current time
pub fn check(
    options: &CrawlerOptions,
    url: &str,
    robots: &ParsedRobots,
    last_crawled: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> RobotsVerdict {
    let agent = options.robots_agent();

    if !robots.is_allowed(url, agent) {
        return RobotsVerdict::Denied;
    }

    let (Some(min_gap), Some(last)) = (robots.min_interval(agent), last_crawled) else {
        return RobotsVerdict::Allowed;
    };

    // A clock that moved backwards counts as no time elapsed
    let elapsed = (now - last).to_std().unwrap_or(Duration::ZERO);

    if elapsed < min_gap {
        RobotsVerdict::RetryAfter(min_gap - elapsed)
    } else {
        RobotsVerdict::Allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://example.com/page";

    fn robots(content: &str) -> ParsedRobots {
        ParsedRobots::from_content(content)
    }

    #[test]
    fn test_allowed_without_rules() {
        let options = CrawlerOptions::default();
        let verdict = check(&options, URL, &ParsedRobots::allow_all(), None, Utc::now());
        assert_eq!(verdict, RobotsVerdict::Allowed);
    }

    #[test]
    fn test_denied_by_disallow() {
        let options = CrawlerOptions::default();
        let verdict = check(
            &options,
            URL,
            &robots("User-agent: *\nDisallow: /page"),
            None,
            Utc::now(),
        );
        assert_eq!(verdict, RobotsVerdict::Denied);
    }

    #[test]
    fn test_denied_for_product_token_group() {
        let options = CrawlerOptions::default();
        let verdict = check(
            &options,
            URL,
            &robots("User-agent: OWS-CRAWLER\nDisallow: /\n\nUser-agent: *\nAllow: /"),
            None,
            Utc::now(),
        );
        assert_eq!(verdict, RobotsVerdict::Denied);
    }

    #[test]
    fn test_crawl_delay_not_elapsed() {
        let options = CrawlerOptions::default();
        let now = Utc::now();
        let last = now - chrono::Duration::seconds(2);

        let verdict = check(
            &options,
            URL,
            &robots("User-agent: *\nCrawl-delay: 10"),
            Some(last),
            now,
        );
        assert_eq!(verdict, RobotsVerdict::RetryAfter(Duration::from_secs(8)));
    }

    #[test]
    fn test_out_of_range_crawl_delay_allows() {
        let options = CrawlerOptions::default();
        let now = Utc::now();

        let verdict = check(
            &options,
            URL,
            &robots("User-agent: *\nCrawl-delay: 1e20"),
            Some(now),
            now,
        );
        assert_eq!(verdict, RobotsVerdict::Allowed);
    }

    #[test]
    fn test_crawl_delay_elapsed() {
        let options = CrawlerOptions::default();
        let now = Utc::now();
        let last = now - chrono::Duration::seconds(2);

        let verdict = check(
            &options,
            URL,
            &robots("User-agent: *\nCrawl-delay: 1"),
            Some(last),
            now,
        );
        assert_eq!(verdict, RobotsVerdict::Allowed);
    }

    #[test]
    fn test_first_visit_is_never_delayed() {
        let options = CrawlerOptions::default();
        let verdict = check(
            &options,
            URL,
            &robots("User-agent: *\nCrawl-delay: 30"),
            None,
            Utc::now(),
        );
        assert_eq!(verdict, RobotsVerdict::Allowed);
    }

    #[test]
    fn test_request_rate_enforced() {
        let options = CrawlerOptions::default();
        let now = Utc::now();
        let last = now - chrono::Duration::seconds(1);

        let verdict = check(
            &options,
            URL,
            &robots("User-agent: *\nRequest-rate: 1/5"),
            Some(last),
            now,
        );
        assert_eq!(verdict, RobotsVerdict::RetryAfter(Duration::from_secs(4)));
    }

    #[test]
    fn test_malformed_delay_ignored() {
        let options = CrawlerOptions::default();
        let now = Utc::now();

        let verdict = check(
            &options,
            URL,
            &robots("User-agent: *\nCrawl-delay: later"),
            Some(now),
            now,
        );
        assert_eq!(verdict, RobotsVerdict::Allowed);
    }
}
