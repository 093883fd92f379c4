//! Robots.txt parser implementation
//!
//! Allow/disallow decisions are delegated to the robotstxt crate. The
//! `Crawl-delay` and `Request-rate` directives are not covered by it, so the
//! groups are walked here.

use robotstxt::DefaultMatcher;
use std::time::Duration;

/// A `Request-rate: n/s` directive: at most `requests` every `seconds`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestRate {
    pub requests: u32,
    pub seconds: u32,
}

impl RequestRate {
    fn parse(value: &str) -> Option<Self> {
        let (requests, seconds) = value.split_once('/')?;
        let requests: u32 = requests.trim().parse().ok()?;
        let seconds: u32 = seconds.trim().parse().ok()?;

        if requests == 0 {
            return None;
        }

        Some(Self { requests, seconds })
    }

    /// Minimum spacing between two requests
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(f64::from(self.seconds) / f64::from(self.requests))
    }
}

/// Parsed robots.txt data
///
/// An empty body allows everything and carries no delays.
#[derive(Debug, Clone, Default)]
pub struct ParsedRobots {
    content: String,
}

/// One `User-agent` group with the rate directives that follow it
#[derive(Debug, Default)]
struct Group {
    agents: Vec<String>,
    crawl_delay: Option<Duration>,
    request_rate: Option<RequestRate>,
}

impl ParsedRobots {
    /// Creates a new ParsedRobots from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
        }
    }

    /// Creates a permissive ParsedRobots that allows everything
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Returns the raw robots.txt content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Checks if a URL is allowed for the given agent
    ///
    /// # Arguments
    ///
    /// * `url` - The full URL (or path) to check
    /// * `agent` - The product token of the user agent (e.g. `OWS-CRAWLER`)
    pub fn is_allowed(&self, url: &str, agent: &str) -> bool {
        if self.content.is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, agent, url)
    }

    /// Gets the crawl delay in seconds for the given agent
    ///
    /// The group naming the agent wins over the `*` group. Values that are
    /// not non-negative numbers, or too large for a `Duration`, are ignored.
    pub fn crawl_delay(&self, agent: &str) -> Option<f64> {
        self.matching_group(agent)
            .and_then(|group| group.crawl_delay)
            .map(|delay| delay.as_secs_f64())
    }

    /// Gets the request rate for the given agent
    pub fn request_rate(&self, agent: &str) -> Option<RequestRate> {
        self.matching_group(agent)
            .and_then(|group| group.request_rate)
    }

    /// The minimum gap between two fetches from the same domain
    ///
    /// The larger of the crawl delay and the request-rate interval, or `None`
    /// if neither is given.
    pub fn min_interval(&self, agent: &str) -> Option<Duration> {
        let group = self.matching_group(agent)?;

        let delay = group.crawl_delay;
        let rate = group.request_rate.map(|rate| rate.interval());

        match (delay, rate) {
            (Some(d), Some(r)) => Some(d.max(r)),
            (d, r) => d.or(r),
        }
    }

    fn matching_group(&self, agent: &str) -> Option<Group> {
        if self.content.is_empty() {
            return None;
        }

        let agent = agent.to_lowercase();
        let mut wildcard = None;

        for group in parse_groups(&self.content) {
            if group.agents.iter().any(|a| a != "*" && agent.contains(a.as_str())) {
                return Some(group);
            }
            if wildcard.is_none() && group.agents.iter().any(|a| a == "*") {
                wildcard = Some(group);
            }
        }

        wildcard
    }
}

/// Parses a `Crawl-delay` value in seconds
///
/// Negative, NaN and out-of-range values yield `None`.
fn parse_delay(value: &str) -> Option<Duration> {
    let seconds: f64 = value.parse().ok()?;
    Duration::try_from_secs_f64(seconds).ok()
}

fn parse_groups(content: &str) -> Vec<Group> {
    let mut groups = Vec::new();
    let mut current = Group::default();
    // A user-agent line after any other directive starts a new group
    let mut in_agent_lines = false;

    for line in content.lines() {
        let line = match line.split_once('#') {
            Some((before, _)) => before,
            None => line,
        }
        .trim();

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        let value = value.trim();

        match key.as_str() {
            "user-agent" => {
                if !in_agent_lines && !current.agents.is_empty() {
                    groups.push(std::mem::take(&mut current));
                }
                in_agent_lines = true;
                if !value.is_empty() {
                    current.agents.push(value.to_lowercase());
                }
            }
            "crawl-delay" => {
                in_agent_lines = false;
                if let Some(delay) = parse_delay(value) {
                    current.crawl_delay = Some(delay);
                }
            }
            "request-rate" => {
                in_agent_lines = false;
                if let Some(rate) = RequestRate::parse(value) {
                    current.request_rate = Some(rate);
                }
            }
            _ => in_agent_lines = false,
        }
    }

    if !current.agents.is_empty() {
        groups.push(current);
    }

    groups
}
