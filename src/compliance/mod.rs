//! Compliance engine
//!
//! Decides which URLs the crawler may enqueue and when it may fetch them:
//! - ignored file extensions and private hosts are rejected before a URL
//!   enters the frontier ([`ComplianceEngine::admit`])
//! - robots.txt rules and crawl delays are checked right before a fetch
//!   ([`check`])

mod engine;
mod verdict;

pub use engine::{has_ignored_ending, ComplianceEngine};
pub use verdict::{check, RobotsVerdict};
