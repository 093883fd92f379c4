//! Page persistence policy

use crate::config::CrawlerOptions;
use reqwest::header::{HeaderMap, CONTENT_TYPE};

/// Decides which fetched pages are written to the database
#[derive(Debug, Clone, Default)]
pub struct PagePolicy {
    pub check_content_type: bool,
    pub accepted_content_types: Vec<String>,
}

impl PagePolicy {
    pub fn from_options(options: &CrawlerOptions) -> Self {
        Self {
            check_content_type: options.check_content_type,
            accepted_content_types: options.accepted_content_types.clone(),
        }
    }

    /// Returns true if a response with these headers may be stored
    ///
    /// With content-type checking on, the `content-type` header must contain
    /// one of the accepted types as a substring (so `text/html; charset=utf-8`
    /// matches `text/html`). A missing header fails the check.
    pub fn allows(&self, headers: &HeaderMap) -> bool {
        if !self.check_content_type {
            return true;
        }

        let Some(content_type) = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
        else {
            return false;
        };

        self.accepted_content_types
            .iter()
            .any(|accepted| content_type.contains(accepted.as_str()))
    }
}
