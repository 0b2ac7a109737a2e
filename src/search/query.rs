//! Search options and keyword extraction

use crate::models::ParticipantStatus;
use crate::search::error::SearchError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Characters with meaning to pattern-match operators or filter syntax
const PATTERN_SPECIAL_CHARS: &[char] = &['%', '_', '\'', '"', ';', '\\', ',', '(', ')'];

/// Input contract of a participant search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Tenant whose participants are searched (required)
    pub tenant_id: String,

    /// Raw free-text query
    pub search_term: String,

    /// Maximum participants returned
    pub limit: usize,

    /// Allowed participant statuses
    pub status_filter: Vec<ParticipantStatus>,

    /// Union in participants from categories whose name matches the raw term
    pub enable_category_matching: bool,

    /// Maximum candidate rows fetched for the in-memory tag scan
    pub tag_scan_limit: usize,

    /// Per sub-query timeout
    pub query_timeout: Duration,
}

impl SearchOptions {
    /// Create options with default limits and the visible status filter
    pub fn new(tenant_id: impl Into<String>, search_term: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            search_term: search_term.into(),
            limit: 10,
            status_filter: ParticipantStatus::visible(),
            enable_category_matching: false,
            tag_scan_limit: 100,
            query_timeout: Duration::from_millis(5000),
        }
    }

    /// Set limit
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Filter by status
    pub fn with_status_filter(mut self, statuses: Vec<ParticipantStatus>) -> Self {
        self.status_filter = statuses;
        self
    }

    /// Enable/disable category matching
    pub fn with_category_matching(mut self, enabled: bool) -> Self {
        self.enable_category_matching = enabled;
        self
    }

    /// Set tag scan page size
    pub fn with_tag_scan_limit(mut self, limit: usize) -> Self {
        self.tag_scan_limit = limit;
        self
    }

    /// Set per sub-query timeout
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Check the call contract
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.tenant_id.trim().is_empty() {
            return Err(SearchError::InvalidOptions(
                "tenant_id must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// The trimmed search term
    pub fn trimmed_term(&self) -> &str {
        self.search_term.trim()
    }
}

/// Strip characters that are special to the store's pattern operator
pub fn sanitize_keyword(raw: &str) -> String {
    raw.chars()
        .filter(|c| !PATTERN_SPECIAL_CHARS.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Split a raw search term into sanitized, non-empty keywords in typed order
pub fn extract_keywords(term: &str) -> Vec<String> {
    term.split_whitespace()
        .map(sanitize_keyword)
        .filter(|keyword| !keyword.is_empty())
        .collect()
}
