//! Search configuration

use crate::search::query::SearchOptions;
use crate::search::service::SearchMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Participant search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Result limit used when a request does not specify one
    pub default_limit: usize,

    /// Upper bound applied to requested limits
    pub max_limit: usize,

    /// Maximum candidate rows fetched for the in-memory tag scan
    pub tag_scan_limit: usize,

    /// Per sub-query timeout in milliseconds
    pub query_timeout_ms: u64,

    /// Union in participants from categories whose name matches the term
    pub enable_category_matching: bool,

    /// Issue keyword sub-queries concurrently instead of one at a time
    pub concurrent_subqueries: bool,

    /// Concurrency bound when `concurrent_subqueries` is set
    pub max_concurrent_subqueries: usize,

    /// TTL of cached category name lookups in seconds
    pub category_cache_ttl_secs: u64,

    /// Maximum cached category name lookups
    pub category_cache_capacity: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
            tag_scan_limit: 100,
            query_timeout_ms: 5000,
            enable_category_matching: false,
            concurrent_subqueries: false,
            max_concurrent_subqueries: 4,
            category_cache_ttl_secs: 300,
            category_cache_capacity: 1000,
        }
    }
}

impl SearchConfig {
    /// Build search options for a request, carrying the configured defaults
    pub fn options_for(&self, tenant_id: impl Into<String>, search_term: impl Into<String>) -> SearchOptions {
        SearchOptions::new(tenant_id, search_term)
            .with_limit(self.default_limit)
            .with_tag_scan_limit(self.tag_scan_limit)
            .with_query_timeout(self.query_timeout())
            .with_category_matching(self.enable_category_matching)
    }

    /// Clamp a requested limit to `1..=max_limit`
    pub fn clamp_limit(&self, requested: usize) -> usize {
        requested.clamp(1, self.max_limit.max(1))
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn mode(&self) -> SearchMode {
        if self.concurrent_subqueries && self.max_concurrent_subqueries > 1 {
            SearchMode::Concurrent {
                max_concurrent: self.max_concurrent_subqueries,
            }
        } else {
            SearchMode::Sequential
        }
    }
}

/// Builder for SearchConfig
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SearchConfig::default(),
        }
    }

    pub fn default_limit(mut self, limit: usize) -> Self {
        self.config.default_limit = limit;
        self
    }

    pub fn max_limit(mut self, limit: usize) -> Self {
        self.config.max_limit = limit;
        self
    }

    pub fn tag_scan_limit(mut self, limit: usize) -> Self {
        self.config.tag_scan_limit = limit;
        self
    }

    pub fn query_timeout_ms(mut self, ms: u64) -> Self {
        self.config.query_timeout_ms = ms;
        self
    }

    pub fn enable_category_matching(mut self, enabled: bool) -> Self {
        self.config.enable_category_matching = enabled;
        self
    }

    pub fn concurrent_subqueries(mut self, max_concurrent: usize) -> Self {
        self.config.concurrent_subqueries = true;
        self.config.max_concurrent_subqueries = max_concurrent;
        self
    }

    pub fn category_cache(mut self, capacity: u64, ttl_secs: u64) -> Self {
        self.config.category_cache_capacity = capacity;
        self.config.category_cache_ttl_secs = ttl_secs;
        self
    }

    pub fn build(self) -> SearchConfig {
        self.config
    }
}

impl Default for SearchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
