//! Prometheus metrics for the chapter directory.
//!
//! Covers search traffic, sub-query degradation (timeouts and store errors),
//! participant registrations and status transitions.
//!
//! # Example
//! ```no_run
//! use chapter_directory::metrics::{init_metrics, gather_metrics, SEARCH_REQUESTS_TOTAL};
//!
//! init_metrics().ok();
//! SEARCH_REQUESTS_TOTAL.with_label_values(&["ok"]).inc();
//! println!("{}", gather_metrics());
//! ```

use lazy_static::lazy_static;
use prometheus::{CounterVec, Histogram, HistogramOpts, Opts, Registry};

const NAMESPACE: &str = "chapter_directory";

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    /// Participant searches by outcome
    ///
    /// Labels: outcome (ok, empty, degraded, rejected)
    pub static ref SEARCH_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("search_requests_total", "Total number of participant searches")
            .namespace(NAMESPACE),
        &["outcome"]
    ).expect("Failed to create SEARCH_REQUESTS_TOTAL metric");

    /// End-to-end participant search duration in seconds
    pub static ref SEARCH_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "search_duration_seconds",
            "Participant search duration in seconds"
        )
        .namespace(NAMESPACE)
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0])
    ).expect("Failed to create SEARCH_DURATION_SECONDS metric");

    /// Search sub-queries abandoned after their timeout
    ///
    /// Labels: kind (fields, tag_scan, category_lookup, category)
    pub static ref SEARCH_SUBQUERY_TIMEOUTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("search_subquery_timeouts_total", "Search sub-queries that timed out")
            .namespace(NAMESPACE),
        &["kind"]
    ).expect("Failed to create SEARCH_SUBQUERY_TIMEOUTS_TOTAL metric");

    /// Search sub-queries that failed in the store
    ///
    /// Labels: kind (fields, tag_scan, category_lookup, category)
    pub static ref SEARCH_SUBQUERY_ERRORS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("search_subquery_errors_total", "Search sub-queries that failed")
            .namespace(NAMESPACE),
        &["kind"]
    ).expect("Failed to create SEARCH_SUBQUERY_ERRORS_TOTAL metric");

    /// Registered participants
    ///
    /// Labels: status
    pub static ref PARTICIPANTS_REGISTERED_TOTAL: CounterVec = CounterVec::new(
        Opts::new("participants_registered_total", "Total number of registered participants")
            .namespace(NAMESPACE),
        &["status"]
    ).expect("Failed to create PARTICIPANTS_REGISTERED_TOTAL metric");

    /// Participant status transitions
    ///
    /// Labels: from, to
    pub static ref STATUS_TRANSITIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("status_transitions_total", "Total number of participant status transitions")
            .namespace(NAMESPACE),
        &["from", "to"]
    ).expect("Failed to create STATUS_TRANSITIONS_TOTAL metric");
}

/// Register all metrics with the global registry.
///
/// Must be called once at startup; a second call fails with
/// `AlreadyReg`.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    PROMETHEUS_REGISTRY.register(Box::new(SEARCH_REQUESTS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(SEARCH_DURATION_SECONDS.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(SEARCH_SUBQUERY_TIMEOUTS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(SEARCH_SUBQUERY_ERRORS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(PARTICIPANTS_REGISTERED_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(STATUS_TRANSITIONS_TOTAL.clone()))?;

    tracing::info!("Prometheus metrics registered");
    Ok(())
}

/// Export metrics in Prometheus text format
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}
