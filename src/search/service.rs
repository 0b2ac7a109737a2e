//! Participant search orchestrator

use crate::error::Result;
use crate::metrics::{
    SEARCH_DURATION_SECONDS, SEARCH_REQUESTS_TOTAL, SEARCH_SUBQUERY_ERRORS_TOTAL,
    SEARCH_SUBQUERY_TIMEOUTS_TOTAL,
};
use crate::models::Participant;
use crate::search::error::SearchError;
use crate::search::query::{extract_keywords, SearchOptions};
use crate::state::{CategoryStore, ParticipantScope, ParticipantStore};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

const TAG_SCAN_QUERY: &str = "tag_scan";
const CATEGORY_LOOKUP_QUERY: &str = "category_lookup";

/// Output contract of a participant search
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    /// Matched participants in discovery order, at most `limit`
    pub participants: Vec<Participant>,

    /// Category codes whose display name matched the raw term
    pub matching_category_codes: Vec<String>,

    /// Number of participants returned
    pub count: usize,

    /// Names of sub-queries abandoned after their timeout
    pub timed_out_queries: Vec<String>,
}

impl SearchResult {
    /// Result of a search with nothing to search for
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether any sub-query timed out, making the result partial
    pub fn is_degraded(&self) -> bool {
        !self.timed_out_queries.is_empty()
    }
}

/// How keyword sub-queries are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// One sub-query at a time, stopping as soon as the limit is reached
    #[default]
    Sequential,

    /// Up to `max_concurrent` sub-queries in flight, merged in discovery order
    Concurrent { max_concurrent: usize },
}

/// Outcome of one timeout-wrapped sub-query
enum SubQuery<T> {
    Completed(T),
    TimedOut,
    Failed,
}

/// Run a store call under `limit`. The store future is dropped on timeout,
/// which cancels any work it has not finished.
async fn run_subquery<T, F>(name: &str, kind: &str, limit: Duration, query: F) -> SubQuery<T>
where
    F: Future<Output = Result<T>>,
{
    match timeout(limit, query).await {
        Ok(Ok(value)) => SubQuery::Completed(value),
        Ok(Err(e)) => {
            SEARCH_SUBQUERY_ERRORS_TOTAL.with_label_values(&[kind]).inc();
            warn!(subquery = name, error = %e, "Search sub-query failed, skipping");
            SubQuery::Failed
        }
        Err(_) => {
            SEARCH_SUBQUERY_TIMEOUTS_TOTAL.with_label_values(&[kind]).inc();
            warn!(
                subquery = name,
                timeout_ms = limit.as_millis() as u64,
                "Search sub-query timed out"
            );
            SubQuery::TimedOut
        }
    }
}

/// Per-call merge state: dedup by id, cap at limit, timeout ledger
struct Accumulator {
    limit: usize,
    seen: HashSet<Uuid>,
    participants: Vec<Participant>,
    timed_out: Vec<String>,
}

impl Accumulator {
    fn new(limit: usize) -> Self {
        Self {
            limit,
            seen: HashSet::new(),
            participants: Vec::new(),
            timed_out: Vec::new(),
        }
    }

    fn is_full(&self) -> bool {
        self.participants.len() >= self.limit
    }

    /// Unwrap a sub-query outcome, recording timeouts. Failures and timeouts
    /// contribute nothing.
    fn absorb<T: Default>(&mut self, name: String, outcome: SubQuery<T>) -> T {
        match outcome {
            SubQuery::Completed(value) => value,
            SubQuery::TimedOut => {
                self.timed_out.push(name);
                T::default()
            }
            SubQuery::Failed => T::default(),
        }
    }

    /// Append unseen participants until the limit is reached
    fn merge<I>(&mut self, rows: I) -> usize
    where
        I: IntoIterator<Item = Participant>,
    {
        let mut added = 0;
        for participant in rows {
            if self.is_full() {
                break;
            }
            if self.seen.insert(participant.id) {
                self.participants.push(participant);
                added += 1;
            }
        }
        added
    }

    fn finish(mut self, matching_category_codes: Vec<String>) -> SearchResult {
        self.participants.truncate(self.limit);
        SearchResult {
            count: self.participants.len(),
            participants: self.participants,
            matching_category_codes,
            timed_out_queries: self.timed_out,
        }
    }
}

/// Tenant-scoped participant search over a participant and a category store.
///
/// Each keyword is matched against the searchable text fields; when that
/// leaves the result short, a bounded page of tagged participants is scanned
/// in memory. Category matches are appended last. A slow or failing
/// sub-query never fails the search; it only shrinks the result.
pub struct ParticipantSearchService {
    participants: Arc<dyn ParticipantStore>,
    categories: Arc<dyn CategoryStore>,
    mode: SearchMode,
}

impl ParticipantSearchService {
    /// Create a sequential search service
    pub fn new(participants: Arc<dyn ParticipantStore>, categories: Arc<dyn CategoryStore>) -> Self {
        Self {
            participants,
            categories,
            mode: SearchMode::Sequential,
        }
    }

    /// Set the sub-query scheduling mode
    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    /// Search participants of one tenant.
    ///
    /// Fails only when `options` has a blank tenant. Empty or
    /// fully-sanitized terms and a zero limit yield an empty result.
    pub async fn search(&self, options: &SearchOptions) -> std::result::Result<SearchResult, SearchError> {
        if let Err(e) = options.validate() {
            SEARCH_REQUESTS_TOTAL.with_label_values(&["rejected"]).inc();
            return Err(e);
        }

        let term = options.trimmed_term();
        let keywords = extract_keywords(term);
        if keywords.is_empty() || options.limit == 0 {
            debug!(tenant_id = %options.tenant_id, "Nothing to search for, returning no results");
            SEARCH_REQUESTS_TOTAL.with_label_values(&["empty"]).inc();
            return Ok(SearchResult::empty());
        }

        let start = Instant::now();
        let scope = ParticipantScope::new(options.tenant_id.clone(), options.status_filter.clone());
        let mut acc = Accumulator::new(options.limit);

        let category_codes = if options.enable_category_matching {
            let outcome = run_subquery(
                CATEGORY_LOOKUP_QUERY,
                CATEGORY_LOOKUP_QUERY,
                options.query_timeout,
                self.categories.find_codes_by_name(term),
            )
            .await;
            acc.absorb(CATEGORY_LOOKUP_QUERY.to_string(), outcome)
        } else {
            Vec::new()
        };

        match self.mode {
            SearchMode::Sequential => {
                self.keyword_passes_sequential(options, &scope, &keywords, &mut acc)
                    .await
            }
            SearchMode::Concurrent { max_concurrent } => {
                self.keyword_passes_concurrent(options, &scope, &keywords, max_concurrent, &mut acc)
                    .await
            }
        }

        if !category_codes.is_empty() && !acc.is_full() {
            self.category_pass(options, &scope, &category_codes, &mut acc)
                .await;
        }

        let result = acc.finish(category_codes);
        let elapsed = start.elapsed();
        SEARCH_DURATION_SECONDS.observe(elapsed.as_secs_f64());
        SEARCH_REQUESTS_TOTAL
            .with_label_values(&[if result.is_degraded() { "degraded" } else { "ok" }])
            .inc();

        info!(
            tenant_id = %options.tenant_id,
            keywords = keywords.len(),
            count = result.count,
            timed_out = result.timed_out_queries.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Participant search completed"
        );

        Ok(result)
    }

    /// Field match then tag scan per keyword, one sub-query at a time
    async fn keyword_passes_sequential(
        &self,
        options: &SearchOptions,
        scope: &ParticipantScope,
        keywords: &[String],
        acc: &mut Accumulator,
    ) {
        // Fetched on first need and reused for every later keyword
        let mut tagged: Option<Vec<Participant>> = None;

        for keyword in keywords {
            if acc.is_full() {
                break;
            }

            let name = format!("fields:{keyword}");
            let outcome = run_subquery(
                &name,
                "fields",
                options.query_timeout,
                self.participants.find_by_text(scope, keyword, options.limit),
            )
            .await;
            let rows = acc.absorb(name, outcome);
            let added = acc.merge(rows);
            debug!(keyword = %keyword, added, "Field match merged");

            if acc.is_full() {
                break;
            }

            if tagged.is_none() {
                let outcome = run_subquery(
                    TAG_SCAN_QUERY,
                    TAG_SCAN_QUERY,
                    options.query_timeout,
                    self.participants.list_tagged(scope, options.tag_scan_limit),
                )
                .await;
                tagged = Some(acc.absorb(TAG_SCAN_QUERY.to_string(), outcome));
            }

            if let Some(candidates) = &tagged {
                let added = acc.merge(tag_matches(candidates, keyword));
                debug!(keyword = %keyword, added, "Tag scan merged");
            }
        }
    }

    /// Same passes with all sub-queries issued up front through an ordered
    /// bounded stream; merging follows the sequential discovery order.
    ///
    /// Timeouts are listed in the sequential order as well. Since nothing is
    /// skipped, a `tag_scan` timeout is reported even when the first field
    /// match alone would have filled the limit.
    async fn keyword_passes_concurrent(
        &self,
        options: &SearchOptions,
        scope: &ParticipantScope,
        keywords: &[String],
        max_concurrent: usize,
        acc: &mut Accumulator,
    ) {
        let participants = &self.participants;
        let query_timeout = options.query_timeout;
        let limit = options.limit;

        let field_queries = stream::iter(keywords.iter().cloned())
            .map(move |keyword: String| async move {
                let name = format!("fields:{keyword}");
                let outcome = run_subquery(
                    &name,
                    "fields",
                    query_timeout,
                    participants.find_by_text(scope, &keyword, limit),
                )
                .await;
                (name, outcome)
            })
            .buffered(max_concurrent.max(1))
            .collect::<Vec<_>>();

        let tag_query = run_subquery(
            TAG_SCAN_QUERY,
            TAG_SCAN_QUERY,
            query_timeout,
            participants.list_tagged(scope, options.tag_scan_limit),
        );

        let (field_results, tag_outcome) = futures::join!(field_queries, tag_query);

        // Absorbed after the first field outcome so `timed_out_queries` keeps
        // the sequential order
        let mut tag_outcome = Some(tag_outcome);
        let mut tagged = Vec::new();

        for (keyword, (name, outcome)) in keywords.iter().zip(field_results) {
            let rows = acc.absorb(name, outcome);
            acc.merge(rows);

            if let Some(outcome) = tag_outcome.take() {
                tagged = acc.absorb(TAG_SCAN_QUERY.to_string(), outcome);
            }

            if !acc.is_full() {
                acc.merge(tag_matches(&tagged, keyword));
            }
        }
    }

    /// Append participants of matched categories, in code order
    async fn category_pass(
        &self,
        options: &SearchOptions,
        scope: &ParticipantScope,
        category_codes: &[String],
        acc: &mut Accumulator,
    ) {
        for code in category_codes {
            if acc.is_full() {
                break;
            }

            let name = format!("category:{code}");
            let outcome = run_subquery(
                &name,
                "category",
                options.query_timeout,
                self.participants.find_by_category(scope, code, options.limit),
            )
            .await;
            let rows = acc.absorb(name, outcome);
            let added = acc.merge(rows);
            debug!(category_code = %code, added, "Category match merged");
        }
    }
}

/// Candidates with a tag containing `keyword`, case-insensitively
fn tag_matches<'a>(
    candidates: &'a [Participant],
    keyword: &'a str,
) -> impl Iterator<Item = Participant> + 'a {
    candidates
        .iter()
        .filter(move |participant| participant.tag_matches(keyword))
        .cloned()
}
