//! Tenant-scoped participant search
//!
//! A free-text term is split into keywords and resolved through a short,
//! fixed pipeline of store sub-queries:
//!
//! ```text
//! term ──► keywords (sanitized, in typed order)
//!            │
//!            ├─► [category_lookup]        name match on the raw term (optional)
//!            │
//!            ├─► per keyword:
//!            │     [fields:<kw>]          names, nickname, phone, company, tagline, notes
//!            │     [tag_scan]             bounded page of tagged participants,
//!            │                            matched in memory
//!            │
//!            └─► [category:<code>]        participants of matched categories
//!
//!          merge by id in discovery order ──► truncate to limit
//! ```
//!
//! Every sub-query runs under its own timeout. A timed-out sub-query is
//! cancelled and named in `SearchResult::timed_out_queries`; a failed one is
//! logged. Neither fails the search.
//!
//! # Example
//!
//! ```no_run
//! use chapter_directory::search::{ParticipantSearchService, SearchOptions};
//! use chapter_directory::state::create_in_memory_stores;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let stores = create_in_memory_stores();
//!     let search = ParticipantSearchService::new(stores.participants, stores.categories);
//!
//!     let options = SearchOptions::new("chapter-bkk", "startup coffee").with_limit(20);
//!     let result = search.search(&options).await?;
//!     println!("Found {} participants", result.count);
//!
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod query;
mod service;

pub use config::{SearchConfig, SearchConfigBuilder};
pub use error::SearchError;
pub use query::{extract_keywords, sanitize_keyword, SearchOptions};
pub use service::{ParticipantSearchService, SearchMode, SearchResult};
