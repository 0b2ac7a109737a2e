//! Chapter participant directory
//!
//! Registration, soft status workflow, tags, business categories and the
//! tenant-scoped search, on top of the configured stores.

pub mod service;

pub use service::{DirectoryService, NewParticipant};
