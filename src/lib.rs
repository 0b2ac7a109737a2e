//! Chapter participant directory
//!
//! Multi-tenant directory of business-networking chapter participants with a
//! tenant-scoped keyword search that degrades to partial results instead of
//! failing when a backing store is slow or unavailable.

pub mod api;
pub mod config;
pub mod directory;
pub mod error;
pub mod metrics;
pub mod models;
pub mod search;
pub mod state;

pub use error::{AppError, Result};
