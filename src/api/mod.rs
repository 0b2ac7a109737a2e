pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::directory::DirectoryService;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<DirectoryService>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(directory: Arc<DirectoryService>) -> Self {
        Self {
            directory,
            started_at: Instant::now(),
        }
    }
}
