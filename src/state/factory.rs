use crate::config::{StateBackend, StateConfig};
use crate::error::{AppError, Result};
use crate::state::{CategoryStore, InMemoryStore, ParticipantStore, SledStore};
use std::sync::Arc;

/// Participant and category stores backed by the same backend
#[derive(Clone)]
pub struct Stores {
    pub participants: Arc<dyn ParticipantStore>,
    pub categories: Arc<dyn CategoryStore>,
}

/// Create the directory stores based on configuration
pub async fn create_stores(config: &StateConfig) -> Result<Stores> {
    match config.backend {
        StateBackend::Sled => {
            let path = config.path.as_ref().ok_or_else(|| {
                AppError::Configuration("Sled backend requires 'path' configuration".to_string())
            })?;

            tracing::info!(path = ?path, "Initializing Sled storage backend");

            let store = Arc::new(SledStore::new(path)?);
            Ok(Stores {
                participants: store.clone(),
                categories: store,
            })
        }

        StateBackend::InMemory => Ok(create_in_memory_stores()),
    }
}

/// Create in-memory stores (for testing and development)
pub fn create_in_memory_stores() -> Stores {
    tracing::info!("Initializing in-memory storage backend");
    let store = Arc::new(InMemoryStore::new());
    Stores {
        participants: store.clone(),
        categories: store,
    }
}
