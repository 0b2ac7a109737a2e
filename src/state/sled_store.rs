use crate::error::{AppError, Result};
use crate::models::{BusinessCategory, Participant};
use crate::state::{registration_order, CategoryStore, ParticipantScope, ParticipantStore};
use async_trait::async_trait;
use sled::Db;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Persistent directory store using Sled embedded database.
///
/// Participant keys are `tenant_id \0 participant_id`, so every tenant-scoped
/// read is a prefix scan that cannot reach another tenant's records.
#[derive(Clone)]
pub struct SledStore {
    db: Arc<Db>,
    participants_tree: sled::Tree,
    categories_tree: sled::Tree,
}

impl SledStore {
    /// Create a new Sled store at the specified path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref();
        let db = sled::open(&path).map_err(|e| {
            AppError::Database(format!("Failed to open Sled database: {}", e))
        })?;

        let participants_tree = db.open_tree("participants").map_err(|e| {
            AppError::Database(format!("Failed to open participants tree: {}", e))
        })?;

        let categories_tree = db.open_tree("categories").map_err(|e| {
            AppError::Database(format!("Failed to open categories tree: {}", e))
        })?;

        tracing::info!("Initialized Sled store at {:?}", path_str);

        Ok(Self {
            db: Arc::new(db),
            participants_tree,
            categories_tree,
        })
    }

    fn tenant_prefix(tenant_id: &str) -> Vec<u8> {
        let mut prefix = Vec::with_capacity(tenant_id.len() + 1);
        prefix.extend_from_slice(tenant_id.as_bytes());
        prefix.push(0);
        prefix
    }

    fn participant_key(tenant_id: &str, id: &Uuid) -> Vec<u8> {
        let mut key = Self::tenant_prefix(tenant_id);
        key.extend_from_slice(id.as_bytes());
        key
    }

    /// Scan one tenant's participants, keeping those in scope that satisfy
    /// `predicate`, in registration order, capped at `limit`
    fn scan<F>(&self, scope: &ParticipantScope, limit: usize, predicate: F) -> Result<Vec<Participant>>
    where
        F: Fn(&Participant) -> bool,
    {
        let mut matched = Vec::new();

        for item in self.participants_tree.scan_prefix(Self::tenant_prefix(&scope.tenant_id)) {
            let (_, bytes) = item.map_err(|e| {
                AppError::Database(format!("Failed to scan participants: {}", e))
            })?;
            let participant: Participant = bincode::deserialize(&bytes)?;

            if scope.contains(&participant) && predicate(&participant) {
                matched.push(participant);
            }
        }

        matched.sort_by(registration_order);
        matched.truncate(limit);
        Ok(matched)
    }

    /// Flush pending writes to disk
    pub async fn flush(&self) -> Result<()> {
        self.db.flush_async().await.map_err(|e| {
            AppError::Database(format!("Failed to flush database: {}", e))
        })?;
        Ok(())
    }

    /// Get database size in bytes
    pub fn size_on_disk(&self) -> Result<u64> {
        self.db.size_on_disk().map_err(|e| {
            AppError::Database(format!("Failed to get database size: {}", e))
        })
    }
}

#[async_trait]
impl ParticipantStore for SledStore {
    async fn save_participant(&self, participant: &Participant) -> Result<()> {
        let key = Self::participant_key(&participant.tenant_id, &participant.id);
        let value = bincode::serialize(participant)?;

        self.participants_tree
            .compare_and_swap(&key, None as Option<&[u8]>, Some(value))?
            .map_err(|_| {
                AppError::Conflict(format!("Participant {} already exists", participant.id))
            })?;

        self.participants_tree.flush()?;

        tracing::debug!(
            participant_id = %participant.id,
            tenant_id = %participant.tenant_id,
            "Participant saved to Sled"
        );
        Ok(())
    }

    async fn get_participant(&self, tenant_id: &str, id: &Uuid) -> Result<Option<Participant>> {
        let key = Self::participant_key(tenant_id, id);

        match self.participants_tree.get(&key)? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn update_participant(&self, participant: &Participant) -> Result<()> {
        let key = Self::participant_key(&participant.tenant_id, &participant.id);

        if !self.participants_tree.contains_key(&key)? {
            return Err(AppError::NotFound(format!(
                "Participant {} not found",
                participant.id
            )));
        }

        let value = bincode::serialize(participant)?;
        self.participants_tree.insert(&key, value)?;
        self.participants_tree.flush()?;

        tracing::debug!(participant_id = %participant.id, "Participant updated in Sled");
        Ok(())
    }

    async fn list_participants(
        &self,
        scope: &ParticipantScope,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Participant>> {
        let start = (page as usize) * (page_size as usize);

        Ok(self
            .scan(scope, usize::MAX, |_| true)?
            .into_iter()
            .skip(start)
            .take(page_size as usize)
            .collect())
    }

    async fn count_participants(&self, scope: &ParticipantScope) -> Result<u64> {
        Ok(self.scan(scope, usize::MAX, |_| true)?.len() as u64)
    }

    async fn find_by_text(
        &self,
        scope: &ParticipantScope,
        keyword: &str,
        limit: usize,
    ) -> Result<Vec<Participant>> {
        self.scan(scope, limit, |p| p.matches_keyword(keyword))
    }

    async fn list_tagged(
        &self,
        scope: &ParticipantScope,
        limit: usize,
    ) -> Result<Vec<Participant>> {
        self.scan(scope, limit, Participant::has_tags)
    }

    async fn find_by_category(
        &self,
        scope: &ParticipantScope,
        category_code: &str,
        limit: usize,
    ) -> Result<Vec<Participant>> {
        self.scan(scope, limit, |p| {
            p.business_type_code.as_deref() == Some(category_code)
        })
    }
}

#[async_trait]
impl CategoryStore for SledStore {
    async fn save_category(&self, category: &BusinessCategory) -> Result<()> {
        let value = bincode::serialize(category)?;
        self.categories_tree
            .insert(category.category_code.as_bytes(), value)?;
        self.categories_tree.flush()?;

        tracing::debug!(category_code = %category.category_code, "Category saved to Sled");
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<BusinessCategory>> {
        // Sled iterates in key order, which is category code order
        self.categories_tree
            .iter()
            .map(|item| -> Result<BusinessCategory> {
                let (_, bytes) = item?;
                Ok(bincode::deserialize(&bytes)?)
            })
            .collect()
    }

    async fn find_codes_by_name(&self, term: &str) -> Result<Vec<String>> {
        Ok(self
            .list_categories()
            .await?
            .into_iter()
            .filter(|category| category.matches_name(term))
            .map(|category| category.category_code)
            .collect())
    }
}
