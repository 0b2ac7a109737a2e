use crate::error::{AppError, Result};
use crate::models::{BusinessCategory, Participant};
use crate::state::{registration_order, CategoryStore, ParticipantScope, ParticipantStore};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// In-memory directory store (for development and testing)
#[derive(Clone)]
pub struct InMemoryStore {
    participants: Arc<DashMap<Uuid, Participant>>,
    categories: Arc<DashMap<String, BusinessCategory>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            participants: Arc::new(DashMap::new()),
            categories: Arc::new(DashMap::new()),
        }
    }

    /// Collect matching participants in registration order, capped at `limit`
    fn collect<F>(&self, scope: &ParticipantScope, limit: usize, predicate: F) -> Vec<Participant>
    where
        F: Fn(&Participant) -> bool,
    {
        let mut matched: Vec<Participant> = self
            .participants
            .iter()
            .filter(|entry| scope.contains(entry.value()) && predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();

        matched.sort_by(registration_order);
        matched.truncate(limit);
        matched
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ParticipantStore for InMemoryStore {
    async fn save_participant(&self, participant: &Participant) -> Result<()> {
        if self.participants.contains_key(&participant.id) {
            return Err(AppError::Conflict(format!(
                "Participant {} already exists",
                participant.id
            )));
        }

        self.participants.insert(participant.id, participant.clone());
        tracing::debug!(
            participant_id = %participant.id,
            tenant_id = %participant.tenant_id,
            "Participant saved"
        );
        Ok(())
    }

    async fn get_participant(&self, tenant_id: &str, id: &Uuid) -> Result<Option<Participant>> {
        Ok(self
            .participants
            .get(id)
            .filter(|entry| entry.tenant_id == tenant_id)
            .map(|entry| entry.clone()))
    }

    async fn update_participant(&self, participant: &Participant) -> Result<()> {
        match self.participants.get_mut(&participant.id) {
            Some(mut entry) if entry.tenant_id == participant.tenant_id => {
                *entry = participant.clone();
                tracing::debug!(participant_id = %participant.id, "Participant updated");
                Ok(())
            }
            _ => Err(AppError::NotFound(format!(
                "Participant {} not found",
                participant.id
            ))),
        }
    }

    async fn list_participants(
        &self,
        scope: &ParticipantScope,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Participant>> {
        let start = (page as usize) * (page_size as usize);

        Ok(self
            .collect(scope, usize::MAX, |_| true)
            .into_iter()
            .skip(start)
            .take(page_size as usize)
            .collect())
    }

    async fn count_participants(&self, scope: &ParticipantScope) -> Result<u64> {
        let count = self
            .participants
            .iter()
            .filter(|entry| scope.contains(entry.value()))
            .count();

        Ok(count as u64)
    }

    async fn find_by_text(
        &self,
        scope: &ParticipantScope,
        keyword: &str,
        limit: usize,
    ) -> Result<Vec<Participant>> {
        Ok(self.collect(scope, limit, |p| p.matches_keyword(keyword)))
    }

    async fn list_tagged(
        &self,
        scope: &ParticipantScope,
        limit: usize,
    ) -> Result<Vec<Participant>> {
        Ok(self.collect(scope, limit, Participant::has_tags))
    }

    async fn find_by_category(
        &self,
        scope: &ParticipantScope,
        category_code: &str,
        limit: usize,
    ) -> Result<Vec<Participant>> {
        Ok(self.collect(scope, limit, |p| {
            p.business_type_code.as_deref() == Some(category_code)
        }))
    }
}

#[async_trait]
impl CategoryStore for InMemoryStore {
    async fn save_category(&self, category: &BusinessCategory) -> Result<()> {
        self.categories
            .insert(category.category_code.clone(), category.clone());
        tracing::debug!(category_code = %category.category_code, "Category saved");
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<BusinessCategory>> {
        let mut categories: Vec<BusinessCategory> = self
            .categories
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        categories.sort_by(|a, b| a.category_code.cmp(&b.category_code));
        Ok(categories)
    }

    async fn find_codes_by_name(&self, term: &str) -> Result<Vec<String>> {
        let mut codes: Vec<String> = self
            .categories
            .iter()
            .filter(|entry| entry.value().matches_name(term))
            .map(|entry| entry.key().clone())
            .collect();
        codes.sort();
        Ok(codes)
    }
}
