use crate::error::{AppError, Result};
use crate::metrics::{PARTICIPANTS_REGISTERED_TOTAL, STATUS_TRANSITIONS_TOTAL};
use crate::models::{BusinessCategory, Participant, ParticipantStatus};
use crate::search::{ParticipantSearchService, SearchConfig, SearchOptions, SearchResult};
use crate::state::{CachedCategoryStore, CategoryStore, ParticipantScope, ParticipantStore, Stores};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use validator::Validate;

/// Registration input for a new participant
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewParticipant {
    #[validate(length(min = 1, max = 255))]
    pub full_name_th: String,
    #[validate(length(max = 255))]
    pub full_name_en: Option<String>,
    #[validate(length(max = 100))]
    pub nickname_th: Option<String>,
    #[validate(length(max = 100))]
    pub nickname_en: Option<String>,
    #[validate(length(max = 255))]
    pub company: Option<String>,
    #[validate(length(max = 255))]
    pub position: Option<String>,
    #[validate(length(max = 500))]
    pub tagline: Option<String>,
    pub notes: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub line_id: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: Option<ParticipantStatus>,
    pub business_type_code: Option<String>,
}

impl NewParticipant {
    fn into_participant(self, tenant_id: &str) -> Participant {
        let mut participant = Participant::new(
            tenant_id,
            self.full_name_th.trim(),
            self.status.unwrap_or(ParticipantStatus::Prospect),
        );

        participant.full_name_en = self.full_name_en;
        participant.nickname_th = self.nickname_th;
        participant.nickname_en = self.nickname_en;
        participant.company = self.company;
        participant.position = self.position;
        participant.tagline = self.tagline;
        participant.notes = self.notes;
        participant.phone = self.phone;
        participant.email = self.email;
        participant.line_id = self.line_id;
        participant.website = self.website;
        participant.business_type_code = self.business_type_code;
        if let Some(tags) = self.tags {
            participant.set_tags(tags);
        }

        participant
    }
}

/// Chapter directory: participant records, categories and search
pub struct DirectoryService {
    participants: Arc<dyn ParticipantStore>,
    categories: Arc<dyn CategoryStore>,
    search: ParticipantSearchService,
    search_config: SearchConfig,
}

impl DirectoryService {
    /// Build the directory over `stores`. Category lookups go through a TTL
    /// cache sized by `search_config`.
    pub fn new(stores: Stores, search_config: SearchConfig) -> Self {
        let categories: Arc<dyn CategoryStore> = Arc::new(CachedCategoryStore::new(
            stores.categories,
            search_config.category_cache_capacity,
            Duration::from_secs(search_config.category_cache_ttl_secs),
        ));

        let search = ParticipantSearchService::new(stores.participants.clone(), categories.clone())
            .with_mode(search_config.mode());

        Self {
            participants: stores.participants,
            categories,
            search,
            search_config,
        }
    }

    /// Get a reference to the participant store
    pub fn participants(&self) -> &Arc<dyn ParticipantStore> {
        &self.participants
    }

    pub fn search_config(&self) -> &SearchConfig {
        &self.search_config
    }

    /// Register a participant in a tenant
    pub async fn register_participant(
        &self,
        tenant_id: &str,
        input: NewParticipant,
    ) -> Result<Participant> {
        if tenant_id.trim().is_empty() {
            return Err(AppError::Validation("tenant_id must not be empty".to_string()));
        }
        input.validate()?;

        if let Some(code) = &input.business_type_code {
            let known = self
                .categories
                .list_categories()
                .await?
                .iter()
                .any(|c| &c.category_code == code);
            if !known {
                return Err(AppError::Validation(format!(
                    "Unknown business category: {}",
                    code
                )));
            }
        }

        let participant = input.into_participant(tenant_id);
        self.participants.save_participant(&participant).await?;

        PARTICIPANTS_REGISTERED_TOTAL
            .with_label_values(&[&participant.status.to_string()])
            .inc();
        tracing::info!(
            tenant_id = %tenant_id,
            participant_id = %participant.id,
            status = %participant.status,
            "Participant registered"
        );

        Ok(participant)
    }

    /// Get a participant by ID
    pub async fn get_participant(&self, tenant_id: &str, id: &Uuid) -> Result<Participant> {
        self.participants
            .get_participant(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Participant {} not found", id)))
    }

    /// List participants with their total count
    pub async fn list_participants(
        &self,
        scope: &ParticipantScope,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<Participant>, u64)> {
        let participants = self
            .participants
            .list_participants(scope, page, page_size)
            .await?;
        let total = self.participants.count_participants(scope).await?;
        Ok((participants, total))
    }

    /// Soft status transition; participants are never deleted
    pub async fn change_status(
        &self,
        tenant_id: &str,
        id: &Uuid,
        new_status: ParticipantStatus,
    ) -> Result<Participant> {
        let mut participant = self.get_participant(tenant_id, id).await?;
        let old_status = participant.status;

        participant.update_status(new_status)?;
        self.participants.update_participant(&participant).await?;

        STATUS_TRANSITIONS_TOTAL
            .with_label_values(&[&old_status.to_string(), &new_status.to_string()])
            .inc();
        tracing::info!(
            tenant_id = %tenant_id,
            participant_id = %id,
            from = %old_status,
            to = %new_status,
            "Participant status changed"
        );

        Ok(participant)
    }

    /// Replace a participant's tag list
    pub async fn update_tags(
        &self,
        tenant_id: &str,
        id: &Uuid,
        tags: Vec<String>,
    ) -> Result<Participant> {
        let mut participant = self.get_participant(tenant_id, id).await?;

        participant.set_tags(tags);
        self.participants.update_participant(&participant).await?;

        tracing::debug!(participant_id = %id, "Participant tags updated");
        Ok(participant)
    }

    /// Insert or replace a business category
    pub async fn register_category(&self, category: BusinessCategory) -> Result<BusinessCategory> {
        category.validate()?;
        self.categories.save_category(&category).await?;

        tracing::info!(category_code = %category.category_code, "Business category saved");
        Ok(category)
    }

    pub async fn list_categories(&self) -> Result<Vec<BusinessCategory>> {
        self.categories.list_categories().await
    }

    /// Search participants; the limit is clamped to the configured maximum
    pub async fn search(&self, mut options: SearchOptions) -> Result<SearchResult> {
        options.limit = self.search_config.clamp_limit(options.limit);
        Ok(self.search.search(&options).await?)
    }
}
