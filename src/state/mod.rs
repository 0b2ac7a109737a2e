pub mod cache;
pub mod factory;
pub mod sled_store;
pub mod store;

pub use cache::*;
pub use factory::{create_in_memory_stores, create_stores, Stores};
pub use sled_store::SledStore;
pub use store::*;

use crate::error::Result;
use crate::models::{BusinessCategory, Participant, ParticipantStatus};
use async_trait::async_trait;
use std::cmp::Ordering;
use uuid::Uuid;

/// Trait for participant storage operations.
///
/// Every read takes a [`ParticipantScope`]; implementations must apply the
/// tenant equality filter themselves. List operations return records in
/// registration order.
#[async_trait]
pub trait ParticipantStore: Send + Sync {
    /// Save a new participant
    async fn save_participant(&self, participant: &Participant) -> Result<()>;

    /// Get a participant by ID within a tenant
    async fn get_participant(&self, tenant_id: &str, id: &Uuid) -> Result<Option<Participant>>;

    /// Update an existing participant
    async fn update_participant(&self, participant: &Participant) -> Result<()>;

    /// List participants in scope
    async fn list_participants(
        &self,
        scope: &ParticipantScope,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Participant>>;

    /// Count participants in scope
    async fn count_participants(&self, scope: &ParticipantScope) -> Result<u64>;

    /// Participants whose searchable text fields contain `keyword`
    async fn find_by_text(
        &self,
        scope: &ParticipantScope,
        keyword: &str,
        limit: usize,
    ) -> Result<Vec<Participant>>;

    /// Participants that carry a tag list
    async fn list_tagged(&self, scope: &ParticipantScope, limit: usize)
        -> Result<Vec<Participant>>;

    /// Participants in a business category
    async fn find_by_category(
        &self,
        scope: &ParticipantScope,
        category_code: &str,
        limit: usize,
    ) -> Result<Vec<Participant>>;
}

/// Trait for business category lookups
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Insert or replace a category
    async fn save_category(&self, category: &BusinessCategory) -> Result<()>;

    /// All categories ordered by code
    async fn list_categories(&self) -> Result<Vec<BusinessCategory>>;

    /// Codes of categories whose display name contains `term`
    async fn find_codes_by_name(&self, term: &str) -> Result<Vec<String>>;
}

/// Tenant and status scope applied to every participant read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantScope {
    pub tenant_id: String,
    /// Allowed statuses; `None` means any status. An empty list matches
    /// no participant.
    pub statuses: Option<Vec<ParticipantStatus>>,
}

impl ParticipantScope {
    /// Scope restricted to `statuses`
    pub fn new(tenant_id: impl Into<String>, statuses: Vec<ParticipantStatus>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            statuses: Some(statuses),
        }
    }

    /// Scope covering every status of a tenant
    pub fn tenant(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            statuses: None,
        }
    }

    pub fn contains(&self, participant: &Participant) -> bool {
        participant.tenant_id == self.tenant_id
            && self
                .statuses
                .as_ref()
                .map_or(true, |statuses| statuses.contains(&participant.status))
    }
}

/// Registration order used by every store backend
pub(crate) fn registration_order(a: &Participant, b: &Participant) -> Ordering {
    a.created_at
        .cmp(&b.created_at)
        .then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_status_matching() {
        let declined = Participant::new("T1", "Startup Declined", ParticipantStatus::Declined);

        assert!(ParticipantScope::tenant("T1").contains(&declined));
        assert!(ParticipantScope::new("T1", vec![ParticipantStatus::Declined]).contains(&declined));
        assert!(!ParticipantScope::new("T1", ParticipantStatus::visible()).contains(&declined));
        // An empty status list admits nobody
        assert!(!ParticipantScope::new("T1", Vec::new()).contains(&declined));
        assert!(!ParticipantScope::tenant("T10").contains(&declined));
    }
}
