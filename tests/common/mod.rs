//! Shared fixtures for integration tests
//!
//! `FaultyStore` wraps the in-memory store and can make individual
//! participant queries hang or fail, which is how the search degradation
//! paths are exercised.

#![allow(dead_code)]

use async_trait::async_trait;
use chapter_directory::error::{AppError, Result};
use chapter_directory::models::{Participant, ParticipantStatus};
use chapter_directory::state::{InMemoryStore, ParticipantScope, ParticipantStore};
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use std::time::Duration;
use uuid::Uuid;

/// Behaviour injected into one kind of store query
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fault {
    None,
    Hang(Duration),
    Fail,
}

impl Fault {
    async fn apply(self, query: &str) -> Result<()> {
        match self {
            Fault::None => Ok(()),
            Fault::Hang(delay) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
            Fault::Fail => Err(AppError::Database(format!("{} unavailable", query))),
        }
    }
}

/// Participant store with per-query fault injection
pub struct FaultyStore {
    inner: InMemoryStore,
    pub text: Fault,
    pub tagged: Fault,
    pub category: Fault,
}

impl FaultyStore {
    pub fn new(inner: InMemoryStore) -> Self {
        Self {
            inner,
            text: Fault::None,
            tagged: Fault::None,
            category: Fault::None,
        }
    }

    pub fn with_text(mut self, fault: Fault) -> Self {
        self.text = fault;
        self
    }

    pub fn with_tagged(mut self, fault: Fault) -> Self {
        self.tagged = fault;
        self
    }

    pub fn with_category(mut self, fault: Fault) -> Self {
        self.category = fault;
        self
    }
}

#[async_trait]
impl ParticipantStore for FaultyStore {
    async fn save_participant(&self, participant: &Participant) -> Result<()> {
        self.inner.save_participant(participant).await
    }

    async fn get_participant(&self, tenant_id: &str, id: &Uuid) -> Result<Option<Participant>> {
        self.inner.get_participant(tenant_id, id).await
    }

    async fn update_participant(&self, participant: &Participant) -> Result<()> {
        self.inner.update_participant(participant).await
    }

    async fn list_participants(
        &self,
        scope: &ParticipantScope,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Participant>> {
        self.inner.list_participants(scope, page, page_size).await
    }

    async fn count_participants(&self, scope: &ParticipantScope) -> Result<u64> {
        self.inner.count_participants(scope).await
    }

    async fn find_by_text(
        &self,
        scope: &ParticipantScope,
        keyword: &str,
        limit: usize,
    ) -> Result<Vec<Participant>> {
        self.text.apply("find_by_text").await?;
        self.inner.find_by_text(scope, keyword, limit).await
    }

    async fn list_tagged(&self, scope: &ParticipantScope, limit: usize) -> Result<Vec<Participant>> {
        self.tagged.apply("list_tagged").await?;
        self.inner.list_tagged(scope, limit).await
    }

    async fn find_by_category(
        &self,
        scope: &ParticipantScope,
        category_code: &str,
        limit: usize,
    ) -> Result<Vec<Participant>> {
        self.category.apply("find_by_category").await?;
        self.inner.find_by_category(scope, category_code, limit).await
    }
}

/// Participant registered `seq` seconds after a fixed epoch, so that store
/// order is deterministic
pub fn participant(tenant_id: &str, full_name_th: &str, seq: i64) -> Participant {
    let mut p = Participant::new(tenant_id, full_name_th, ParticipantStatus::Member);
    let epoch = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    p.created_at = epoch + ChronoDuration::seconds(seq);
    p.updated_at = p.created_at;
    p
}

pub fn tagged(tenant_id: &str, full_name_th: &str, tags: &[&str], seq: i64) -> Participant {
    let mut p = participant(tenant_id, full_name_th, seq);
    p.tags = Some(tags.iter().map(|t| t.to_string()).collect());
    p
}

/// Save all participants into a fresh in-memory store
pub async fn seeded_store(participants: &[Participant]) -> InMemoryStore {
    let store = InMemoryStore::new();
    for p in participants {
        store.save_participant(p).await.unwrap();
    }
    store
}

pub fn ids(participants: &[Participant]) -> Vec<Uuid> {
    participants.iter().map(|p| p.id).collect()
}
