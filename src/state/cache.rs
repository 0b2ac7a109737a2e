use crate::error::Result;
use crate::models::BusinessCategory;
use crate::state::CategoryStore;
use async_trait::async_trait;
use moka::future::Cache;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

/// Generic cache wrapper using Moka
#[derive(Clone)]
pub struct AppCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    cache: Cache<K, V>,
}

impl<K, V> AppCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();

        Self { cache }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        self.cache.get(key).await
    }

    pub async fn insert(&self, key: K, value: V) {
        self.cache.insert(key, value).await;
    }

    pub async fn invalidate(&self, key: &K) {
        self.cache.invalidate(key).await;
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

/// Category store decorator that caches name lookups per lowercased term.
///
/// Any category written through the decorator clears all cached lookups.
#[derive(Clone)]
pub struct CachedCategoryStore {
    inner: Arc<dyn CategoryStore>,
    lookups: AppCache<String, Vec<String>>,
}

impl CachedCategoryStore {
    pub fn new(inner: Arc<dyn CategoryStore>, max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner,
            lookups: AppCache::new(max_capacity, ttl),
        }
    }
}

#[async_trait]
impl CategoryStore for CachedCategoryStore {
    async fn save_category(&self, category: &BusinessCategory) -> Result<()> {
        self.inner.save_category(category).await?;
        self.lookups.invalidate_all();
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<BusinessCategory>> {
        self.inner.list_categories().await
    }

    async fn find_codes_by_name(&self, term: &str) -> Result<Vec<String>> {
        let key = term.to_lowercase();

        if let Some(codes) = self.lookups.get(&key).await {
            tracing::trace!(term = %term, "Category lookup served from cache");
            return Ok(codes);
        }

        let codes = self.inner.find_codes_by_name(term).await?;
        self.lookups.insert(key, codes.clone()).await;
        Ok(codes)
    }
}
