//! In-memory cache of cleaned model replies.
//!
//! Off by default. When enabled, resubmitting the same claim in one
//! session reuses the reply instead of calling the endpoint again. Only
//! successful replies are stored.

use moka::future::Cache;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use crate::providers::GenerationOptions;

/// Cache key: the prompt plus every option that changes the reply.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    model: String,
    temperature_bits: u32,
    num_ctx: u32,
    prompt_hash: u64,
}

impl CacheKey {
    pub fn new(prompt: &str, options: &GenerationOptions) -> Self {
        let mut hasher = DefaultHasher::new();
        prompt.hash(&mut hasher);

        Self {
            model: options.model.clone(),
            temperature_bits: options.temperature.to_bits(),
            num_ctx: options.num_ctx,
            prompt_hash: hasher.finish(),
        }
    }
}

/// Reply cache using moka.
#[derive(Clone)]
pub struct GenerationCache {
    cache: Cache<CacheKey, String>,
}

impl GenerationCache {
    /// Create a new cache with the given configuration.
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();

        Self { cache }
    }

    /// Get a cached reply.
    pub async fn get(&self, key: &CacheKey) -> Option<String> {
        self.cache.get(key).await
    }

    /// Store a reply.
    pub async fn insert(&self, key: CacheKey, reply: String) {
        self.cache.insert(key, reply).await;
    }

    /// Approximate number of entries.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for GenerationCache {
    fn default() -> Self {
        Self::new(1_000, Duration::from_secs(3600))
    }
}

impl std::fmt::Debug for GenerationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationCache")
            .field("entries", &self.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cache_insert_and_get() {
        let cache = GenerationCache::default();
        let key = CacheKey::new("prompt", &GenerationOptions::default());

        assert!(cache.get(&key).await.is_none());
        cache.insert(key.clone(), "VERDICT: TRUE".to_string()).await;
        assert_eq!(cache.get(&key).await.as_deref(), Some("VERDICT: TRUE"));
    }

    #[test]
    fn test_key_depends_on_model_and_prompt() {
        let options = GenerationOptions::default();
        let base = CacheKey::new("prompt", &options);

        assert_eq!(base, CacheKey::new("prompt", &options));
        assert_ne!(base, CacheKey::new("other prompt", &options));
        assert_ne!(base, CacheKey::new("prompt", &GenerationOptions::new("llama3.1:8b")));
    }
}
