use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use shortlink_core::cache::{LinkCache, Result};
use std::time::{Duration, Instant};
use tracing::{debug, trace};
use typed_builder::TypedBuilder;

const DEFAULT_MAX_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
enum CachedTarget {
    Positive(String),
    Negative,
}

/// A cached value together with the TTL it was written with.
#[derive(Debug, Clone)]
struct Expiring {
    target: CachedTarget,
    ttl: Duration,
}

/// Expires each entry after the TTL it carries, restarting on overwrite.
struct PerEntryTtl;

impl Expiry<String, Expiring> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Expiring,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Expiring,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// An in-memory cache implementation using Moka.
///
/// Positive and negative entries share one key per full short URL and are
/// told apart by a discriminated value, so writing one form replaces the
/// other and `invalidate` always removes whichever is present. Suitable for
/// single-node deployments; several nodes need a shared cache such as
/// [`RedisLinkCache`](crate::RedisLinkCache) so that invalidation reaches
/// every reader.
#[derive(Debug, Clone)]
pub struct MokaLinkCache {
    cache: Cache<String, Expiring>,
}

impl MokaLinkCache {
    /// Creates a new Moka cache with a maximum capacity of 10,000 entries.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_CAPACITY)
    }

    /// Creates a new Moka cache with a custom maximum capacity.
    pub fn with_capacity(max_capacity: u64) -> Self {
        MokaCacheConfig::builder()
            .max_capacity(max_capacity)
            .build()
            .into()
    }

    /// Returns a builder for creating a custom cache configuration.
    pub fn builder() -> MokaCacheConfigBuilder {
        MokaCacheConfig::builder()
    }

    async fn target(&self, key: &str) -> Option<CachedTarget> {
        self.cache.get(key).await.map(|entry| entry.target)
    }

    async fn put(&self, key: &str, target: CachedTarget, ttl: Duration) {
        self.cache
            .insert(key.to_string(), Expiring { target, ttl })
            .await;
    }
}

impl Default for MokaLinkCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LinkCache for MokaLinkCache {
    async fn get_positive(&self, key: &str) -> Result<Option<String>> {
        match self.target(key).await {
            Some(CachedTarget::Positive(url)) => {
                debug!(full_short_url = %key, "Positive cache hit in Moka");
                Ok(Some(url))
            }
            _ => {
                trace!(full_short_url = %key, "No positive entry in Moka");
                Ok(None)
            }
        }
    }

    async fn get_negative(&self, key: &str) -> Result<bool> {
        let hit = matches!(self.target(key).await, Some(CachedTarget::Negative));
        if hit {
            debug!(full_short_url = %key, "Negative cache hit in Moka");
        }
        Ok(hit)
    }

    async fn put_positive(&self, key: &str, url: &str, ttl: Duration) -> Result<()> {
        self.put(key, CachedTarget::Positive(url.to_string()), ttl)
            .await;
        debug!(full_short_url = %key, ttl_ms = ttl.as_millis() as u64, "Cached target in Moka");
        Ok(())
    }

    async fn put_negative(&self, key: &str, ttl: Duration) -> Result<()> {
        self.put(key, CachedTarget::Negative, ttl).await;
        debug!(full_short_url = %key, ttl_ms = ttl.as_millis() as u64, "Cached negative marker in Moka");
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<()> {
        self.cache.invalidate(key).await;
        debug!(full_short_url = %key, "Invalidated Moka entry (if present)");
        Ok(())
    }
}

/// Configuration for creating a [`MokaLinkCache`] with custom settings.
#[derive(Debug, TypedBuilder, Default)]
pub struct MokaCacheConfig {
    /// Maximum number of entries the cache can hold.
    #[builder(default, setter(strip_option))]
    max_capacity: Option<u64>,
}

impl From<MokaCacheConfig> for MokaLinkCache {
    fn from(config: MokaCacheConfig) -> Self {
        let mut builder = Cache::builder().expire_after(PerEntryTtl);

        if let Some(capacity) = config.max_capacity {
            builder = builder.max_capacity(capacity);
        }

        MokaLinkCache {
            cache: builder.build(),
        }
    }
}
