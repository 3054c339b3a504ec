use async_trait::async_trait;
use shortlink_core::cache::{LinkCache, Result};
use shortlink_core::CacheError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Bounds every call on the wrapped cache with a deadline.
///
/// An elapsed deadline surfaces as [`CacheError::Timeout`], which the
/// resolver treats like any other cache failure: a miss.
#[derive(Debug, Clone)]
pub struct TimeoutCache<C> {
    inner: C,
    timeout: Duration,
}

impl<C> TimeoutCache<C> {
    pub fn new(inner: C, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    /// Returns a reference to the wrapped cache.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        key: &str,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(full_short_url = %key, operation, timeout_ms = self.timeout.as_millis() as u64, "Cache call timed out");
                Err(CacheError::Timeout(format!(
                    "{operation} exceeded {:?}",
                    self.timeout
                )))
            }
        }
    }
}

#[async_trait]
impl<C: LinkCache> LinkCache for TimeoutCache<C> {
    async fn get_positive(&self, key: &str) -> Result<Option<String>> {
        self.bounded("get_positive", key, self.inner.get_positive(key))
            .await
    }

    async fn get_negative(&self, key: &str) -> Result<bool> {
        self.bounded("get_negative", key, self.inner.get_negative(key))
            .await
    }

    async fn put_positive(&self, key: &str, url: &str, ttl: Duration) -> Result<()> {
        self.bounded("put_positive", key, self.inner.put_positive(key, url, ttl))
            .await
    }

    async fn put_negative(&self, key: &str, ttl: Duration) -> Result<()> {
        self.bounded("put_negative", key, self.inner.put_negative(key, ttl))
            .await
    }

    async fn invalidate(&self, key: &str) -> Result<()> {
        self.bounded("invalidate", key, self.inner.invalidate(key))
            .await
    }
}
