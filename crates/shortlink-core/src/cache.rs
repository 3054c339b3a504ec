use crate::error::CacheError;
use async_trait::async_trait;
use std::time::Duration;

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

/// What the cache currently knows about a full short URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEntry {
    /// The link resolves to this origin URL.
    Positive(String),
    /// The link is known to be absent, recycled or deleted.
    Negative,
    /// The cache holds nothing for this key.
    Absent,
}

/// A resolution cache keyed by full short URL.
///
/// Positive entries carry the redirect target; negative entries record that
/// the store was recently asked and had nothing resolvable. Both forms live
/// under the same logical key and carry their own TTL. Entries are an
/// expendable projection of the link store.
#[async_trait]
pub trait LinkCache: Send + Sync + 'static {
    /// Get the cached redirect target.
    ///
    /// Returns `Ok(None)` if no positive entry exists.
    async fn get_positive(&self, key: &str) -> Result<Option<String>>;

    /// Whether a negative marker is present.
    async fn get_negative(&self, key: &str) -> Result<bool>;

    /// Store a redirect target for `ttl`.
    async fn put_positive(&self, key: &str, url: &str, ttl: Duration) -> Result<()>;

    /// Store a negative marker for `ttl`.
    async fn put_negative(&self, key: &str, ttl: Duration) -> Result<()>;

    /// Remove both the positive and the negative form of `key`.
    ///
    /// It is not an error if neither exists.
    async fn invalidate(&self, key: &str) -> Result<()>;

    /// Look up both forms, positive first.
    async fn lookup(&self, key: &str) -> Result<CacheEntry> {
        if let Some(url) = self.get_positive(key).await? {
            return Ok(CacheEntry::Positive(url));
        }
        if self.get_negative(key).await? {
            return Ok(CacheEntry::Negative);
        }
        Ok(CacheEntry::Absent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct TestCache {
        positive: Mutex<HashMap<String, String>>,
        negative: Mutex<HashSet<String>>,
    }

    #[async_trait]
    impl LinkCache for TestCache {
        async fn get_positive(&self, key: &str) -> Result<Option<String>> {
            Ok(self.positive.lock().await.get(key).cloned())
        }

        async fn get_negative(&self, key: &str) -> Result<bool> {
            Ok(self.negative.lock().await.contains(key))
        }

        async fn put_positive(&self, key: &str, url: &str, _ttl: Duration) -> Result<()> {
            self.positive
                .lock()
                .await
                .insert(key.to_string(), url.to_string());
            Ok(())
        }

        async fn put_negative(&self, key: &str, _ttl: Duration) -> Result<()> {
            self.negative.lock().await.insert(key.to_string());
            Ok(())
        }

        async fn invalidate(&self, key: &str) -> Result<()> {
            self.positive.lock().await.remove(key);
            self.negative.lock().await.remove(key);
            Ok(())
        }
    }

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn lookup_reports_absent_for_unknown_key() {
        let cache = TestCache::default();
        assert_eq!(cache.lookup("s.ly/nope").await.unwrap(), CacheEntry::Absent);
    }

    #[tokio::test]
    async fn lookup_prefers_positive_over_negative() {
        let cache = TestCache::default();
        cache.put_negative("s.ly/abc", TTL).await.unwrap();
        cache
            .put_positive("s.ly/abc", "https://example.com", TTL)
            .await
            .unwrap();

        assert_eq!(
            cache.lookup("s.ly/abc").await.unwrap(),
            CacheEntry::Positive("https://example.com".to_string())
        );
    }

    #[tokio::test]
    async fn lookup_reports_negative_marker() {
        let cache = TestCache::default();
        cache.put_negative("s.ly/abc", TTL).await.unwrap();
        assert_eq!(cache.lookup("s.ly/abc").await.unwrap(), CacheEntry::Negative);

        cache.invalidate("s.ly/abc").await.unwrap();
        assert_eq!(cache.lookup("s.ly/abc").await.unwrap(), CacheEntry::Absent);
    }
}
