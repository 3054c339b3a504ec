use crate::entry::RecycleBinEntry;
use crate::error::Result;
use async_trait::async_trait;
use shortlink_core::{EnableStatus, LinkCache, LinkKey, LinkStore, Page, PageRequest};
use std::sync::Arc;
use tracing::{info, trace, warn};

/// Outcome of a lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The store row changed.
    Applied,
    /// Nothing matched: the link was already in the target state, deleted,
    /// or never existed.
    Noop,
}

impl Transition {
    fn from_rows(rows: u64) -> Self {
        if rows > 0 {
            Transition::Applied
        } else {
            Transition::Noop
        }
    }

    pub fn is_applied(self) -> bool {
        self == Transition::Applied
    }
}

#[async_trait]
pub trait RecycleBin: Send + Sync + 'static {
    /// Moves an enabled link into the recycle bin.
    async fn save_recycle_bin(&self, key: &LinkKey) -> Result<Transition>;

    /// Restores a recycled link.
    async fn recover_recycle_bin(&self, key: &LinkKey) -> Result<Transition>;

    /// Permanently deletes a recycled link.
    async fn remove_recycle_bin(&self, key: &LinkKey) -> Result<Transition>;

    /// Lists a group's recycled links, newest first.
    async fn page_recycle_bin(
        &self,
        gid: &str,
        page: PageRequest,
    ) -> Result<Page<RecycleBinEntry>>;
}

/// Coordinates recycle-bin transitions across the link store and the cache.
pub struct RecycleBinService<S: ?Sized, C: ?Sized> {
    store: Arc<S>,
    cache: Arc<C>,
}

impl<S: ?Sized, C: ?Sized> Clone for RecycleBinService<S, C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<S, C> RecycleBinService<S, C>
where
    S: LinkStore + ?Sized,
    C: LinkCache + ?Sized,
{
    pub fn new(store: Arc<S>, cache: Arc<C>) -> Self {
        Self { store, cache }
    }

    /// Drops both cache forms of the link. Runs after every transition,
    /// including no-ops, and never fails the caller.
    async fn invalidate(&self, key: &LinkKey) {
        if let Err(e) = self.cache.invalidate(&key.full_short_url).await {
            warn!(key = %key, error = %e, "cache invalidation failed, entry may stay stale until its TTL");
        }
    }

    fn report(action: &'static str, key: &LinkKey, transition: Transition) -> Transition {
        match transition {
            Transition::Applied => info!(key = %key, action, "recycle bin transition applied"),
            Transition::Noop => warn!(key = %key, action, "recycle bin transition matched nothing"),
        }
        transition
    }
}

#[async_trait]
impl<S, C> RecycleBin for RecycleBinService<S, C>
where
    S: LinkStore + ?Sized,
    C: LinkCache + ?Sized,
{
    async fn save_recycle_bin(&self, key: &LinkKey) -> Result<Transition> {
        let rows = self
            .store
            .set_enable_status(key, EnableStatus::Enabled, EnableStatus::Recycled)
            .await?;
        self.invalidate(key).await;
        Ok(Self::report("recycle", key, Transition::from_rows(rows)))
    }

    async fn recover_recycle_bin(&self, key: &LinkKey) -> Result<Transition> {
        let rows = self
            .store
            .set_enable_status(key, EnableStatus::Recycled, EnableStatus::Enabled)
            .await?;
        self.invalidate(key).await;
        Ok(Self::report("recover", key, Transition::from_rows(rows)))
    }

    async fn remove_recycle_bin(&self, key: &LinkKey) -> Result<Transition> {
        let rows = self
            .store
            .mark_deleted(key, EnableStatus::Recycled)
            .await?;
        self.invalidate(key).await;
        Ok(Self::report("remove", key, Transition::from_rows(rows)))
    }

    async fn page_recycle_bin(
        &self,
        gid: &str,
        page: PageRequest,
    ) -> Result<Page<RecycleBinEntry>> {
        trace!(gid, current = page.current, size = page.size, "paging recycle bin");
        let page = self
            .store
            .page_by_status(gid, EnableStatus::Recycled, page)
            .await?;
        Ok(page.map(RecycleBinEntry::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecycleBinError;
    use shortlink_cache::MokaLinkCache;
    use shortlink_core::cache::Result as CacheResult;
    use shortlink_core::store::Result as StoreResult;
    use shortlink_core::{CacheEntry, CacheError, ReadLinkStore, ShortLink, StorageError};
    use shortlink_storage::InMemoryLinkStore;
    use std::sync::Mutex;
    use std::time::Duration;

    type Events = Arc<Mutex<Vec<&'static str>>>;

    /// Records store writes into a shared event log.
    struct RecordingStore {
        inner: InMemoryLinkStore,
        events: Events,
    }

    #[async_trait]
    impl ReadLinkStore for RecordingStore {
        async fn get(&self, key: &LinkKey) -> StoreResult<Option<ShortLink>> {
            self.inner.get(key).await
        }

        async fn find_enabled(&self, url: &str) -> StoreResult<Option<ShortLink>> {
            self.inner.find_enabled(url).await
        }

        async fn page_by_status(
            &self,
            gid: &str,
            status: EnableStatus,
            page: PageRequest,
        ) -> StoreResult<Page<ShortLink>> {
            self.inner.page_by_status(gid, status, page).await
        }
    }

    #[async_trait]
    impl LinkStore for RecordingStore {
        async fn insert(&self, link: ShortLink) -> StoreResult<()> {
            self.inner.insert(link).await
        }

        async fn set_enable_status(
            &self,
            key: &LinkKey,
            expected: EnableStatus,
            new: EnableStatus,
        ) -> StoreResult<u64> {
            self.events.lock().unwrap().push("store");
            self.inner.set_enable_status(key, expected, new).await
        }

        async fn mark_deleted(&self, key: &LinkKey, expected: EnableStatus) -> StoreResult<u64> {
            self.events.lock().unwrap().push("store");
            self.inner.mark_deleted(key, expected).await
        }
    }

    /// Records invalidations into the shared event log.
    struct RecordingCache {
        inner: MokaLinkCache,
        events: Events,
    }

    #[async_trait]
    impl LinkCache for RecordingCache {
        async fn get_positive(&self, key: &str) -> CacheResult<Option<String>> {
            self.inner.get_positive(key).await
        }

        async fn get_negative(&self, key: &str) -> CacheResult<bool> {
            self.inner.get_negative(key).await
        }

        async fn put_positive(&self, key: &str, url: &str, ttl: Duration) -> CacheResult<()> {
            self.inner.put_positive(key, url, ttl).await
        }

        async fn put_negative(&self, key: &str, ttl: Duration) -> CacheResult<()> {
            self.inner.put_negative(key, ttl).await
        }

        async fn invalidate(&self, key: &str) -> CacheResult<()> {
            self.events.lock().unwrap().push("invalidate");
            self.inner.invalidate(key).await
        }
    }

    struct BrokenCache;

    #[async_trait]
    impl LinkCache for BrokenCache {
        async fn get_positive(&self, _key: &str) -> CacheResult<Option<String>> {
            Err(CacheError::Unavailable("down".into()))
        }

        async fn get_negative(&self, _key: &str) -> CacheResult<bool> {
            Err(CacheError::Unavailable("down".into()))
        }

        async fn put_positive(&self, _key: &str, _url: &str, _ttl: Duration) -> CacheResult<()> {
            Err(CacheError::Unavailable("down".into()))
        }

        async fn put_negative(&self, _key: &str, _ttl: Duration) -> CacheResult<()> {
            Err(CacheError::Unavailable("down".into()))
        }

        async fn invalidate(&self, _key: &str) -> CacheResult<()> {
            Err(CacheError::Unavailable("down".into()))
        }
    }

    struct ReadOnlyStore;

    #[async_trait]
    impl ReadLinkStore for ReadOnlyStore {
        async fn get(&self, _key: &LinkKey) -> StoreResult<Option<ShortLink>> {
            Ok(None)
        }

        async fn find_enabled(&self, _url: &str) -> StoreResult<Option<ShortLink>> {
            Ok(None)
        }

        async fn page_by_status(
            &self,
            _gid: &str,
            _status: EnableStatus,
            _page: PageRequest,
        ) -> StoreResult<Page<ShortLink>> {
            Err(StorageError::Timeout("pool timed out".into()))
        }
    }

    #[async_trait]
    impl LinkStore for ReadOnlyStore {
        async fn insert(&self, _link: ShortLink) -> StoreResult<()> {
            Err(StorageError::Unavailable("read only".into()))
        }

        async fn set_enable_status(
            &self,
            _key: &LinkKey,
            _expected: EnableStatus,
            _new: EnableStatus,
        ) -> StoreResult<u64> {
            Err(StorageError::Unavailable("read only".into()))
        }

        async fn mark_deleted(&self, _key: &LinkKey, _expected: EnableStatus) -> StoreResult<u64> {
            Err(StorageError::Unavailable("read only".into()))
        }
    }

    fn recording() -> (RecycleBinService<RecordingStore, RecordingCache>, Events) {
        let events: Events = Arc::default();
        let store = RecordingStore {
            inner: InMemoryLinkStore::new(),
            events: events.clone(),
        };
        let cache = RecordingCache {
            inner: MokaLinkCache::new(),
            events: events.clone(),
        };
        (RecycleBinService::new(Arc::new(store), Arc::new(cache)), events)
    }

    fn key() -> LinkKey {
        LinkKey::new("g1", "s.ly/abc")
    }

    fn link() -> ShortLink {
        ShortLink::enabled("g1", "s.ly", "abc", "https://example.com")
    }

    #[tokio::test]
    async fn store_write_precedes_invalidation() {
        let (service, events) = recording();
        service.store.insert(link()).await.unwrap();

        assert_eq!(service.save_recycle_bin(&key()).await.unwrap(), Transition::Applied);
        assert_eq!(service.recover_recycle_bin(&key()).await.unwrap(), Transition::Applied);

        assert_eq!(
            *events.lock().unwrap(),
            vec!["store", "invalidate", "store", "invalidate"]
        );
    }

    #[tokio::test]
    async fn noop_still_invalidates() {
        let (service, events) = recording();
        service
            .cache
            .put_positive("s.ly/abc", "https://stale.example.com", Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(service.save_recycle_bin(&key()).await.unwrap(), Transition::Noop);
        assert_eq!(*events.lock().unwrap(), vec!["store", "invalidate"]);
        assert_eq!(
            service.cache.inner.lookup("s.ly/abc").await.unwrap(),
            CacheEntry::Absent
        );
    }

    #[tokio::test]
    async fn recycle_twice_is_applied_then_noop() {
        let (service, _) = recording();
        service.store.insert(link()).await.unwrap();

        assert_eq!(service.save_recycle_bin(&key()).await.unwrap(), Transition::Applied);
        assert_eq!(service.save_recycle_bin(&key()).await.unwrap(), Transition::Noop);

        let stored = service.store.get(&key()).await.unwrap().unwrap();
        assert_eq!(stored.enable_status, EnableStatus::Recycled);
    }

    #[tokio::test]
    async fn recover_enabled_link_is_noop() {
        let (service, _) = recording();
        service.store.insert(link()).await.unwrap();
        assert_eq!(service.recover_recycle_bin(&key()).await.unwrap(), Transition::Noop);
    }

    #[tokio::test]
    async fn remove_requires_recycled_link() {
        let (service, _) = recording();
        service.store.insert(link()).await.unwrap();

        assert_eq!(service.remove_recycle_bin(&key()).await.unwrap(), Transition::Noop);
        assert!(service.store.get(&key()).await.unwrap().is_some());

        service.save_recycle_bin(&key()).await.unwrap();
        assert_eq!(service.remove_recycle_bin(&key()).await.unwrap(), Transition::Applied);
        assert!(service.store.get(&key()).await.unwrap().is_none());

        assert_eq!(service.recover_recycle_bin(&key()).await.unwrap(), Transition::Noop);
    }

    #[tokio::test]
    async fn cache_failure_does_not_fail_transition() {
        let store = Arc::new(InMemoryLinkStore::new());
        store.insert(link()).await.unwrap();
        let service = RecycleBinService::new(store.clone(), Arc::new(BrokenCache));

        assert_eq!(service.save_recycle_bin(&key()).await.unwrap(), Transition::Applied);
        assert!(store.find_enabled("s.ly/abc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let service = RecycleBinService::new(Arc::new(ReadOnlyStore), Arc::new(MokaLinkCache::new()));

        let err = service.save_recycle_bin(&key()).await.unwrap_err();
        assert!(matches!(err, RecycleBinError::Storage(StorageError::Unavailable(_))));

        let err = service
            .page_recycle_bin("g1", PageRequest::default())
            .await
            .unwrap_err();
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn page_lists_only_recycled_links_of_group() {
        let (service, _) = recording();
        for token in ["a", "b", "c"] {
            service
                .store
                .insert(ShortLink::enabled("g1", "s.ly", token, format!("https://example.com/{token}")))
                .await
                .unwrap();
        }
        service
            .store
            .insert(ShortLink::enabled("g2", "s.ly", "d", "https://example.com/d"))
            .await
            .unwrap();

        service.save_recycle_bin(&LinkKey::new("g1", "s.ly/a")).await.unwrap();
        service.save_recycle_bin(&LinkKey::new("g1", "s.ly/c")).await.unwrap();
        service.save_recycle_bin(&LinkKey::new("g2", "s.ly/d")).await.unwrap();

        let page = service
            .page_recycle_bin("g1", PageRequest::new(1, 10))
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.current, 1);
        let mut urls: Vec<_> = page.records.iter().map(|e| e.full_short_url.as_str()).collect();
        urls.sort();
        assert_eq!(urls, vec!["s.ly/a", "s.ly/c"]);
        assert!(page.records.iter().all(|e| e.domain == "http://s.ly"));
    }
}
