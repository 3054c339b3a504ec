use async_trait::async_trait;
use shortlink_cache::MokaLinkCache;
use shortlink_core::store::Result as StoreResult;
use shortlink_core::{
    CacheEntry, EnableStatus, LinkCache, LinkKey, LinkStore, Page, PageRequest, ReadLinkStore,
    ShortLink,
};
use shortlink_recycle_bin::{RecycleBin, RecycleBinService, Transition};
use shortlink_resolver::{Resolution, Resolver, ResolverConfig};
use shortlink_storage::InMemoryLinkStore;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const FULL_SHORT_URL: &str = "https://s.ly/abc";
const ORIGIN_URL: &str = "https://example.com";

#[derive(Default)]
struct CountingStore {
    inner: InMemoryLinkStore,
    reads: AtomicUsize,
}

#[async_trait]
impl ReadLinkStore for CountingStore {
    async fn get(&self, key: &LinkKey) -> StoreResult<Option<ShortLink>> {
        self.inner.get(key).await
    }

    async fn find_enabled(&self, full_short_url: &str) -> StoreResult<Option<ShortLink>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.find_enabled(full_short_url).await
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
impl LinkStore for CountingStore {
    async fn insert(&self, link: ShortLink) -> StoreResult<()> {
        self.inner.insert(link).await
    }

    async fn set_enable_status(
        &self,
        key: &LinkKey,
        expected: EnableStatus,
        new: EnableStatus,
    ) -> StoreResult<u64> {
        self.inner.set_enable_status(key, expected, new).await
    }

    async fn mark_deleted(&self, key: &LinkKey, expected: EnableStatus) -> StoreResult<u64> {
        self.inner.mark_deleted(key, expected).await
    }
}

struct Fixture {
    store: Arc<CountingStore>,
    cache: Arc<MokaLinkCache>,
    resolver: Resolver<CountingStore, MokaLinkCache>,
    recycle_bin: RecycleBinService<CountingStore, MokaLinkCache>,
}

impl Fixture {
    fn new() -> Self {
        let store = Arc::new(CountingStore::default());
        let cache = Arc::new(MokaLinkCache::new());
        Self {
            resolver: Resolver::new(store.clone(), cache.clone(), ResolverConfig::default()),
            recycle_bin: RecycleBinService::new(store.clone(), cache.clone()),
            store,
            cache,
        }
    }

    async fn seed(&self) -> LinkKey {
        let mut link = ShortLink::enabled("g1", "s.ly", "abc", ORIGIN_URL);
        link.full_short_url = FULL_SHORT_URL.to_string();
        let key = link.key();
        self.store.insert(link).await.unwrap();
        key
    }

    fn reads(&self) -> usize {
        self.store.reads.load(Ordering::SeqCst)
    }
}

fn target() -> Resolution {
    Resolution::Target(ORIGIN_URL.to_string())
}

#[tokio::test]
async fn unknown_token_is_negatively_cached() {
    let fx = Fixture::new();

    assert_eq!(fx.resolver.resolve("abc123").await.unwrap(), Resolution::Gone);
    assert_eq!(fx.reads(), 1);

    assert_eq!(fx.resolver.resolve("abc123").await.unwrap(), Resolution::Gone);
    assert_eq!(fx.reads(), 1);
}

#[tokio::test]
async fn recycle_makes_link_gone() {
    let fx = Fixture::new();
    let key = fx.seed().await;

    assert_eq!(fx.resolver.resolve(FULL_SHORT_URL).await.unwrap(), target());
    assert_eq!(
        fx.recycle_bin.save_recycle_bin(&key).await.unwrap(),
        Transition::Applied
    );
    assert_eq!(fx.resolver.resolve(FULL_SHORT_URL).await.unwrap(), Resolution::Gone);
}

#[tokio::test]
async fn recover_clears_negative_marker() {
    let fx = Fixture::new();
    let key = fx.seed().await;

    fx.resolver.resolve(FULL_SHORT_URL).await.unwrap();
    fx.recycle_bin.save_recycle_bin(&key).await.unwrap();
    assert_eq!(fx.resolver.resolve(FULL_SHORT_URL).await.unwrap(), Resolution::Gone);
    assert_eq!(
        fx.cache.lookup(FULL_SHORT_URL).await.unwrap(),
        CacheEntry::Negative
    );

    assert_eq!(
        fx.recycle_bin.recover_recycle_bin(&key).await.unwrap(),
        Transition::Applied
    );
    assert_eq!(fx.resolver.resolve(FULL_SHORT_URL).await.unwrap(), target());
}

#[tokio::test]
async fn recycling_a_recycled_link_is_noop() {
    let fx = Fixture::new();
    let key = fx.seed().await;

    fx.recycle_bin.save_recycle_bin(&key).await.unwrap();
    let before = fx.store.get(&key).await.unwrap();

    assert_eq!(
        fx.recycle_bin.save_recycle_bin(&key).await.unwrap(),
        Transition::Noop
    );
    assert_eq!(
        fx.recycle_bin.save_recycle_bin(&key).await.unwrap(),
        Transition::Noop
    );
    assert_eq!(fx.store.get(&key).await.unwrap(), before);
    assert_eq!(fx.resolver.resolve(FULL_SHORT_URL).await.unwrap(), Resolution::Gone);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_misses_leave_negative_entry() {
    let fx = Fixture::new();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let resolver = fx.resolver.clone();
            tokio::spawn(async move { resolver.resolve("s.ly/never-seen").await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), Resolution::Gone);
    }
    assert!(fx.reads() >= 1);
    assert_eq!(
        fx.cache.lookup("s.ly/never-seen").await.unwrap(),
        CacheEntry::Negative
    );
}

#[tokio::test]
async fn recycle_overrides_stale_positive_entry() {
    let fx = Fixture::new();
    let key = fx.seed().await;
    fx.cache
        .put_positive(FULL_SHORT_URL, ORIGIN_URL, Duration::from_secs(3600))
        .await
        .unwrap();

    fx.recycle_bin.save_recycle_bin(&key).await.unwrap();

    assert_eq!(fx.resolver.resolve(FULL_SHORT_URL).await.unwrap(), Resolution::Gone);
}

#[tokio::test]
async fn removed_link_stays_gone() {
    let fx = Fixture::new();
    let key = fx.seed().await;
    fx.resolver.resolve(FULL_SHORT_URL).await.unwrap();

    fx.recycle_bin.save_recycle_bin(&key).await.unwrap();
    assert_eq!(
        fx.recycle_bin.remove_recycle_bin(&key).await.unwrap(),
        Transition::Applied
    );
    assert_eq!(
        fx.recycle_bin.recover_recycle_bin(&key).await.unwrap(),
        Transition::Noop
    );
    assert_eq!(fx.resolver.resolve(FULL_SHORT_URL).await.unwrap(), Resolution::Gone);

    let page = fx
        .recycle_bin
        .page_recycle_bin("g1", PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_recycles_apply_once() {
    let fx = Fixture::new();
    let key = fx.seed().await;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = fx.recycle_bin.clone();
            let key = key.clone();
            tokio::spawn(async move { service.save_recycle_bin(&key).await })
        })
        .collect();

    let mut applied = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap().is_applied() {
            applied += 1;
        }
    }
    assert_eq!(applied, 1);
    assert_eq!(fx.resolver.resolve(FULL_SHORT_URL).await.unwrap(), Resolution::Gone);
}
