use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use shortlink_core::store::{LinkStore, ReadLinkStore, Result};
use shortlink_core::{DelFlag, EnableStatus, LinkKey, Page, PageRequest, ShortLink, StorageError};
use std::cmp::Reverse;
use tracing::trace;

/// In-memory implementation of the link store using DashMap.
///
/// Non-deleted links are indexed by full short URL. Conditional updates run
/// under the shard write lock of their key, so a compare-and-set on one link
/// can never interleave with another on the same link. Deleted links move
/// to a tombstone list and no longer block the identity.
#[derive(Debug, Default)]
pub struct InMemoryLinkStore {
    live: DashMap<String, ShortLink>,
    tombstones: Mutex<Vec<ShortLink>>,
}

impl InMemoryLinkStore {
    /// Creates a new in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the permanently deleted links, oldest deletion first.
    pub fn tombstones(&self) -> Vec<ShortLink> {
        self.tombstones.lock().clone()
    }
}

#[async_trait]
impl ReadLinkStore for InMemoryLinkStore {
    async fn get(&self, key: &LinkKey) -> Result<Option<ShortLink>> {
        Ok(self
            .live
            .get(&key.full_short_url)
            .filter(|link| link.gid == key.gid)
            .map(|link| link.value().clone()))
    }

    async fn find_enabled(&self, full_short_url: &str) -> Result<Option<ShortLink>> {
        Ok(self
            .live
            .get(full_short_url)
            .filter(|link| link.is_resolvable())
            .map(|link| link.value().clone()))
    }

    async fn page_by_status(
        &self,
        gid: &str,
        status: EnableStatus,
        page: PageRequest,
    ) -> Result<Page<ShortLink>> {
        let mut matching: Vec<ShortLink> = self
            .live
            .iter()
            .filter(|link| link.gid == gid && link.enable_status == status)
            .map(|link| link.value().clone())
            .collect();
        matching.sort_by_key(|link| (Reverse(link.create_time), link.full_short_url.clone()));

        let total = matching.len() as u64;
        let records = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.size as usize)
            .collect();
        Ok(Page::new(records, total, page))
    }
}

#[async_trait]
impl LinkStore for InMemoryLinkStore {
    async fn insert(&self, link: ShortLink) -> Result<()> {
        if link.del_flag == DelFlag::Deleted {
            self.tombstones.lock().push(link);
            return Ok(());
        }

        match self.live.entry(link.full_short_url.clone()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(link.full_short_url)),
            Entry::Vacant(slot) => {
                slot.insert(link);
                Ok(())
            }
        }
    }

    async fn set_enable_status(
        &self,
        key: &LinkKey,
        expected: EnableStatus,
        new: EnableStatus,
    ) -> Result<u64> {
        let Some(mut link) = self.live.get_mut(&key.full_short_url) else {
            trace!(key = %key, "no live link to update");
            return Ok(0);
        };

        if link.gid != key.gid || link.enable_status != expected {
            trace!(key = %key, current = ?link.enable_status, ?expected, "status precondition not met");
            return Ok(0);
        }

        link.enable_status = new;
        Ok(1)
    }

    async fn mark_deleted(&self, key: &LinkKey, expected: EnableStatus) -> Result<u64> {
        let removed = self.live.remove_if(&key.full_short_url, |_, link| {
            link.gid == key.gid && link.enable_status == expected
        });

        let Some((_, mut link)) = removed else {
            return Ok(0);
        };

        link.del_flag = DelFlag::Deleted;
        self.tombstones.lock().push(link);
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::{SignedDuration, Timestamp};
    use std::sync::Arc;

    fn link(gid: &str, token: &str) -> ShortLink {
        ShortLink::enabled(gid, "s.ly", token, format!("https://example.com/{token}"))
    }

    fn key(gid: &str, token: &str) -> LinkKey {
        LinkKey::new(gid, format!("s.ly/{token}"))
    }

    #[tokio::test]
    async fn insert_and_get() {
        let store = InMemoryLinkStore::new();
        store.insert(link("g1", "abc")).await.unwrap();

        let got = store.get(&key("g1", "abc")).await.unwrap().unwrap();
        assert_eq!(got.origin_url, "https://example.com/abc");
        assert!(store.get(&key("g2", "abc")).await.unwrap().is_none());
        assert!(store.get(&key("g1", "nope")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn insert_duplicate_full_short_url_conflicts() {
        let store = InMemoryLinkStore::new();
        store.insert(link("g1", "abc")).await.unwrap();

        let err = store.insert(link("g2", "abc")).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict(url) if url == "s.ly/abc"));
    }

    #[tokio::test]
    async fn find_enabled_skips_recycled() {
        let store = InMemoryLinkStore::new();
        store.insert(link("g1", "abc")).await.unwrap();
        assert!(store.find_enabled("s.ly/abc").await.unwrap().is_some());

        let changed = store
            .set_enable_status(&key("g1", "abc"), EnableStatus::Enabled, EnableStatus::Recycled)
            .await
            .unwrap();
        assert_eq!(changed, 1);
        assert!(store.find_enabled("s.ly/abc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_enable_status_requires_expected_state() {
        let store = InMemoryLinkStore::new();
        store.insert(link("g1", "abc")).await.unwrap();

        let k = key("g1", "abc");
        let changed = store
            .set_enable_status(&k, EnableStatus::Recycled, EnableStatus::Enabled)
            .await
            .unwrap();
        assert_eq!(changed, 0);

        let wrong_group = store
            .set_enable_status(&key("g2", "abc"), EnableStatus::Enabled, EnableStatus::Recycled)
            .await
            .unwrap();
        assert_eq!(wrong_group, 0);

        let missing = store
            .set_enable_status(&key("g1", "nope"), EnableStatus::Enabled, EnableStatus::Recycled)
            .await
            .unwrap();
        assert_eq!(missing, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_transitions_succeed_once() {
        let store = Arc::new(InMemoryLinkStore::new());
        store.insert(link("g1", "abc")).await.unwrap();

        let mut handles = vec![];
        for _ in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .set_enable_status(&key("g1", "abc"), EnableStatus::Enabled, EnableStatus::Recycled)
                    .await
                    .unwrap()
            }));
        }

        let mut total = 0;
        for handle in handles {
            total += handle.await.unwrap();
        }
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn mark_deleted_is_terminal_and_frees_identity() {
        let store = InMemoryLinkStore::new();
        store.insert(link("g1", "abc")).await.unwrap();
        let k = key("g1", "abc");

        // Enabled links must be recycled first.
        assert_eq!(store.mark_deleted(&k, EnableStatus::Recycled).await.unwrap(), 0);

        store
            .set_enable_status(&k, EnableStatus::Enabled, EnableStatus::Recycled)
            .await
            .unwrap();
        assert_eq!(store.mark_deleted(&k, EnableStatus::Recycled).await.unwrap(), 1);
        assert_eq!(store.mark_deleted(&k, EnableStatus::Recycled).await.unwrap(), 0);

        assert!(store.get(&k).await.unwrap().is_none());
        let restored = store
            .set_enable_status(&k, EnableStatus::Recycled, EnableStatus::Enabled)
            .await
            .unwrap();
        assert_eq!(restored, 0);

        let tombstones = store.tombstones();
        assert_eq!(tombstones.len(), 1);
        assert_eq!(tombstones[0].del_flag, DelFlag::Deleted);

        store.insert(link("g1", "abc")).await.unwrap();
        assert!(store.find_enabled("s.ly/abc").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn page_by_status_orders_newest_first() {
        let store = InMemoryLinkStore::new();
        let base = Timestamp::now();
        for (i, token) in ["a01", "a02", "a03", "a04"].iter().enumerate() {
            let mut l = link("g1", token);
            l.enable_status = EnableStatus::Recycled;
            l.create_time = base + SignedDuration::from_secs(i as i64);
            store.insert(l).await.unwrap();
        }
        store.insert(link("g1", "live")).await.unwrap();
        let mut other_group = link("g2", "x01");
        other_group.enable_status = EnableStatus::Recycled;
        store.insert(other_group).await.unwrap();

        let first = store
            .page_by_status("g1", EnableStatus::Recycled, PageRequest::new(1, 3))
            .await
            .unwrap();
        assert_eq!(first.total, 4);
        let tokens: Vec<_> = first.records.iter().map(|l| l.short_uri.as_str()).collect();
        assert_eq!(tokens, vec!["a04", "a03", "a02"]);

        let second = store
            .page_by_status("g1", EnableStatus::Recycled, PageRequest::new(2, 3))
            .await
            .unwrap();
        let tokens: Vec<_> = second.records.iter().map(|l| l.short_uri.as_str()).collect();
        assert_eq!(tokens, vec!["a01"]);
    }
}
