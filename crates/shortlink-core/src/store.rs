use crate::error::StorageError;
use crate::link::{EnableStatus, LinkKey, ShortLink};
use crate::page::{Page, PageRequest};
use async_trait::async_trait;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// The read side of the link store.
///
/// The resolver only ever needs this half; it never mutates lifecycle state.
#[async_trait]
pub trait ReadLinkStore: Send + Sync + 'static {
    /// Returns the non-deleted link with the given identity, if any.
    async fn get(&self, key: &LinkKey) -> Result<Option<ShortLink>>;

    /// Returns the link behind `full_short_url` only if it is enabled and
    /// not deleted.
    async fn find_enabled(&self, full_short_url: &str) -> Result<Option<ShortLink>>;

    /// Lists a group's non-deleted links in the given status, newest first.
    async fn page_by_status(
        &self,
        gid: &str,
        status: EnableStatus,
        page: PageRequest,
    ) -> Result<Page<ShortLink>>;
}

#[async_trait]
pub trait LinkStore: ReadLinkStore {
    /// Inserts a new link. Returns `Err(Conflict)` if a non-deleted link
    /// already holds the same full short URL.
    async fn insert(&self, link: ShortLink) -> Result<()>;

    /// Atomically moves a non-deleted link from `expected` to `new`.
    ///
    /// Returns the number of rows changed: `0` when the link is missing,
    /// deleted or not currently in `expected`.
    async fn set_enable_status(
        &self,
        key: &LinkKey,
        expected: EnableStatus,
        new: EnableStatus,
    ) -> Result<u64>;

    /// Atomically soft-deletes a non-deleted link currently in `expected`.
    ///
    /// Returns the number of rows changed. Deletion is terminal.
    async fn mark_deleted(&self, key: &LinkKey, expected: EnableStatus) -> Result<u64>;
}
