//! Core types and traits for the short-link service.
//!
//! This crate provides the link model and lifecycle states shared by the
//! resolver and the recycle-bin coordinator, together with the seams the
//! rest of the workspace plugs into: the link store, the resolution cache
//! and the page metadata fetcher.

pub mod cache;
pub mod error;
pub mod link;
pub mod metadata;
pub mod page;
pub mod store;

pub use cache::{CacheEntry, LinkCache};
pub use error::{CacheError, StorageError};
pub use link::{full_short_url, DelFlag, EnableStatus, LinkKey, ShortLink};
pub use metadata::{LinkMetadata, MetadataFetcher};
pub use page::{Page, PageRequest};
pub use store::{LinkStore, ReadLinkStore};
