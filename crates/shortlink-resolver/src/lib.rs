//! Read path from a full short URL to its redirect target.
//!
//! [`Resolver`] consults the [`LinkCache`](shortlink_core::LinkCache) first
//! (positive entry, then negative marker) and only falls back to the link
//! store on a miss, repairing the cache with whatever the store says. Cache
//! failures never block a redirect: they are treated as misses.
//!
//! ```rust
//! use std::sync::Arc;
//! use shortlink_core::{LinkStore, ShortLink};
//! use shortlink_resolver::{Resolution, Resolver, ResolverConfig};
//! # use shortlink_cache::MokaLinkCache;
//! # use shortlink_storage::InMemoryLinkStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(InMemoryLinkStore::new());
//! store
//!     .insert(ShortLink::enabled("g1", "s.ly", "abc", "https://example.com"))
//!     .await?;
//!
//! let resolver = Resolver::new(store, Arc::new(MokaLinkCache::new()), ResolverConfig::default());
//! assert_eq!(
//!     resolver.resolve("s.ly/abc").await?,
//!     Resolution::Target("https://example.com".to_string())
//! );
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod resolver;

pub use config::{ResolverConfig, ResolverConfigBuilder};
pub use error::{ResolveError, Result};
pub use resolver::{Resolution, Resolver, ResolveLink};
