use crate::config::ResolverConfig;
use crate::error::Result;
use async_trait::async_trait;
use shortlink_core::{LinkCache, ReadLinkStore};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Outcome of resolving a full short URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Redirect to this origin URL.
    Target(String),
    /// Unknown, recycled or deleted.
    Gone,
}

impl Resolution {
    pub fn target(&self) -> Option<&str> {
        match self {
            Resolution::Target(url) => Some(url),
            Resolution::Gone => None,
        }
    }
}

#[async_trait]
pub trait ResolveLink: Send + Sync + 'static {
    /// Resolves a full short URL to its redirect target.
    async fn resolve(&self, full_short_url: &str) -> Result<Resolution>;
}

/// Cache-first resolver with read-repair.
pub struct Resolver<S: ?Sized, C: ?Sized> {
    store: Arc<S>,
    cache: Arc<C>,
    config: ResolverConfig,
}

impl<S: ?Sized, C: ?Sized> Clone for Resolver<S, C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache: Arc::clone(&self.cache),
            config: self.config,
        }
    }
}

impl<S, C> Resolver<S, C>
where
    S: ReadLinkStore + ?Sized,
    C: LinkCache + ?Sized,
{
    pub fn new(store: Arc<S>, cache: Arc<C>, config: ResolverConfig) -> Self {
        Self {
            store,
            cache,
            config,
        }
    }

    /// Resolves `full_short_url`.
    ///
    /// 1. A positive cache entry is returned as is.
    /// 2. A negative marker short-circuits to [`Resolution::Gone`].
    /// 3. Otherwise the store is asked for an enabled, non-deleted link and
    ///    the answer is written back: the target with the positive TTL, or a
    ///    negative marker with the negative TTL.
    ///
    /// Cache errors at any step are logged and treated as misses. Store
    /// errors are returned.
    pub async fn resolve(&self, full_short_url: &str) -> Result<Resolution> {
        trace!(full_short_url, "resolving");

        match self.cache.get_positive(full_short_url).await {
            Ok(Some(url)) => return Ok(Resolution::Target(url)),
            Ok(None) => {}
            Err(e) => {
                warn!(full_short_url, error = %e, "positive cache lookup failed, treating as miss");
            }
        }

        match self.cache.get_negative(full_short_url).await {
            Ok(true) => {
                debug!(full_short_url, "negative cache hit");
                return Ok(Resolution::Gone);
            }
            Ok(false) => {}
            Err(e) => {
                warn!(full_short_url, error = %e, "negative cache lookup failed, treating as miss");
            }
        }

        trace!(full_short_url, "cache miss, reading store");
        match self.store.find_enabled(full_short_url).await? {
            Some(link) => {
                if let Err(e) = self
                    .cache
                    .put_positive(full_short_url, &link.origin_url, self.config.positive_ttl)
                    .await
                {
                    warn!(full_short_url, error = %e, "failed to cache redirect target");
                }
                debug!(full_short_url, origin_url = %link.origin_url, "resolved from store");
                Ok(Resolution::Target(link.origin_url))
            }
            None => {
                if let Err(e) = self
                    .cache
                    .put_negative(full_short_url, self.config.negative_ttl)
                    .await
                {
                    warn!(full_short_url, error = %e, "failed to cache negative marker");
                }
                debug!(full_short_url, "not resolvable");
                Ok(Resolution::Gone)
            }
        }
    }
}

#[async_trait]
impl<S, C> ResolveLink for Resolver<S, C>
where
    S: ReadLinkStore + ?Sized,
    C: LinkCache + ?Sized,
{
    async fn resolve(&self, full_short_url: &str) -> Result<Resolution> {
        Resolver::resolve(self, full_short_url).await
    }
}
