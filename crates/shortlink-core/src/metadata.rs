use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What a target page says about itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkMetadata {
    pub title: String,
    pub favicon_url: String,
}

/// Best-effort page metadata lookup.
///
/// Implementations never fail: on any problem they return default values.
#[async_trait]
pub trait MetadataFetcher: Send + Sync + 'static {
    async fn fetch_metadata(&self, url: &str) -> LinkMetadata;
}
