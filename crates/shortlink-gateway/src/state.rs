use shortlink_core::MetadataFetcher;
use shortlink_recycle_bin::RecycleBin;
use shortlink_resolver::ResolveLink;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    resolver: Arc<dyn ResolveLink>,
    recycle_bin: Arc<dyn RecycleBin>,
    metadata: Arc<dyn MetadataFetcher>,
    default_domain: String,
}

impl AppState {
    pub fn new(
        resolver: Arc<dyn ResolveLink>,
        recycle_bin: Arc<dyn RecycleBin>,
        metadata: Arc<dyn MetadataFetcher>,
        default_domain: impl Into<String>,
    ) -> Self {
        Self {
            resolver,
            recycle_bin,
            metadata,
            default_domain: default_domain.into(),
        }
    }

    pub fn resolver(&self) -> &dyn ResolveLink {
        self.resolver.as_ref()
    }

    pub fn recycle_bin(&self) -> &dyn RecycleBin {
        self.recycle_bin.as_ref()
    }

    pub fn metadata(&self) -> &dyn MetadataFetcher {
        self.metadata.as_ref()
    }

    /// Domain used to build the full short URL when a request has no `Host`.
    pub fn default_domain(&self) -> &str {
        &self.default_domain
    }
}
