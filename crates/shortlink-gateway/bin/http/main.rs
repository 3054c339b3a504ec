mod cli;

use crate::cli::{CacheBackendArg, LogFormatArg, StorageBackendArg, CLI};
use anyhow::Context;
use clap::Parser;
use shortlink_cache::{MokaLinkCache, RedisLinkCache, TimeoutCache};
use shortlink_core::{LinkCache, LinkStore};
use shortlink_gateway::{App, AppState};
use shortlink_metadata::{HttpMetadataFetcher, MetadataConfig};
use shortlink_recycle_bin::RecycleBinService;
use shortlink_resolver::{Resolver, ResolverConfig};
use shortlink_storage::{InMemoryLinkStore, MySqlLinkStore, MySqlStoreConfig};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormatArg) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormatArg::Json => builder.json().init(),
        LogFormatArg::Pretty => builder.init(),
    }
}

async fn build_store(config: &CLI) -> anyhow::Result<Arc<dyn LinkStore>> {
    match config.storage {
        StorageBackendArg::InMemory => {
            warn!("in-memory store starts empty; every short link will resolve to 404");
            Ok(Arc::new(InMemoryLinkStore::new()))
        }
        StorageBackendArg::Mysql => {
            let mysql_dsn = config
                .mysql_dsn
                .as_deref()
                .context("mysql dsn is required when storage backend is mysql")?;
            let store_config = MySqlStoreConfig::builder()
                .acquire_timeout(config.store_timeout())
                .statement_timeout(config.store_timeout())
                .build();
            let store = MySqlLinkStore::connect_with(mysql_dsn, &store_config)
                .await
                .context("failed to connect to MySQL")?;
            if config.mysql_init_schema {
                store
                    .ensure_schema()
                    .await
                    .context("failed to create the t_link table")?;
            }
            Ok(Arc::new(store))
        }
    }
}

async fn build_cache(config: &CLI) -> anyhow::Result<Arc<dyn LinkCache>> {
    let timeout = config.cache_timeout();
    match config.cache {
        CacheBackendArg::Moka => Ok(Arc::new(TimeoutCache::new(
            MokaLinkCache::with_capacity(config.moka_capacity),
            timeout,
        ))),
        CacheBackendArg::Redis => {
            let redis_url = config
                .redis_url
                .as_deref()
                .context("redis url is required when cache backend is redis")?;
            let cache = RedisLinkCache::connect(redis_url)
                .await
                .context("failed to connect to Redis")?;
            Ok(Arc::new(TimeoutCache::new(cache, timeout)))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down gateway");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::try_parse()?;
    init_tracing(config.log_format);
    config.validate().map_err(anyhow::Error::msg)?;

    info!(
        listen_addr = %config.listen_addr,
        storage_backend = %config.storage,
        cache_backend = %config.cache,
        store_timeout_ms = config.store_timeout_ms,
        positive_ttl_secs = config.positive_ttl_secs,
        negative_ttl_secs = config.negative_ttl_secs,
        "starting gateway server"
    );

    let store = build_store(&config).await?;
    let cache = build_cache(&config).await?;

    let resolver = Resolver::new(
        store.clone(),
        cache.clone(),
        ResolverConfig::builder()
            .positive_ttl(config.positive_ttl())
            .negative_ttl(config.negative_ttl())
            .build(),
    );
    let recycle_bin = RecycleBinService::new(store, cache);
    let metadata = HttpMetadataFetcher::new(
        MetadataConfig::builder()
            .request_timeout(config.metadata_timeout())
            .build(),
    )?;

    let state = AppState::new(
        Arc::new(resolver),
        Arc::new(recycle_bin),
        Arc::new(metadata),
        config.default_domain.clone(),
    );

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(listen_addr = %listener.local_addr()?, "gateway listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
