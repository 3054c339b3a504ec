use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::time::Duration;

pub const LISTEN_ADDR_ENV: &str = "SHORTLINK_GATEWAY_LISTEN_ADDR";
pub const DEFAULT_DOMAIN_ENV: &str = "SHORTLINK_GATEWAY_DEFAULT_DOMAIN";
pub const STORAGE_BACKEND_ENV: &str = "SHORTLINK_GATEWAY_STORAGE_BACKEND";
pub const MYSQL_DSN_ENV: &str = "SHORTLINK_GATEWAY_MYSQL_DSN";
pub const MYSQL_INIT_SCHEMA_ENV: &str = "SHORTLINK_GATEWAY_MYSQL_INIT_SCHEMA";
pub const STORE_TIMEOUT_ENV: &str = "SHORTLINK_GATEWAY_STORE_TIMEOUT_MS";
pub const CACHE_BACKEND_ENV: &str = "SHORTLINK_GATEWAY_CACHE_BACKEND";
pub const REDIS_URL_ENV: &str = "SHORTLINK_GATEWAY_REDIS_URL";
pub const MOKA_CAPACITY_ENV: &str = "SHORTLINK_GATEWAY_MOKA_CAPACITY";
pub const POSITIVE_TTL_ENV: &str = "SHORTLINK_GATEWAY_POSITIVE_TTL_SECS";
pub const NEGATIVE_TTL_ENV: &str = "SHORTLINK_GATEWAY_NEGATIVE_TTL_SECS";
pub const CACHE_TIMEOUT_ENV: &str = "SHORTLINK_GATEWAY_CACHE_TIMEOUT_MS";
pub const METADATA_TIMEOUT_ENV: &str = "SHORTLINK_GATEWAY_METADATA_TIMEOUT_MS";
pub const LOG_FORMAT_ENV: &str = "SHORTLINK_GATEWAY_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8001";
pub const DEFAULT_DOMAIN: &str = "127.0.0.1:8001";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mysql")]
    Mysql,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Mysql => write!(f, "mysql"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheBackendArg {
    #[value(name = "moka")]
    Moka,
    #[value(name = "redis")]
    Redis,
}

impl Display for CacheBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheBackendArg::Moka => write!(f, "moka"),
            CacheBackendArg::Redis => write!(f, "redis"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    #[value(name = "pretty")]
    Pretty,
    #[value(name = "json")]
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Host used for the full short URL when a request carries no Host header.
    #[arg(long, env = DEFAULT_DOMAIN_ENV, default_value = DEFAULT_DOMAIN)]
    pub default_domain: String,

    /// Link store backend. `in-memory` starts empty and nothing in the
    /// gateway can add links to it, so it suits local smoke runs only;
    /// deployments use `mysql`.
    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("storage", "mysql"))]
    pub mysql_dsn: Option<String>,

    /// Create the `t_link` table at startup when it is missing.
    #[arg(long, env = MYSQL_INIT_SCHEMA_ENV)]
    pub mysql_init_schema: bool,

    /// Bound on acquiring a store connection and on each store statement.
    #[arg(long, env = STORE_TIMEOUT_ENV, default_value_t = 3_000)]
    pub store_timeout_ms: u64,

    #[arg(
        long,
        env = CACHE_BACKEND_ENV,
        value_enum,
        default_value_t = CacheBackendArg::Moka
    )]
    pub cache: CacheBackendArg,

    #[arg(long, env = REDIS_URL_ENV, required_if_eq("cache", "redis"))]
    pub redis_url: Option<String>,

    #[arg(long, env = MOKA_CAPACITY_ENV, default_value_t = 10_000)]
    pub moka_capacity: u64,

    #[arg(long, env = POSITIVE_TTL_ENV, default_value_t = 86_400)]
    pub positive_ttl_secs: u64,

    #[arg(long, env = NEGATIVE_TTL_ENV, default_value_t = 1_800)]
    pub negative_ttl_secs: u64,

    #[arg(long, env = CACHE_TIMEOUT_ENV, default_value_t = 200)]
    pub cache_timeout_ms: u64,

    #[arg(long, env = METADATA_TIMEOUT_ENV, default_value_t = 5_000)]
    pub metadata_timeout_ms: u64,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormatArg::Pretty)]
    pub log_format: LogFormatArg,
}

impl CLI {
    pub fn positive_ttl(&self) -> Duration {
        Duration::from_secs(self.positive_ttl_secs)
    }

    pub fn negative_ttl(&self) -> Duration {
        Duration::from_secs(self.negative_ttl_secs)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }

    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_millis(self.metadata_timeout_ms)
    }

    /// Rejects TTL combinations the resolver cannot honour.
    pub fn validate(&self) -> Result<(), String> {
        if self.positive_ttl_secs == 0 || self.negative_ttl_secs == 0 {
            return Err("cache TTLs must be greater than zero".to_string());
        }
        if self.store_timeout_ms == 0 {
            return Err("store timeout must be greater than zero".to_string());
        }
        if self.negative_ttl_secs >= self.positive_ttl_secs {
            return Err(format!(
                "negative TTL ({}s) must be shorter than positive TTL ({}s)",
                self.negative_ttl_secs, self.positive_ttl_secs
            ));
        }
        Ok(())
    }
}
