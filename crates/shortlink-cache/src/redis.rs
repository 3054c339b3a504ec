use async_trait::async_trait;
use redis::AsyncCommands;
use shortlink_core::cache::{LinkCache, Result};
use shortlink_core::CacheError;
use std::time::Duration;
use tracing::{debug, trace, warn};

const DEFAULT_GOTO_PREFIX: &str = "short-link:goto:";
const DEFAULT_IS_NULL_PREFIX: &str = "short-link:is-null:goto:";
const NEGATIVE_MARKER: &str = "-";

/// A Redis-based implementation of [`LinkCache`].
///
/// Positive entries are stored as the plain origin URL under the goto
/// prefix; negative markers live under a separate is-null prefix. Each is
/// written with `SET EX`, and `invalidate` drops both keys in one `DEL`.
#[derive(Debug, Clone)]
pub struct RedisLinkCache {
    conn: redis::aio::MultiplexedConnection,
    goto_prefix: String,
    is_null_prefix: String,
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> CacheError {
    let message = format!("{operation}: {err}");
    if message.to_ascii_lowercase().contains("timed out") {
        CacheError::Timeout(message)
    } else {
        CacheError::Operation(message)
    }
}

/// Redis expirations are whole seconds; round up so a short TTL never
/// becomes "no expiry".
fn ttl_seconds(ttl: Duration) -> u64 {
    let secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
    secs.max(1)
}

impl RedisLinkCache {
    /// Creates a new Redis link cache with the default key prefixes.
    ///
    /// # Arguments
    ///
    /// * `conn` - A multiplexed Redis connection
    pub fn new(conn: redis::aio::MultiplexedConnection) -> Self {
        Self::with_prefixes(conn, DEFAULT_GOTO_PREFIX, DEFAULT_IS_NULL_PREFIX)
    }

    /// Creates a new Redis link cache with custom key prefixes.
    ///
    /// # Arguments
    ///
    /// * `conn` - A multiplexed Redis connection
    /// * `goto_prefix` - Prefix for positive entries (e.g., "myapp:goto:")
    /// * `is_null_prefix` - Prefix for negative markers (e.g., "myapp:is-null:goto:")
    pub fn with_prefixes(
        conn: redis::aio::MultiplexedConnection,
        goto_prefix: impl Into<String>,
        is_null_prefix: impl Into<String>,
    ) -> Self {
        Self {
            conn,
            goto_prefix: goto_prefix.into(),
            is_null_prefix: is_null_prefix.into(),
        }
    }

    /// Opens a client for `redis_url` and creates a cache on a fresh
    /// multiplexed connection.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url).map_err(|e| {
            CacheError::Initialization(format!("failed to create Redis client: {e}"))
        })?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError::Unavailable(format!("failed to connect to Redis: {e}")))?;
        Ok(Self::new(conn))
    }

    fn goto_key(&self, key: &str) -> String {
        format!("{}{}", self.goto_prefix, key)
    }

    fn is_null_key(&self, key: &str) -> String {
        format!("{}{}", self.is_null_prefix, key)
    }
}

#[async_trait]
impl LinkCache for RedisLinkCache {
    async fn get_positive(&self, key: &str) -> Result<Option<String>> {
        let redis_key = self.goto_key(key);
        trace!(full_short_url = %key, "Fetching target from Redis cache");

        let mut conn = self.conn.clone();
        match conn.get::<_, Option<String>>(&redis_key).await {
            Ok(Some(url)) => {
                debug!(full_short_url = %key, "Positive cache hit in Redis");
                Ok(Some(url))
            }
            Ok(None) => {
                trace!(full_short_url = %key, "No positive entry in Redis");
                Ok(None)
            }
            Err(e) => {
                warn!(full_short_url = %key, error = %e, "Redis error on get");
                Err(map_redis_error("failed to fetch value from Redis", e))
            }
        }
    }

    async fn get_negative(&self, key: &str) -> Result<bool> {
        let redis_key = self.is_null_key(key);

        let mut conn = self.conn.clone();
        match conn.exists::<_, bool>(&redis_key).await {
            Ok(hit) => {
                if hit {
                    debug!(full_short_url = %key, "Negative cache hit in Redis");
                }
                Ok(hit)
            }
            Err(e) => {
                warn!(full_short_url = %key, error = %e, "Redis error on exists");
                Err(map_redis_error("failed to check negative marker in Redis", e))
            }
        }
    }

    async fn put_positive(&self, key: &str, url: &str, ttl: Duration) -> Result<()> {
        let redis_key = self.goto_key(key);

        let mut conn = self.conn.clone();
        match conn
            .set_ex::<_, _, ()>(&redis_key, url, ttl_seconds(ttl))
            .await
        {
            Ok(()) => {
                debug!(full_short_url = %key, ttl_secs = ttl_seconds(ttl), "Cached target in Redis");
                Ok(())
            }
            Err(e) => {
                warn!(full_short_url = %key, error = %e, "Failed to cache target in Redis");
                Err(map_redis_error("failed to write value to Redis", e))
            }
        }
    }

    async fn put_negative(&self, key: &str, ttl: Duration) -> Result<()> {
        let redis_key = self.is_null_key(key);

        let mut conn = self.conn.clone();
        match conn
            .set_ex::<_, _, ()>(&redis_key, NEGATIVE_MARKER, ttl_seconds(ttl))
            .await
        {
            Ok(()) => {
                debug!(full_short_url = %key, ttl_secs = ttl_seconds(ttl), "Cached negative marker in Redis");
                Ok(())
            }
            Err(e) => {
                warn!(full_short_url = %key, error = %e, "Failed to cache negative marker in Redis");
                Err(map_redis_error("failed to write negative marker to Redis", e))
            }
        }
    }

    async fn invalidate(&self, key: &str) -> Result<()> {
        let keys = vec![self.goto_key(key), self.is_null_key(key)];

        let mut conn = self.conn.clone();
        match conn.del::<_, ()>(keys).await {
            Ok(()) => {
                debug!(full_short_url = %key, "Invalidated Redis entries");
                Ok(())
            }
            Err(e) => {
                warn!(full_short_url = %key, error = %e, "Failed to invalidate Redis entries");
                Err(map_redis_error("failed to delete values from Redis", e))
            }
        }
    }
}
