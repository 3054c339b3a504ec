use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use jiff::Timestamp;
use shortlink_core::store::{LinkStore, ReadLinkStore, Result};
use shortlink_core::{DelFlag, EnableStatus, LinkKey, Page, PageRequest, ShortLink, StorageError};
use sqlx::mysql::{MySqlPoolOptions, MySqlRow};
use sqlx::{MySqlPool, Row};
use tracing::{trace, warn};
use typed_builder::TypedBuilder;

/// Schema of the `t_link` table, safe to apply more than once.
pub const LINK_TABLE_DDL: &str = include_str!("../ddl/mysql/t_link.sql");

/// Connection limits for [`MySqlLinkStore`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct MySqlStoreConfig {
    /// Upper bound on waiting for a pooled connection, including the
    /// initial connect.
    #[builder(default = Duration::from_secs(3))]
    pub acquire_timeout: Duration,

    /// Upper bound on a single statement round trip.
    #[builder(default = Duration::from_secs(3))]
    pub statement_timeout: Duration,

    #[builder(default = 10)]
    pub max_connections: u32,
}

impl Default for MySqlStoreConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// MySQL implementation of the link store contract.
///
/// Soft delete sets `del_flag = 1` and stamps `del_time`; the unique key on
/// `(full_short_url, del_time)` lets a deleted link's URL be reused. Every
/// lifecycle transition is a single conditional `UPDATE` whose predicate
/// carries the expected current state, so concurrent transitions on one link
/// cannot both report success.
///
/// Each statement is bounded by [`MySqlStoreConfig::statement_timeout`]; an
/// overrun surfaces as [`StorageError::Timeout`].
#[derive(Debug, Clone)]
pub struct MySqlLinkStore {
    pool: MySqlPool,
    statement_timeout: Duration,
}

impl MySqlLinkStore {
    /// Creates a store from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool, statement_timeout: Duration) -> Self {
        Self {
            pool,
            statement_timeout,
        }
    }

    /// Opens a pool with the default [`MySqlStoreConfig`].
    pub async fn connect(database_url: &str) -> Result<Self> {
        Self::connect_with(database_url, &MySqlStoreConfig::default()).await
    }

    /// Opens a pool whose initial connect and later acquires give up after
    /// `config.acquire_timeout`.
    pub async fn connect_with(database_url: &str, config: &MySqlStoreConfig) -> Result<Self> {
        let connecting = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(database_url);

        let pool = match tokio::time::timeout(config.acquire_timeout, connecting).await {
            Ok(pool) => pool.map_err(map_sqlx_error)?,
            Err(_) => {
                warn!(timeout = ?config.acquire_timeout, "mysql connect timed out");
                return Err(StorageError::Timeout(format!(
                    "connect exceeded {:?}",
                    config.acquire_timeout
                )));
            }
        };

        Ok(Self::new(pool, config.statement_timeout))
    }

    /// Creates the `t_link` table when it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        self.timed("ensure_schema", sqlx::query(LINK_TABLE_DDL).execute(&self.pool))
            .await?
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    /// Runs one statement under the statement timeout. The outer error is the
    /// timeout; the inner result is the driver's own outcome.
    async fn timed<T, F>(
        &self,
        operation: &'static str,
        statement: F,
    ) -> Result<std::result::Result<T, sqlx::Error>>
    where
        F: Future<Output = std::result::Result<T, sqlx::Error>>,
    {
        tokio::time::timeout(self.statement_timeout, statement)
            .await
            .map_err(|_| {
                warn!(operation, timeout = ?self.statement_timeout, "mysql statement timed out");
                StorageError::Timeout(format!(
                    "{operation} exceeded {:?}",
                    self.statement_timeout
                ))
            })
    }
}

const LINK_COLUMNS: &str = "gid, domain, short_uri, full_short_url, origin_url, favicon, \
                            enable_status, del_flag, create_time";

fn now_unix_millis() -> i64 {
    Timestamp::now().as_millisecond()
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

fn row_to_link(row: &MySqlRow) -> Result<ShortLink> {
    let enable_status: i8 = row.try_get("enable_status").map_err(map_sqlx_error)?;
    let del_flag: i8 = row.try_get("del_flag").map_err(map_sqlx_error)?;
    let create_time: i64 = row.try_get("create_time").map_err(map_sqlx_error)?;

    Ok(ShortLink {
        gid: row.try_get("gid").map_err(map_sqlx_error)?,
        domain: row.try_get("domain").map_err(map_sqlx_error)?,
        short_uri: row.try_get("short_uri").map_err(map_sqlx_error)?,
        full_short_url: row.try_get("full_short_url").map_err(map_sqlx_error)?,
        origin_url: row.try_get("origin_url").map_err(map_sqlx_error)?,
        favicon: row.try_get("favicon").map_err(map_sqlx_error)?,
        enable_status: EnableStatus::try_from(enable_status).map_err(|value| {
            StorageError::InvalidData(format!("invalid enable_status '{value}'"))
        })?,
        del_flag: DelFlag::try_from(del_flag)
            .map_err(|value| StorageError::InvalidData(format!("invalid del_flag '{value}'")))?,
        create_time: Timestamp::from_millisecond(create_time).map_err(|e| {
            StorageError::InvalidData(format!("invalid create_time '{create_time}': {e}"))
        })?,
    })
}

#[async_trait]
impl ReadLinkStore for MySqlLinkStore {
    async fn get(&self, key: &LinkKey) -> Result<Option<ShortLink>> {
        let sql = format!(
            r#"
            SELECT {LINK_COLUMNS}
            FROM t_link
            WHERE gid = ?
              AND full_short_url = ?
              AND del_flag = 0
            LIMIT 1
            "#
        );
        let query = sqlx::query(&sql)
            .bind(&key.gid)
            .bind(&key.full_short_url)
            .fetch_optional(&self.pool);
        let row = self.timed("get", query).await?.map_err(map_sqlx_error)?;

        row.as_ref().map(row_to_link).transpose()
    }

    async fn find_enabled(&self, full_short_url: &str) -> Result<Option<ShortLink>> {
        let sql = format!(
            r#"
            SELECT {LINK_COLUMNS}
            FROM t_link
            WHERE full_short_url = ?
              AND enable_status = 1
              AND del_flag = 0
            LIMIT 1
            "#
        );
        let query = sqlx::query(&sql)
            .bind(full_short_url)
            .fetch_optional(&self.pool);
        let row = self
            .timed("find_enabled", query)
            .await?
            .map_err(map_sqlx_error)?;

        row.as_ref().map(row_to_link).transpose()
    }

    async fn page_by_status(
        &self,
        gid: &str,
        status: EnableStatus,
        page: PageRequest,
    ) -> Result<Page<ShortLink>> {
        let count = sqlx::query(
            r#"
            SELECT COUNT(*) AS total
            FROM t_link
            WHERE gid = ?
              AND enable_status = ?
              AND del_flag = 0
            "#,
        )
        .bind(gid)
        .bind(status.as_i8())
        .fetch_one(&self.pool);
        let total: i64 = self
            .timed("page_by_status.count", count)
            .await?
            .map_err(map_sqlx_error)?
            .try_get("total")
            .map_err(map_sqlx_error)?;

        let sql = format!(
            r#"
            SELECT {LINK_COLUMNS}
            FROM t_link
            WHERE gid = ?
              AND enable_status = ?
              AND del_flag = 0
            ORDER BY create_time DESC, full_short_url ASC
            LIMIT ? OFFSET ?
            "#
        );
        let select = sqlx::query(&sql)
            .bind(gid)
            .bind(status.as_i8())
            .bind(page.size)
            .bind(page.offset())
            .fetch_all(&self.pool);
        let rows = self
            .timed("page_by_status.select", select)
            .await?
            .map_err(map_sqlx_error)?;

        let records = rows.iter().map(row_to_link).collect::<Result<Vec<_>>>()?;
        Ok(Page::new(records, total.max(0) as u64, page))
    }
}

#[async_trait]
impl LinkStore for MySqlLinkStore {
    async fn insert(&self, link: ShortLink) -> Result<()> {
        let del_time = match link.del_flag {
            DelFlag::Active => 0,
            DelFlag::Deleted => now_unix_millis(),
        };

        let statement = sqlx::query(
            r#"
            INSERT INTO t_link (gid, domain, short_uri, full_short_url, origin_url, favicon,
                                enable_status, del_flag, del_time, create_time)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&link.gid)
        .bind(&link.domain)
        .bind(&link.short_uri)
        .bind(&link.full_short_url)
        .bind(&link.origin_url)
        .bind(&link.favicon)
        .bind(link.enable_status.as_i8())
        .bind(link.del_flag.as_i8())
        .bind(del_time)
        .bind(link.create_time.as_millisecond())
        .execute(&self.pool);

        match self.timed("insert", statement).await? {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => {
                Err(StorageError::Conflict(link.full_short_url))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn set_enable_status(
        &self,
        key: &LinkKey,
        expected: EnableStatus,
        new: EnableStatus,
    ) -> Result<u64> {
        trace!(key = %key, ?expected, ?new, "conditional enable_status update");

        let statement = sqlx::query(
            r#"
            UPDATE t_link
            SET enable_status = ?
            WHERE gid = ?
              AND full_short_url = ?
              AND enable_status = ?
              AND del_flag = 0
            "#,
        )
        .bind(new.as_i8())
        .bind(&key.gid)
        .bind(&key.full_short_url)
        .bind(expected.as_i8())
        .execute(&self.pool);
        let result = self
            .timed("set_enable_status", statement)
            .await?
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }

    async fn mark_deleted(&self, key: &LinkKey, expected: EnableStatus) -> Result<u64> {
        trace!(key = %key, ?expected, "conditional soft delete");

        let statement = sqlx::query(
            r#"
            UPDATE t_link
            SET del_flag = 1, del_time = ?
            WHERE gid = ?
              AND full_short_url = ?
              AND enable_status = ?
              AND del_flag = 0
            "#,
        )
        .bind(now_unix_millis())
        .bind(&key.gid)
        .bind(&key.full_short_url)
        .bind(expected.as_i8())
        .execute(&self.pool);
        let result = self
            .timed("mark_deleted", statement)
            .await?
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}
