use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Whether a link is live or parked in the recycle bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnableStatus {
    Recycled,
    Enabled,
}

impl EnableStatus {
    /// The persisted column value (`1` enabled, `0` recycled).
    pub fn as_i8(self) -> i8 {
        match self {
            EnableStatus::Recycled => 0,
            EnableStatus::Enabled => 1,
        }
    }
}

impl TryFrom<i8> for EnableStatus {
    type Error = i8;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(EnableStatus::Recycled),
            1 => Ok(EnableStatus::Enabled),
            other => Err(other),
        }
    }
}

/// Soft-delete marker. `Deleted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DelFlag {
    Active,
    Deleted,
}

impl DelFlag {
    /// The persisted column value (`0` active, `1` deleted).
    pub fn as_i8(self) -> i8 {
        match self {
            DelFlag::Active => 0,
            DelFlag::Deleted => 1,
        }
    }
}

impl TryFrom<i8> for DelFlag {
    type Error = i8;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(DelFlag::Active),
            1 => Ok(DelFlag::Deleted),
            other => Err(other),
        }
    }
}

/// Composite identity of a short link: the owning group plus the full short URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkKey {
    pub gid: String,
    pub full_short_url: String,
}

impl LinkKey {
    pub fn new(gid: impl Into<String>, full_short_url: impl Into<String>) -> Self {
        Self {
            gid: gid.into(),
            full_short_url: full_short_url.into(),
        }
    }
}

impl Display for LinkKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.full_short_url, self.gid)
    }
}

/// A stored short link and its lifecycle state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortLink {
    /// Owning group.
    pub gid: String,
    /// Domain the short link is served from, without scheme.
    pub domain: String,
    /// The token part of the short URL.
    pub short_uri: String,
    /// `domain + "/" + short_uri`; the cache key.
    pub full_short_url: String,
    /// Redirect target.
    pub origin_url: String,
    pub favicon: Option<String>,
    pub enable_status: EnableStatus,
    pub del_flag: DelFlag,
    pub create_time: Timestamp,
}

impl ShortLink {
    /// Creates an enabled, active link the way the creation flow stores it.
    pub fn enabled(
        gid: impl Into<String>,
        domain: impl Into<String>,
        short_uri: impl Into<String>,
        origin_url: impl Into<String>,
    ) -> Self {
        let domain = domain.into();
        let short_uri = short_uri.into();
        Self {
            gid: gid.into(),
            full_short_url: full_short_url(&domain, &short_uri),
            domain,
            short_uri,
            origin_url: origin_url.into(),
            favicon: None,
            enable_status: EnableStatus::Enabled,
            del_flag: DelFlag::Active,
            create_time: Timestamp::now(),
        }
    }

    pub fn key(&self) -> LinkKey {
        LinkKey::new(self.gid.clone(), self.full_short_url.clone())
    }

    /// A link may be redirected to iff it is enabled and not deleted.
    pub fn is_resolvable(&self) -> bool {
        self.enable_status == EnableStatus::Enabled && self.del_flag == DelFlag::Active
    }

    /// A link is listed in the recycle bin iff it is recycled and not deleted.
    pub fn is_in_recycle_bin(&self) -> bool {
        self.enable_status == EnableStatus::Recycled && self.del_flag == DelFlag::Active
    }
}

/// Joins a domain and a token into the full short URL used as the cache key.
pub fn full_short_url(domain: &str, short_uri: &str) -> String {
    format!(
        "{}/{}",
        domain.trim_end_matches('/'),
        short_uri.trim_start_matches('/')
    )
}
