use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use shortlink_core::ShortLink;

/// A recycled link as listed to its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecycleBinEntry {
    pub gid: String,
    pub full_short_url: String,
    pub origin_url: String,
    /// Always carries a scheme.
    pub domain: String,
    pub favicon: Option<String>,
    pub create_time: Timestamp,
}

fn with_scheme(domain: &str) -> String {
    if domain.starts_with("http://") || domain.starts_with("https://") {
        domain.to_string()
    } else {
        format!("http://{domain}")
    }
}

impl From<ShortLink> for RecycleBinEntry {
    fn from(link: ShortLink) -> Self {
        Self {
            domain: with_scheme(&link.domain),
            gid: link.gid,
            full_short_url: link.full_short_url,
            origin_url: link.origin_url,
            favicon: link.favicon,
            create_time: link.create_time,
        }
    }
}
