//! Best-effort title and favicon lookup for target pages.

pub mod config;
pub mod error;
pub mod fetcher;
mod html;

pub use config::{MetadataConfig, MetadataConfigBuilder};
pub use error::MetadataError;
pub use fetcher::{HttpMetadataFetcher, DEFAULT_TITLE};
