use thiserror::Error;

/// Failure to set up a fetcher. Fetching itself never fails.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
