use shortlink_core::StorageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResolveError>;

#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ResolveError {
    pub fn is_unavailable(&self) -> bool {
        match self {
            ResolveError::Storage(e) => e.is_unavailable(),
        }
    }
}
