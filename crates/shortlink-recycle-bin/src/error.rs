use shortlink_core::StorageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RecycleBinError>;

#[derive(Debug, Clone, Error)]
pub enum RecycleBinError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl RecycleBinError {
    pub fn is_unavailable(&self) -> bool {
        match self {
            RecycleBinError::Storage(e) => e.is_unavailable(),
        }
    }
}
