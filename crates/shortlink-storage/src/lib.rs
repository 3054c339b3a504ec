//! Link store implementations.

pub mod memory;
pub mod mysql;

pub use memory::InMemoryLinkStore;
pub use mysql::{MySqlLinkStore, MySqlStoreConfig};
pub use shortlink_core::store::{LinkStore, ReadLinkStore, Result};
pub use shortlink_core::StorageError;
