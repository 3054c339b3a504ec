//! Recycle-bin lifecycle transitions for short links.
//!
//! Every transition follows the same two steps: a conditional update in the
//! link store, then an unconditional invalidation of the link's cache
//! entries. The store write always comes first, so a concurrent resolver
//! can at worst re-populate the cache from the already-committed state.

pub mod entry;
pub mod error;
pub mod service;

pub use entry::RecycleBinEntry;
pub use error::{RecycleBinError, Result};
pub use service::{RecycleBin, RecycleBinService, Transition};
