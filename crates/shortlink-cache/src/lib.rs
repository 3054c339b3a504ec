//! Resolution cache implementations.

pub mod moka;
pub mod redis;
pub mod timeout;

pub use self::moka::{MokaCacheConfig, MokaLinkCache};
pub use self::redis::RedisLinkCache;
pub use shortlink_core::cache::{CacheEntry, LinkCache, Result};
pub use shortlink_core::CacheError;
pub use timeout::TimeoutCache;
