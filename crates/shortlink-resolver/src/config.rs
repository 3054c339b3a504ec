use std::time::Duration;
use typed_builder::TypedBuilder;

const DEFAULT_POSITIVE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const DEFAULT_NEGATIVE_TTL: Duration = Duration::from_secs(30 * 60);

/// TTLs the resolver writes cache entries with.
///
/// The negative TTL should be much shorter than the positive one: it bounds
/// how long a link restored behind the coordinator's back stays unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TypedBuilder)]
pub struct ResolverConfig {
    /// TTL of a cached redirect target.
    #[builder(default = DEFAULT_POSITIVE_TTL)]
    pub positive_ttl: Duration,

    /// TTL of a cached "known absent" marker.
    #[builder(default = DEFAULT_NEGATIVE_TTL)]
    pub negative_ttl: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
