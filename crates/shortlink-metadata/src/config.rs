use std::time::Duration;
use typed_builder::TypedBuilder;

#[derive(Debug, Clone, TypedBuilder)]
pub struct MetadataConfig {
    /// Deadline for establishing a connection.
    #[builder(default = Duration::from_secs(3))]
    pub connect_timeout: Duration,

    /// Deadline for a whole request, body included.
    #[builder(default = Duration::from_secs(5))]
    pub request_timeout: Duration,

    #[builder(default = String::from("Mozilla/5.0 (compatible; shortlink-metadata/0.1)"), setter(into))]
    pub user_agent: String,

    /// Probe `/favicon.ico` with a HEAD request when the page declares no icon.
    #[builder(default = true)]
    pub probe_favicon: bool,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
