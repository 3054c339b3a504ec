use crate::config::MetadataConfig;
use crate::error::MetadataError;
use crate::html::{extract_icon, extract_title};
use async_trait::async_trait;
use reqwest::Client;
use shortlink_core::{LinkMetadata, MetadataFetcher};
use tracing::{debug, trace, warn};
use url::Url;

/// Title used whenever a page cannot be fetched or has no usable `<title>`.
pub const DEFAULT_TITLE: &str = "Unknown website";

const FALLBACK_FAVICON_HOST: &str = "default";

fn fallback_favicon(host: &str) -> String {
    format!("https://www.google.com/s2/favicons?domain={host}&sz=64")
}

/// Trims `raw` and prefixes `https://` when it carries no scheme.
fn normalize_url(raw: &str) -> Option<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    Url::parse(&candidate)
        .ok()
        .filter(|url| url.host_str().is_some_and(|host| !host.is_empty()))
}

/// Scrapes a target page over HTTP for its title and favicon.
///
/// Every failure degrades to a default value; see [`MetadataFetcher`].
#[derive(Debug, Clone)]
pub struct HttpMetadataFetcher {
    client: Client,
    probe_favicon: bool,
}

impl HttpMetadataFetcher {
    pub fn new(config: MetadataConfig) -> Result<Self, MetadataError> {
        let client = Client::builder()
            .user_agent(config.user_agent)
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            probe_favicon: config.probe_favicon,
        })
    }

    async fn fetch_page(&self, url: &Url) -> Option<(Url, String)> {
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %url, error = %e, "failed to fetch page");
                return None;
            }
        };
        // Error pages still carry a usable title.
        if !response.status().is_success() {
            debug!(url = %url, status = %response.status(), "reading body of non-success page");
        }
        let final_url = response.url().clone();
        match response.text().await {
            Ok(body) => Some((final_url, body)),
            Err(e) => {
                warn!(url = %url, error = %e, "failed to read page body");
                None
            }
        }
    }

    /// `{origin}/favicon.ico` if a HEAD request for it succeeds.
    async fn probe_favicon_ico(&self, url: &Url) -> Option<String> {
        if !self.probe_favicon {
            return None;
        }
        let candidate = url.join("/favicon.ico").ok()?;
        match self.client.head(candidate.clone()).send().await {
            Ok(response) if response.status().is_success() => Some(candidate.into()),
            Ok(response) => {
                trace!(url = %candidate, status = %response.status(), "no favicon.ico");
                None
            }
            Err(e) => {
                trace!(url = %candidate, error = %e, "favicon.ico probe failed");
                None
            }
        }
    }
}

#[async_trait]
impl MetadataFetcher for HttpMetadataFetcher {
    async fn fetch_metadata(&self, raw_url: &str) -> LinkMetadata {
        let Some(url) = normalize_url(raw_url) else {
            debug!(url = raw_url, "unusable url, returning defaults");
            return LinkMetadata {
                title: DEFAULT_TITLE.to_string(),
                favicon_url: fallback_favicon(FALLBACK_FAVICON_HOST),
            };
        };

        let page = self.fetch_page(&url).await;
        let base = page.as_ref().map_or(&url, |(final_url, _)| final_url);

        let title = page
            .as_ref()
            .and_then(|(_, html)| extract_title(html))
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        let declared_icon = page.as_ref().and_then(|(final_url, html)| extract_icon(html, final_url));
        let favicon_url = match declared_icon {
            Some(icon) => icon,
            None => match self.probe_favicon_ico(base).await {
                Some(icon) => icon,
                None => fallback_favicon(base.host_str().unwrap_or(FALLBACK_FAVICON_HOST)),
            },
        };

        debug!(url = %url, title = %title, favicon_url = %favicon_url, "fetched page metadata");
        LinkMetadata { title, favicon_url }
    }
}
