//! HTTP client for the track catalog API
//!
//! # Example
//!
//! ```no_run
//! use ondsource::{CatalogClient, TrackQuery};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CatalogClient::builder()
//!         .client_id("my-client-id")
//!         .build()?;
//!
//!     let tracks = client.fetch_tracks(&TrackQuery::default()).await?;
//!     println!("Fetched {} tracks", tracks.len());
//!     Ok(())
//! }
//! ```

use crate::error::{Error, Result};
use crate::models::{CatalogResponse, Track, TrackQuery};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Default catalog base URL
pub const DEFAULT_BASE_URL: &str = "https://api.jamendo.com/v3.0";

/// Default timeout for HTTP requests (30 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent
pub const DEFAULT_USER_AGENT: &str = "Ondes/0.1 (ondsource)";

/// Fixed result ordering requested from the catalog
const ORDER: &str = "popularity_total";

/// Catalog HTTP client
///
/// The client is stateless and does not cache responses internally; the
/// playback engine decides when to re-query and which result set to adopt.
/// Cancellation is the caller's concern: abandoning the returned future (or
/// aborting the task driving it) discards the request without side effects.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: String,
    client_id: Option<String>,
}

impl CatalogClient {
    /// Create a client with the given credential and default settings
    pub fn new(client_id: impl Into<String>) -> Result<Self> {
        Self::builder().client_id(client_id).build()
    }

    /// Create a builder for configuring the client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Create a client from the global configuration.
    ///
    /// The credential is resolved through [`CatalogConfigExt`]; a missing
    /// credential is not an error here — it surfaces as
    /// [`Error::MissingClientId`] on the first fetch.
    ///
    /// [`CatalogConfigExt`]: crate::config_ext::CatalogConfigExt
    #[cfg(feature = "ondconfig")]
    pub fn from_config(config: &ondconfig::Config) -> Result<Self> {
        use crate::config_ext::CatalogConfigExt;

        let mut builder = Self::builder();
        if let Some(client_id) = config.get_catalog_client_id() {
            builder = builder.client_id(client_id);
        }
        builder.build()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch an ordered list of playable tracks matching `query`.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingClientId`] when no credential is configured (checked
    ///   before any request goes out)
    /// - [`Error::Status`] when the catalog answers with a non-success status
    /// - [`Error::Http`] / [`Error::Json`] for transport and decode failures
    pub async fn fetch_tracks(&self, query: &TrackQuery) -> Result<Vec<Track>> {
        let client_id = self
            .client_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(Error::MissingClientId)?;

        let mut url = Url::parse(&format!("{}/tracks/", self.base_url))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("client_id", client_id)
                .append_pair("format", "json")
                .append_pair("limit", &query.limit.to_string())
                .append_pair("audioformat", query.encoding.as_str())
                .append_pair("order", ORDER);

            let tags = query.effective_tags();
            if !tags.is_empty() {
                pairs.append_pair("fuzzytags", &tags.join(","));
            }
            if let Some(search) = query.effective_search() {
                pairs.append_pair("search", search);
            }
        }

        tracing::debug!(url = %redact_client_id(&url), "Fetching catalog tracks");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let parsed: CatalogResponse = serde_json::from_str(&body)?;

        tracing::debug!(count = parsed.results.len(), "Catalog returned tracks");
        Ok(parsed.results.into_iter().map(Track::from).collect())
    }
}

/// Builder for [`CatalogClient`]
#[derive(Debug, Default)]
pub struct ClientBuilder {
    base_url: Option<String>,
    client_id: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    client: Option<Client>,
}

impl ClientBuilder {
    /// Override the catalog base URL (useful for tests)
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the catalog credential
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Override the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Use a pre-built `reqwest::Client` (shared connection pool, proxies)
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<CatalogClient> {
        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .user_agent(
                    self.user_agent
                        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
                )
                .timeout(
                    self.timeout
                        .unwrap_or(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)),
                )
                .build()?,
        };

        Ok(CatalogClient {
            client,
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            client_id: self.client_id,
        })
    }
}

/// Replaces the credential with a placeholder for logging.
fn redact_client_id(url: &Url) -> String {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            if k == "client_id" {
                (k.into_owned(), "***".to_string())
            } else {
                (k.into_owned(), v.into_owned())
            }
        })
        .collect();
    redacted
        .query_pairs_mut()
        .clear()
        .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    redacted.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let client = CatalogClient::builder().build().unwrap();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_builder_trims_trailing_slash() {
        let client = CatalogClient::builder()
            .base_url("http://localhost:9999/")
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "http://localhost:9999");
    }

    #[tokio::test]
    async fn test_missing_client_id_fails_before_request() {
        // Point at a closed port: the credential check must fire first.
        let client = CatalogClient::builder()
            .base_url("http://127.0.0.1:1")
            .build()
            .unwrap();
        let err = client
            .fetch_tracks(&TrackQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingClientId));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_redact_client_id() {
        let url =
            Url::parse("http://x.test/tracks/?client_id=secret&limit=5").unwrap();
        let redacted = redact_client_id(&url);
        assert!(!redacted.contains("secret"));
        assert!(redacted.contains("limit=5"));
    }
}
