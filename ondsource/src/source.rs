//! Common trait for anything that can resolve playable tracks

use crate::client::CatalogClient;
use crate::error::Result;
use crate::models::{Track, TrackQuery};
use async_trait::async_trait;

/// A provider of playable tracks.
///
/// Implementations perform I/O at the boundary and nothing else: they return
/// data for the caller to adopt and never mutate shared state. Callers may
/// abandon an in-flight `fetch_tracks` (by dropping the future or aborting
/// the task driving it); implementations must not leave side effects behind
/// in that case.
#[async_trait]
pub trait TrackSource: Send + Sync {
    /// Human-readable provider name, for logs.
    fn name(&self) -> &str;

    /// Resolve an ordered list of tracks matching `query`.
    async fn fetch_tracks(&self, query: &TrackQuery) -> Result<Vec<Track>>;
}

#[async_trait]
impl TrackSource for CatalogClient {
    fn name(&self) -> &str {
        "catalog"
    }

    async fn fetch_tracks(&self, query: &TrackQuery) -> Result<Vec<Track>> {
        CatalogClient::fetch_tracks(self, query).await
    }
}
