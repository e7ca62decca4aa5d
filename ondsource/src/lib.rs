//! Track source provider for the Ondes playback engine
//!
//! This crate resolves everything the engine can play:
//!
//! - **Catalog tracks**: an HTTP client for the external music catalog,
//!   queried by tags, free-text search, result limit and encoding
//!   preference. Response mapping is shape-tolerant (string-or-number ids,
//!   cover-art field aliases) and confined to the model layer.
//! - **Live stations**: a static, code-defined table of stations, each with
//!   an ordered list of quality variants.
//!
//! # Example
//!
//! ```no_run
//! use ondsource::{CatalogClient, TrackQuery, default_stations};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CatalogClient::new("my-client-id")?;
//!     let tracks = client
//!         .fetch_tracks(&TrackQuery::search("ambient").with_limit(20))
//!         .await?;
//!     println!("{} tracks", tracks.len());
//!
//!     for station in default_stations() {
//!         println!("{} ({} streams)", station.name, station.streams.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Errors
//!
//! A missing credential is a configuration problem
//! ([`Error::MissingClientId`]), detected before any request goes out.
//! Network failures and non-success statuses mean the catalog is
//! unavailable; both are plain values for the engine to surface as an error
//! state, never panics.

pub mod client;
pub mod error;
pub mod models;
pub mod source;
pub mod stations;

#[cfg(feature = "ondconfig")]
pub mod config_ext;

// Re-exports
pub use client::{CatalogClient, ClientBuilder, DEFAULT_BASE_URL};
pub use error::{Error, Result};
pub use models::{AudioEncoding, Track, TrackQuery, DEFAULT_LIMIT, DEFAULT_TAGS};
pub use source::TrackSource;
pub use stations::{default_stations, find_station, Station, StreamVariant};

#[cfg(feature = "ondconfig")]
pub use config_ext::CatalogConfigExt;
