//! Error types for the track source provider

/// Result type alias for source operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when resolving tracks from the catalog
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Required catalog credential is absent
    #[error("catalog client id is not configured")]
    MissingClientId,

    /// Catalog returned a non-success HTTP status
    #[error("catalog returned HTTP {0}")]
    Status(u16),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// True for errors meaning the upstream catalog is unreachable or
    /// misbehaving (as opposed to a local configuration problem).
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Error::Status(_) | Error::Http(_) | Error::Json(_))
    }

    /// True when the error is a missing credential.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::MissingClientId)
    }
}
