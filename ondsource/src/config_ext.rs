//! Extension trait wiring catalog settings into `ondconfig`
//!
//! The credential can come from two places, in order:
//! 1. the `ONDES_CATALOG_CLIENT_ID` environment variable
//! 2. the `catalog.client_id` key of the configuration file

use ondconfig::Config;
use serde_yaml::Value;

use crate::models::{DEFAULT_LIMIT, DEFAULT_TAGS};

/// Environment variable overriding the configured catalog credential.
pub const ENV_CLIENT_ID: &str = "ONDES_CATALOG_CLIENT_ID";

/// Catalog-specific accessors over [`ondconfig::Config`].
pub trait CatalogConfigExt {
    /// Catalog credential, or `None` when not configured anywhere.
    fn get_catalog_client_id(&self) -> Option<String>;

    /// Stores the catalog credential in the configuration file.
    fn set_catalog_client_id(&self, client_id: &str) -> anyhow::Result<()>;

    /// Default tag set for catalog queries.
    fn get_catalog_tags(&self) -> Vec<String>;

    /// Default result limit for catalog queries.
    fn get_catalog_limit(&self) -> u32;
}

impl CatalogConfigExt for Config {
    fn get_catalog_client_id(&self) -> Option<String> {
        if let Ok(id) = std::env::var(ENV_CLIENT_ID) {
            if !id.trim().is_empty() {
                return Some(id);
            }
        }
        match self.get_value(&["catalog", "client_id"]) {
            Ok(Value::String(s)) if !s.trim().is_empty() => Some(s),
            _ => None,
        }
    }

    fn set_catalog_client_id(&self, client_id: &str) -> anyhow::Result<()> {
        self.set_value(
            &["catalog", "client_id"],
            Value::String(client_id.to_string()),
        )
    }

    fn get_catalog_tags(&self) -> Vec<String> {
        match self.get_value(&["catalog", "tags"]) {
            Ok(Value::Sequence(seq)) => {
                let tags: Vec<String> = seq
                    .into_iter()
                    .filter_map(|v| match v {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect();
                if tags.is_empty() {
                    DEFAULT_TAGS.iter().map(|t| t.to_string()).collect()
                } else {
                    tags
                }
            }
            _ => DEFAULT_TAGS.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn get_catalog_limit(&self) -> u32 {
        match self.get_value(&["catalog", "limit"]) {
            Ok(Value::Number(n)) => n.as_u64().map(|v| v as u32).unwrap_or(DEFAULT_LIMIT),
            _ => DEFAULT_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_client_id_roundtrip() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        // Default config ships an empty credential.
        if std::env::var(ENV_CLIENT_ID).is_err() {
            assert_eq!(config.get_catalog_client_id(), None);
        }
        config.set_catalog_client_id("abc123").unwrap();
        if std::env::var(ENV_CLIENT_ID).is_err() {
            assert_eq!(config.get_catalog_client_id(), Some("abc123".to_string()));
        }
    }

    #[test]
    fn test_tags_and_limit_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        let default_tags: Vec<String> = DEFAULT_TAGS.iter().map(|t| t.to_string()).collect();
        assert_eq!(config.get_catalog_tags(), default_tags);
        assert_eq!(config.get_catalog_limit(), DEFAULT_LIMIT);
    }
}
