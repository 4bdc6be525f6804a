//! Connection configuration
//!
//! Backends are configured through the query string of their connection URI:
//!
//! ```text
//! sqlite://?dsn=/data/places.db
//! sqlite://?dsn=:memory:
//! sqlite://?dsn=places.db&wal=false
//! ```

use url::Url;

use crate::error::{Result, StoreError};

/// DSN that opens a private in-memory database
pub const MEMORY_DSN: &str = ":memory:";

/// Configuration for a SQLite-backed database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteConfig {
    /// Data source: a file path, a `file:` URI or `:memory:`
    pub dsn: String,

    /// Use write-ahead logging (ignored for in-memory databases)
    pub wal: bool,
}

impl SqliteConfig {
    /// Configuration for a given data source with default options
    pub fn new(dsn: impl Into<String>) -> Self {
        Self {
            dsn: dsn.into(),
            wal: true,
        }
    }

    /// Private in-memory database
    pub fn in_memory() -> Self {
        Self::new(MEMORY_DSN)
    }

    /// Extract the configuration from a connection URI
    ///
    /// Fails before any I/O when `dsn` is absent or empty.
    pub fn from_url(url: &Url) -> Result<Self> {
        let mut dsn = None;
        let mut wal = true;

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "dsn" => dsn = Some(value.into_owned()),
                "wal" => wal = parse_bool("wal", &value)?,
                _ => {}
            }
        }

        let dsn = dsn
            .filter(|d| !d.is_empty())
            .ok_or_else(|| StoreError::InvalidConfiguration("Missing 'dsn' parameter".to_string()))?;

        Ok(Self { dsn, wal })
    }

    /// Parse a connection URI string and extract the configuration
    pub fn from_uri(uri: &str) -> Result<Self> {
        let url = Url::parse(uri)
            .map_err(|e| StoreError::InvalidConfiguration(format!("Invalid URI '{}': {}", uri, e)))?;
        Self::from_url(&url)
    }

    pub fn is_memory(&self) -> bool {
        self.dsn == MEMORY_DSN
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(StoreError::InvalidConfiguration(format!(
            "Invalid value for '{}': {}",
            key, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dsn_extracted() {
        let config = SqliteConfig::from_uri("sqlite://?dsn=/tmp/places.db").unwrap();
        assert_eq!(config.dsn, "/tmp/places.db");
        assert!(config.wal);
        assert!(!config.is_memory());
    }

    #[test]
    fn test_memory_dsn() {
        let config = SqliteConfig::from_uri("sqlite://?dsn=:memory:").unwrap();
        assert!(config.is_memory());
    }

    #[test]
    fn test_missing_dsn() {
        let err = SqliteConfig::from_uri("sqlite://").unwrap_err();
        assert!(matches!(err, StoreError::InvalidConfiguration(_)));

        let err = SqliteConfig::from_uri("sqlite://?dsn=").unwrap_err();
        assert!(matches!(err, StoreError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_wal_option() {
        let config = SqliteConfig::from_uri("sqlite://?dsn=x.db&wal=false").unwrap();
        assert!(!config.wal);

        let err = SqliteConfig::from_uri("sqlite://?dsn=x.db&wal=maybe").unwrap_err();
        assert!(matches!(err, StoreError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_percent_encoded_dsn() {
        let config = SqliteConfig::from_uri("sqlite://?dsn=%2Fdata%2Fmy%20places.db").unwrap();
        assert_eq!(config.dsn, "/data/my places.db");
    }
}
