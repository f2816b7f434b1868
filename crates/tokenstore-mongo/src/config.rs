//! MongoDB connection configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokenstore_core::{StoreError, StoreResult};

/// Connection parameters for the MongoDB backend.
///
/// # Example (TOML)
///
/// ```toml
/// [mongo]
/// url = "mongodb://localhost:27017"
/// database = "oauth2"
/// connect_timeout = "10s"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MongoConfig {
    /// Connection string.
    pub url: String,

    /// Database holding the token collections.
    pub database: String,

    /// Application name reported to the server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,

    /// Timeout for establishing connections and selecting a server.
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            url: "mongodb://localhost:27017".to_string(),
            database: "oauth2".to_string(),
            app_name: None,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl MongoConfig {
    /// Create a configuration for a connection string and database.
    #[must_use]
    pub fn new(url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            database: database.into(),
            ..Self::default()
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the URL or database name is unusable.
    pub fn validate(&self) -> StoreResult<()> {
        if !(self.url.starts_with("mongodb://") || self.url.starts_with("mongodb+srv://")) {
            return Err(StoreError::configuration(
                "mongo.url must start with mongodb:// or mongodb+srv://",
            ));
        }
        if self.database.trim().is_empty() {
            return Err(StoreError::configuration("mongo.database must not be empty"));
        }
        if self.connect_timeout.is_zero() {
            return Err(StoreError::configuration(
                "mongo.connect_timeout must be greater than zero",
            ));
        }
        Ok(())
    }
}
