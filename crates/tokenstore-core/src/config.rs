//! Collection layout configuration.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::record::RecordKind;
use crate::{StoreError, StoreResult};

/// Collection names and TTL settings used by a token store.
///
/// # Example (TOML)
///
/// ```toml
/// [tokens]
/// basic_collection = "oauth2_basic"
/// access_collection = "oauth2_access"
/// refresh_collection = "oauth2_refresh"
/// expire_after = "1s"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Transaction collection. Reserved, no operation reads or writes it.
    pub txn_collection: String,

    /// Collection holding token payloads.
    pub basic_collection: String,

    /// Collection mapping access tokens to payloads.
    pub access_collection: String,

    /// Collection mapping refresh tokens to payloads.
    pub refresh_collection: String,

    /// Grace period after a record's expiry before the TTL index purges it.
    #[serde(with = "humantime_serde")]
    pub expire_after: Duration,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            txn_collection: "oauth2_txn".to_string(),
            basic_collection: "oauth2_basic".to_string(),
            access_collection: "oauth2_access".to_string(),
            refresh_collection: "oauth2_refresh".to_string(),
            expire_after: Duration::from_secs(1),
        }
    }
}

impl TokenConfig {
    /// Collection name for a record kind.
    #[must_use]
    pub fn collection(&self, kind: RecordKind) -> &str {
        match kind {
            RecordKind::Basic => &self.basic_collection,
            RecordKind::Access => &self.access_collection,
            RecordKind::Refresh => &self.refresh_collection,
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a collection name is empty or if two
    /// record kinds share a collection.
    pub fn validate(&self) -> StoreResult<()> {
        let mut seen = HashSet::new();
        for kind in RecordKind::ALL {
            let name = self.collection(kind);
            if name.trim().is_empty() {
                return Err(StoreError::configuration(format!(
                    "{kind} collection name must not be empty"
                )));
            }
            if !seen.insert(name) {
                return Err(StoreError::configuration(format!(
                    "collection '{name}' is used for more than one record kind"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TokenConfig::default();
        assert_eq!(config.txn_collection, "oauth2_txn");
        assert_eq!(config.collection(RecordKind::Basic), "oauth2_basic");
        assert_eq!(config.collection(RecordKind::Access), "oauth2_access");
        assert_eq!(config.collection(RecordKind::Refresh), "oauth2_refresh");
        assert_eq!(config.expire_after, Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config: TokenConfig = serde_json::from_str(
            r#"{"access_collection": "tenant_access", "expire_after": "30s"}"#,
        )
        .unwrap();
        assert_eq!(config.access_collection, "tenant_access");
        assert_eq!(config.basic_collection, "oauth2_basic");
        assert_eq!(config.expire_after, Duration::from_secs(30));
    }

    #[test]
    fn test_empty_name_rejected() {
        let config = TokenConfig {
            refresh_collection: " ".to_string(),
            ..TokenConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("refresh collection"));
    }

    #[test]
    fn test_shared_collection_rejected() {
        let config = TokenConfig {
            access_collection: "oauth2_basic".to_string(),
            ..TokenConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
