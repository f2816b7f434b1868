//! Token storage trait and its record-based implementation.
//!
//! [`TokenStore`] is the interface an OAuth 2.0 server calls to persist and
//! look up issued grants. [`TokenRecordStore`] implements it on top of any
//! [`RecordBackend`] using three record sets (basic, access, refresh).
//!
//! # Consistency
//!
//! `create` performs up to five independent writes and is not atomic. A failure
//! part way through leaves the records already written in place; they are not
//! rolled back and disappear through TTL expiry. Concurrent readers may observe
//! a reference record before the basic record it points at is visible, which
//! reads as "not found".

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::backend::RecordBackend;
use crate::config::TokenConfig;
use crate::expiry::ExpiryPlan;
use crate::record::{BasicRecord, RecordKind, ReferenceRecord, generate_basic_id};
use crate::token::{Token, TokenInfo};
use crate::{StoreError, StoreResult};

/// Storage trait for issued OAuth 2.0 grants.
///
/// Lookups return `Ok(None)` for unknown or expired keys. Removals delete only
/// the record addressed by the key and never cascade.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Stores a newly issued grant.
    ///
    /// # Errors
    ///
    /// Returns a serialization error before any write if the token cannot be
    /// encoded, or the first backend error encountered while writing.
    async fn create(&self, info: &dyn TokenInfo) -> StoreResult<()>;

    /// Deletes the payload record keyed by an authorization code.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend delete fails.
    async fn remove_by_code(&self, code: &str) -> StoreResult<()>;

    /// Deletes the reference record of an access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend delete fails.
    async fn remove_by_access(&self, access: &str) -> StoreResult<()>;

    /// Deletes the reference record of a refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend delete fails.
    async fn remove_by_refresh(&self, refresh: &str) -> StoreResult<()>;

    /// Looks up a grant by authorization code.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or the payload cannot be decoded.
    async fn get_by_code(&self, code: &str) -> StoreResult<Option<Token>>;

    /// Looks up a grant by access token.
    ///
    /// # Errors
    ///
    /// Returns an error if a read fails or the payload cannot be decoded.
    async fn get_by_access(&self, access: &str) -> StoreResult<Option<Token>>;

    /// Looks up a grant by refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error if a read fails or the payload cannot be decoded.
    async fn get_by_refresh(&self, refresh: &str) -> StoreResult<Option<Token>>;
}

// =============================================================================
// Record Store
// =============================================================================

/// Token store persisting grants as basic, access and refresh records.
///
/// The store owns the backend handle (a connection or pool) and shares it
/// across all concurrent calls. Call [`close`](Self::close) on shutdown.
#[derive(Debug)]
pub struct TokenRecordStore<B> {
    backend: B,
    config: TokenConfig,
}

impl<B: RecordBackend> TokenRecordStore<B> {
    /// Create a store and declare the TTL index on each collection.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an invalid layout, or an
    /// `Initialization` error if an index cannot be created. Callers should
    /// abort startup in that case.
    pub async fn new(backend: B, config: TokenConfig) -> StoreResult<Self> {
        config.validate()?;

        for kind in RecordKind::ALL {
            let collection = config.collection(kind);
            backend
                .ensure_expiry_index(collection, &kind.expiry_index_name(), config.expire_after)
                .await
                .map_err(|e| StoreError::initialization(collection, e.to_string()))?;
        }

        info!(
            basic = %config.basic_collection,
            access = %config.access_collection,
            refresh = %config.refresh_collection,
            expire_after = ?config.expire_after,
            "Token store initialized"
        );

        Ok(Self { backend, config })
    }

    /// Create a store with the default collection layout.
    ///
    /// # Errors
    ///
    /// See [`TokenRecordStore::new`].
    pub async fn with_defaults(backend: B) -> StoreResult<Self> {
        Self::new(backend, TokenConfig::default()).await
    }

    /// Get a reference to the backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Get the collection layout.
    #[must_use]
    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Release the backend connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to shut down.
    pub async fn close(&self) -> StoreResult<()> {
        self.backend.close().await
    }

    fn collection(&self, kind: RecordKind) -> &str {
        self.config.collection(kind)
    }

    async fn write_reference(
        &self,
        kind: RecordKind,
        token: &str,
        basic_id: &str,
        expires_at: time::OffsetDateTime,
    ) -> StoreResult<()> {
        let record = ReferenceRecord {
            id: token.to_string(),
            basic_id: basic_id.to_string(),
            expires_at,
        };
        self.backend
            .insert_reference(self.collection(kind), &record)
            .await?;
        debug!(kind = %kind, basic_id, %expires_at, "Stored reference record");
        Ok(())
    }

    async fn load_basic(&self, id: &str) -> StoreResult<Option<Token>> {
        let Some(record) = self
            .backend
            .find_basic(self.collection(RecordKind::Basic), id)
            .await?
        else {
            return Ok(None);
        };
        Ok(Some(Token::from_payload(&record.data)?))
    }

    async fn resolve(&self, kind: RecordKind, token: &str) -> StoreResult<Option<Token>> {
        let Some(reference) = self
            .backend
            .find_reference(self.collection(kind), token)
            .await?
        else {
            debug!(kind = %kind, "Reference record not found");
            return Ok(None);
        };

        let found = self.load_basic(&reference.basic_id).await?;
        if found.is_none() {
            warn!(
                kind = %kind,
                basic_id = %reference.basic_id,
                "Reference points at a missing basic record"
            );
        }
        Ok(found)
    }

    async fn remove(&self, kind: RecordKind, key: &str) -> StoreResult<()> {
        let deleted = self.backend.delete(self.collection(kind), key).await?;
        debug!(kind = %kind, deleted, "Removed record");
        Ok(())
    }
}

#[async_trait]
impl<B: RecordBackend> TokenStore for TokenRecordStore<B> {
    async fn create(&self, info: &dyn TokenInfo) -> StoreResult<()> {
        let token = Token::from_info(info);
        let data = token.to_payload()?;
        let plan = ExpiryPlan::for_token(&token)?;
        let basic = self.collection(RecordKind::Basic);

        if let (Some(code), Some(expires_at)) = (token.code(), plan.code) {
            let record = BasicRecord {
                id: code.to_string(),
                data: data.clone(),
                expires_at,
            };
            self.backend.insert_basic(basic, &record).await?;
            debug!(%expires_at, "Stored code record");
        }

        let access = token.access();
        let refresh = token.refresh();
        if access.is_none() && refresh.is_none() {
            return Ok(());
        }

        let basic_id = generate_basic_id();
        let record = BasicRecord {
            id: basic_id.clone(),
            data,
            expires_at: plan.basic,
        };
        self.backend.insert_basic(basic, &record).await?;
        debug!(basic_id = %basic_id, expires_at = %plan.basic, "Stored token record");

        if let Some(access) = access {
            self.write_reference(RecordKind::Access, access, &basic_id, plan.access)
                .await?;
        }

        if let (Some(refresh), Some(expires_at)) = (refresh, plan.refresh) {
            self.write_reference(RecordKind::Refresh, refresh, &basic_id, expires_at)
                .await?;
        }

        Ok(())
    }

    async fn remove_by_code(&self, code: &str) -> StoreResult<()> {
        self.remove(RecordKind::Basic, code).await
    }

    async fn remove_by_access(&self, access: &str) -> StoreResult<()> {
        self.remove(RecordKind::Access, access).await
    }

    async fn remove_by_refresh(&self, refresh: &str) -> StoreResult<()> {
        self.remove(RecordKind::Refresh, refresh).await
    }

    async fn get_by_code(&self, code: &str) -> StoreResult<Option<Token>> {
        self.load_basic(code).await
    }

    async fn get_by_access(&self, access: &str) -> StoreResult<Option<Token>> {
        self.resolve(RecordKind::Access, access).await
    }

    async fn get_by_refresh(&self, refresh: &str) -> StoreResult<Option<Token>> {
        self.resolve(RecordKind::Refresh, refresh).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;

    /// Backend that records index declarations and rejects one collection.
    #[derive(Debug, Default)]
    struct IndexOnlyBackend {
        reject: Option<String>,
        declared: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl RecordBackend for IndexOnlyBackend {
        async fn ensure_expiry_index(
            &self,
            collection: &str,
            index_name: &str,
            _expire_after: Duration,
        ) -> StoreResult<()> {
            if self.reject.as_deref() == Some(collection) {
                return Err(StoreError::backend("index build failed"));
            }
            self.declared
                .lock()
                .unwrap()
                .push((collection.to_string(), index_name.to_string()));
            Ok(())
        }

        async fn insert_basic(&self, _: &str, _: &BasicRecord) -> StoreResult<()> {
            Ok(())
        }

        async fn insert_reference(&self, _: &str, _: &ReferenceRecord) -> StoreResult<()> {
            Ok(())
        }

        async fn find_basic(&self, _: &str, _: &str) -> StoreResult<Option<BasicRecord>> {
            Ok(None)
        }

        async fn find_reference(&self, _: &str, _: &str) -> StoreResult<Option<ReferenceRecord>> {
            Ok(None)
        }

        async fn delete(&self, _: &str, _: &str) -> StoreResult<u64> {
            Ok(0)
        }

        async fn close(&self) -> StoreResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_new_declares_index_per_collection() {
        let store = TokenRecordStore::with_defaults(IndexOnlyBackend::default())
            .await
            .unwrap();

        let declared = store.backend().declared.lock().unwrap().clone();
        assert_eq!(
            declared,
            vec![
                ("oauth2_basic".to_string(), "basic_expired_at_ttl".to_string()),
                ("oauth2_access".to_string(), "access_expired_at_ttl".to_string()),
                ("oauth2_refresh".to_string(), "refresh_expired_at_ttl".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_index_failure_is_initialization_error() {
        let backend = IndexOnlyBackend {
            reject: Some("oauth2_access".to_string()),
            ..IndexOnlyBackend::default()
        };
        let err = TokenRecordStore::with_defaults(backend).await.unwrap_err();

        assert!(err.is_initialization_error());
        assert!(err.to_string().contains("oauth2_access"));
    }

    #[tokio::test]
    async fn test_invalid_layout_rejected_before_indexing() {
        let config = TokenConfig {
            basic_collection: String::new(),
            ..TokenConfig::default()
        };
        let err = TokenRecordStore::new(IndexOnlyBackend::default(), config)
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Configuration(_)));
    }
}
