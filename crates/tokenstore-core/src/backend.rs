//! Document database backend trait.
//!
//! A backend stores keyed documents in named collections and must provide an
//! expiring index: once a record's `expires_at` (plus the configured grace
//! period) has passed, the backend removes it on its own schedule. The token
//! store relies on this and never deletes expired records itself.
//!
//! # Implementations
//!
//! - `tokenstore-memory` - in-process backend emulating TTL expiry
//! - `tokenstore-mongo` - MongoDB backend using native TTL indexes

use std::time::Duration;

use async_trait::async_trait;

use crate::StoreResult;
use crate::record::{BasicRecord, ReferenceRecord};

/// Storage operations the token store needs from a document database.
///
/// All operations are independent round-trips. No operation is atomic with
/// respect to another, and backends must not add retries.
#[async_trait]
pub trait RecordBackend: Send + Sync {
    /// Declares an ascending TTL index on the expiry field of a collection.
    ///
    /// Must be idempotent: declaring the same index again succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be created.
    async fn ensure_expiry_index(
        &self,
        collection: &str,
        index_name: &str,
        expire_after: Duration,
    ) -> StoreResult<()>;

    /// Inserts a payload record.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if a record with the same key exists, or a backend
    /// error if the write fails.
    async fn insert_basic(&self, collection: &str, record: &BasicRecord) -> StoreResult<()>;

    /// Inserts a reference record.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if a record with the same key exists, or a backend
    /// error if the write fails.
    async fn insert_reference(&self, collection: &str, record: &ReferenceRecord)
    -> StoreResult<()>;

    /// Finds a payload record by key.
    ///
    /// # Returns
    ///
    /// Returns `None` if no record exists (including records already purged
    /// by expiry).
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    async fn find_basic(&self, collection: &str, id: &str) -> StoreResult<Option<BasicRecord>>;

    /// Finds a reference record by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    async fn find_reference(
        &self,
        collection: &str,
        id: &str,
    ) -> StoreResult<Option<ReferenceRecord>>;

    /// Deletes the record with the given key.
    ///
    /// # Returns
    ///
    /// Returns the number of records deleted (0 when the key was absent).
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<u64>;

    /// Releases the underlying connection.
    ///
    /// # Errors
    ///
    /// Returns an error if shutdown fails.
    async fn close(&self) -> StoreResult<()>;
}
