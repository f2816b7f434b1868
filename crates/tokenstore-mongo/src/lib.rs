//! MongoDB record backend for tokenstore.
//!
//! Records live in three collections, each with a TTL index on `ExpiredAt`
//! so the server removes them once they expire.
//!
//! # Example
//!
//! ```ignore
//! use tokenstore_core::{TokenConfig, TokenStore};
//! use tokenstore_mongo::{MongoConfig, connect_store};
//!
//! let store = connect_store(&MongoConfig::default(), TokenConfig::default()).await?;
//! store.create(&token).await?;
//! ```

pub mod backend;
pub mod config;
pub mod document;

pub use backend::MongoBackend;
pub use config::MongoConfig;
pub use document::{BasicDocument, ReferenceDocument};

use tokenstore_core::{StoreResult, TokenConfig, TokenRecordStore};

/// Token store backed by MongoDB.
pub type MongoTokenStore = TokenRecordStore<MongoBackend>;

/// Connect to MongoDB and initialize a token store, declaring TTL indexes.
///
/// # Errors
///
/// Returns an error if either configuration is invalid, the client cannot be
/// created, or an index cannot be declared.
pub async fn connect_store(mongo: &MongoConfig, tokens: TokenConfig) -> StoreResult<MongoTokenStore> {
    let backend = MongoBackend::connect(mongo).await?;
    TokenRecordStore::new(backend, tokens).await
}
