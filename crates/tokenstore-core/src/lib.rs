//! # tokenstore-core
//!
//! OAuth 2.0 token storage on top of a document database with expiring
//! indexes.
//!
//! An issued grant is persisted as up to three kinds of record:
//!
//! - a **basic** record holding the JSON-encoded token, keyed by the
//!   authorization code or by a generated identifier
//! - an **access** record mapping the access token to the basic record
//! - a **refresh** record mapping the refresh token to the basic record
//!
//! Each record carries its own expiry and the database's TTL index removes it
//! once that instant has passed. See [`expiry`] for how the instants relate.
//!
//! ## Modules
//!
//! - [`token`] - the `TokenInfo` capability set and the `Token` payload
//! - [`store`] - the `TokenStore` trait and `TokenRecordStore`
//! - [`backend`] - the `RecordBackend` trait implemented per database
//! - [`record`] - persisted record types
//! - [`expiry`] - expiry planning for `create`
//! - [`config`] - collection layout
//!
//! # Example
//!
//! ```ignore
//! use tokenstore_core::{Token, TokenRecordStore, TokenStore};
//! use tokenstore_memory::MemoryBackend;
//!
//! let store = TokenRecordStore::with_defaults(MemoryBackend::new()).await?;
//! store.create(&token).await?;
//! let found = store.get_by_access("a1").await?;
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod expiry;
pub mod record;
pub mod store;
pub mod token;

pub use backend::RecordBackend;
pub use config::TokenConfig;
pub use error::{StoreError, StoreResult};
pub use expiry::ExpiryPlan;
pub use record::{BasicRecord, RecordKind, ReferenceRecord};
pub use store::{TokenRecordStore, TokenStore};
pub use token::{Token, TokenInfo};
