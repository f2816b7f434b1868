//! In-memory record backend for tokenstore.
//!
//! This crate provides an in-process implementation of the `RecordBackend`
//! trait from `tokenstore-core`. It emulates a database TTL index so the
//! expiry behaviour of the token store can be exercised without a database.
//!
//! # Example
//!
//! ```ignore
//! use tokenstore_core::{TokenRecordStore, TokenStore};
//! use tokenstore_memory::MemoryBackend;
//!
//! let store = TokenRecordStore::with_defaults(MemoryBackend::new()).await?;
//! store.create(&token).await?;
//! ```

pub mod backend;

pub use backend::{Document, DocumentKey, MemoryBackend};

/// Token store backed by memory.
pub type MemoryTokenStore = tokenstore_core::TokenRecordStore<MemoryBackend>;
