//! Token store error types.
//!
//! Not-found is deliberately absent from this taxonomy: lookups report a
//! missing record as `Ok(None)` at every stage of resolution.

/// Errors that can occur during token store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Payload encoding or decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backing database reported a failure.
    #[error("Backend error: {message}")]
    Backend {
        /// Description of the backend failure.
        message: String,
    },

    /// A record with the same key already exists.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Invalid input data.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The store could not be initialized (e.g. expiry index creation failed).
    #[error("Initialization of collection '{collection}' failed: {message}")]
    Initialization {
        /// Collection whose setup failed.
        collection: String,
        /// Description of the failure.
        message: String,
    },

    /// The store configuration is invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl StoreError {
    // -------------------------------------------------------------------------
    // Constructor Methods
    // -------------------------------------------------------------------------

    /// Create a `Backend` error.
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Create a `Conflict` error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Create an `InvalidInput` error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an `Initialization` error.
    #[must_use]
    pub fn initialization(collection: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Initialization {
            collection: collection.into(),
            message: message.into(),
        }
    }

    /// Create a `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    // -------------------------------------------------------------------------
    // Predicate Methods
    // -------------------------------------------------------------------------

    /// Returns `true` if this is a serialization error.
    #[must_use]
    pub fn is_serialization_error(&self) -> bool {
        matches!(self, Self::Serialization(_))
    }

    /// Returns `true` if this is a backend error.
    #[must_use]
    pub fn is_backend_error(&self) -> bool {
        matches!(self, Self::Backend { .. })
    }

    /// Returns `true` if this is a `Conflict` error.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Returns `true` if this is an invalid input error.
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Returns `true` if the store failed to initialize.
    ///
    /// Callers are expected to abort startup on this error rather than run
    /// against collections that lack their expiry indexes.
    #[must_use]
    pub fn is_initialization_error(&self) -> bool {
        matches!(self, Self::Initialization { .. })
    }

    /// Returns `true` if this is a caller-side error (bad input or duplicate key).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Conflict(_) | Self::InvalidInput(_))
    }
}

/// Result type for token store operations.
pub type StoreResult<T> = Result<T, StoreError>;
