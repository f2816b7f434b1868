//! Persisted record types.
//!
//! A stored grant is spread over three record sets joined by the basic
//! record's key:
//!
//! - basic records hold the serialized token payload, keyed by the
//!   authorization code or by a generated identifier
//! - access records map an access token to a basic record key
//! - refresh records map a refresh token to a basic record key
//!
//! Every record carries its own expiry. The backend's TTL index removes
//! records once that instant has passed; nothing in this crate deletes
//! expired records.

use std::fmt;

use time::OffsetDateTime;
use uuid::Uuid;

/// The record set a key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Token payload records.
    Basic,
    /// Access token references.
    Access,
    /// Refresh token references.
    Refresh,
}

impl RecordKind {
    /// All record kinds, in the order their collections are initialized.
    pub const ALL: [RecordKind; 3] = [RecordKind::Basic, RecordKind::Access, RecordKind::Refresh];

    /// Lowercase name used in logs and index names.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Basic => "basic",
            RecordKind::Access => "access",
            RecordKind::Refresh => "refresh",
        }
    }

    /// Name of the TTL index declared on this kind's collection.
    #[must_use]
    pub fn expiry_index_name(&self) -> String {
        format!("{}_expired_at_ttl", self.as_str())
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token payload record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicRecord {
    /// Authorization code or generated identifier.
    pub id: String,
    /// JSON-encoded token.
    pub data: String,
    /// Instant after which the backend may purge the record.
    pub expires_at: OffsetDateTime,
}

/// An access or refresh token pointing at a basic record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRecord {
    /// Access or refresh token value.
    pub id: String,
    /// Key of the basic record holding the payload.
    pub basic_id: String,
    /// Instant after which the backend may purge the record.
    pub expires_at: OffsetDateTime,
}

/// Generate a key for a basic record that is not keyed by a code.
///
/// Uses the simple (hyphen-less, 32 hex digit) UUID form.
#[must_use]
pub fn generate_basic_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_names() {
        assert_eq!(RecordKind::Basic.expiry_index_name(), "basic_expired_at_ttl");
        assert_eq!(RecordKind::Refresh.expiry_index_name(), "refresh_expired_at_ttl");
    }

    #[test]
    fn test_generated_ids_are_unique_hex() {
        let a = generate_basic_id();
        let b = generate_basic_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
