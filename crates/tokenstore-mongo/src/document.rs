//! BSON document shapes.
//!
//! Field names match the layout used by existing deployments: `_id`, `Data`,
//! `BasicID` and `ExpiredAt`. `ExpiredAt` is a BSON date so the TTL index can
//! act on it.
//!
//! New records store every key as a string. Older deployments wrote the
//! generated basic key (`_id` of the basic record and `BasicID` of the
//! references) as an ObjectId; those decode to the ObjectId's hex form.

use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, DateTime, Document, doc};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokenstore_core::{BasicRecord, ReferenceRecord, StoreError, StoreResult};

/// Field carrying the expiry instant.
pub const EXPIRED_AT_FIELD: &str = "ExpiredAt";

/// Payload document in the basic collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicDocument {
    #[serde(rename = "_id")]
    pub id: Bson,
    #[serde(rename = "Data")]
    pub data: String,
    #[serde(rename = "ExpiredAt")]
    pub expired_at: DateTime,
}

/// Reference document in the access and refresh collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceDocument {
    #[serde(rename = "_id")]
    pub id: Bson,
    #[serde(rename = "BasicID")]
    pub basic_id: Bson,
    #[serde(rename = "ExpiredAt")]
    pub expired_at: DateTime,
}

/// Convert to a BSON date (millisecond precision).
pub fn to_bson_datetime(instant: OffsetDateTime) -> DateTime {
    let millis = instant.unix_timestamp_nanos() / 1_000_000;
    DateTime::from_millis(i64::try_from(millis).unwrap_or(i64::MAX))
}

/// Convert from a BSON date.
///
/// # Errors
///
/// Returns a backend error if the stored date is outside the supported range.
pub fn from_bson_datetime(date: DateTime) -> StoreResult<OffsetDateTime> {
    let nanos = i128::from(date.timestamp_millis()) * 1_000_000;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .map_err(|e| StoreError::backend(format!("stored ExpiredAt out of range: {e}")))
}

/// Read a stored key, accepting strings and ObjectIds.
///
/// # Errors
///
/// Returns a backend error for any other BSON type.
pub fn key_to_string(field: &str, key: &Bson) -> StoreResult<String> {
    match key {
        Bson::String(value) => Ok(value.clone()),
        Bson::ObjectId(oid) => Ok(oid.to_hex()),
        other => Err(StoreError::backend(format!(
            "stored {field} has unsupported type {:?}",
            other.element_type()
        ))),
    }
}

/// Filter matching a basic record by key.
///
/// A key that parses as an ObjectId also matches records written with an
/// ObjectId `_id`.
pub fn basic_key_filter(id: &str) -> Document {
    match ObjectId::parse_str(id) {
        Ok(oid) => doc! { "_id": { "$in": [id, oid] } },
        Err(_) => doc! { "_id": id },
    }
}

impl From<&BasicRecord> for BasicDocument {
    fn from(record: &BasicRecord) -> Self {
        Self {
            id: Bson::String(record.id.clone()),
            data: record.data.clone(),
            expired_at: to_bson_datetime(record.expires_at),
        }
    }
}

impl From<&ReferenceRecord> for ReferenceDocument {
    fn from(record: &ReferenceRecord) -> Self {
        Self {
            id: Bson::String(record.id.clone()),
            basic_id: Bson::String(record.basic_id.clone()),
            expired_at: to_bson_datetime(record.expires_at),
        }
    }
}

impl TryFrom<BasicDocument> for BasicRecord {
    type Error = StoreError;

    fn try_from(doc: BasicDocument) -> StoreResult<Self> {
        Ok(Self {
            id: key_to_string("_id", &doc.id)?,
            data: doc.data,
            expires_at: from_bson_datetime(doc.expired_at)?,
        })
    }
}

impl TryFrom<ReferenceDocument> for ReferenceRecord {
    type Error = StoreError;

    fn try_from(doc: ReferenceDocument) -> StoreResult<Self> {
        Ok(Self {
            id: key_to_string("_id", &doc.id)?,
            basic_id: key_to_string("BasicID", &doc.basic_id)?,
            expires_at: from_bson_datetime(doc.expired_at)?,
        })
    }
}
