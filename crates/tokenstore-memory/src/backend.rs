use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use papaya::{Compute, HashMap as PapayaHashMap, Operation};
use time::OffsetDateTime;
use tokenstore_core::{BasicRecord, RecordBackend, ReferenceRecord, StoreError, StoreResult};

pub type DocumentKey = String; // Format: "collection/id"

pub(crate) fn make_document_key(collection: &str, id: &str) -> DocumentKey {
    format!("{collection}/{id}")
}

/// A stored document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Document {
    Basic(BasicRecord),
    Reference(ReferenceRecord),
}

impl Document {
    fn expires_at(&self) -> OffsetDateTime {
        match self {
            Document::Basic(record) => record.expires_at,
            Document::Reference(record) => record.expires_at,
        }
    }
}

/// In-memory record backend using papaya lock-free HashMap.
///
/// Emulates a database TTL index: once a collection has an expiry index, its
/// documents read as absent after `expires_at + expire_after`, exactly as if
/// the database sweep had already removed them. [`purge_expired`] performs the
/// sweep itself. Collections without an expiry index never expire documents.
///
/// Clones share the same data.
///
/// [`purge_expired`]: MemoryBackend::purge_expired
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    documents: Arc<PapayaHashMap<DocumentKey, Document>>,
    /// collection -> (index name, expire_after)
    expiry_indexes: Arc<PapayaHashMap<String, (String, Duration)>>,
    closed: Arc<AtomicBool>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the expiry index declared on a collection, if any.
    pub fn expiry_index(&self, collection: &str) -> Option<String> {
        let guard = self.expiry_indexes.pin();
        guard.get(collection).map(|(name, _)| name.clone())
    }

    /// Number of live (unexpired) documents in a collection.
    pub fn len(&self, collection: &str) -> usize {
        let now = OffsetDateTime::now_utc();
        let prefix = make_document_key(collection, "");
        let guard = self.documents.pin();
        guard
            .iter()
            .filter(|(key, doc)| key.starts_with(&prefix) && !self.is_expired(collection, doc, now))
            .count()
    }

    /// Returns `true` if the collection holds no live documents.
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    /// Returns the raw document stored under a key, expired or not.
    pub fn raw(&self, collection: &str, id: &str) -> Option<Document> {
        let guard = self.documents.pin();
        guard.get(&make_document_key(collection, id)).cloned()
    }

    /// Removes every expired document, as the database TTL sweep would.
    ///
    /// Returns the number of documents removed.
    pub fn purge_expired(&self) -> usize {
        let now = OffsetDateTime::now_utc();
        let guard = self.documents.pin();
        let expired: Vec<DocumentKey> = guard
            .iter()
            .filter(|(key, doc)| {
                key.split_once('/')
                    .is_some_and(|(collection, _)| self.is_expired(collection, doc, now))
            })
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            guard.remove(key);
        }
        expired.len()
    }

    fn is_expired(&self, collection: &str, doc: &Document, now: OffsetDateTime) -> bool {
        let guard = self.expiry_indexes.pin();
        let Some((_, expire_after)) = guard.get(collection) else {
            return false;
        };
        let grace = time::Duration::try_from(*expire_after).unwrap_or(time::Duration::MAX);
        doc.expires_at()
            .checked_add(grace)
            .is_none_or(|deadline| deadline <= now)
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StoreError::backend("memory backend is closed"));
        }
        Ok(())
    }

    fn find_live(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        self.ensure_open()?;
        let now = OffsetDateTime::now_utc();
        let guard = self.documents.pin();
        Ok(guard
            .get(&make_document_key(collection, id))
            .filter(|doc| !self.is_expired(collection, doc, now))
            .cloned())
    }

    /// Insert unless a live document holds the key. An expired document is
    /// replaced. Check and write happen in one atomic map operation.
    fn insert(&self, collection: &str, id: &str, doc: Document) -> StoreResult<()> {
        self.ensure_open()?;
        let now = OffsetDateTime::now_utc();
        let guard = self.documents.pin();
        let key = make_document_key(collection, id);
        let outcome = guard.compute(key, |existing| match existing {
            Some((_, current)) if !self.is_expired(collection, current, now) => {
                Operation::Abort(())
            }
            _ => Operation::Insert(doc.clone()),
        });
        match outcome {
            Compute::Aborted(()) => Err(StoreError::conflict(format!(
                "duplicate key '{id}' in collection '{collection}'"
            ))),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl RecordBackend for MemoryBackend {
    async fn ensure_expiry_index(
        &self,
        collection: &str,
        index_name: &str,
        expire_after: Duration,
    ) -> StoreResult<()> {
        self.ensure_open()?;
        let guard = self.expiry_indexes.pin();
        if let Some((existing, _)) = guard.get(collection)
            && existing != index_name
        {
            return Err(StoreError::conflict(format!(
                "collection '{collection}' already has expiry index '{existing}'"
            )));
        }
        guard.insert(
            collection.to_string(),
            (index_name.to_string(), expire_after),
        );
        Ok(())
    }

    async fn insert_basic(&self, collection: &str, record: &BasicRecord) -> StoreResult<()> {
        self.insert(collection, &record.id, Document::Basic(record.clone()))
    }

    async fn insert_reference(
        &self,
        collection: &str,
        record: &ReferenceRecord,
    ) -> StoreResult<()> {
        self.insert(collection, &record.id, Document::Reference(record.clone()))
    }

    async fn find_basic(&self, collection: &str, id: &str) -> StoreResult<Option<BasicRecord>> {
        match self.find_live(collection, id)? {
            Some(Document::Basic(record)) => Ok(Some(record)),
            Some(Document::Reference(_)) => Err(StoreError::backend(format!(
                "document '{id}' in '{collection}' is not a basic record"
            ))),
            None => Ok(None),
        }
    }

    async fn find_reference(
        &self,
        collection: &str,
        id: &str,
    ) -> StoreResult<Option<ReferenceRecord>> {
        match self.find_live(collection, id)? {
            Some(Document::Reference(record)) => Ok(Some(record)),
            Some(Document::Basic(_)) => Err(StoreError::backend(format!(
                "document '{id}' in '{collection}' is not a reference record"
            ))),
            None => Ok(None),
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<u64> {
        self.ensure_open()?;
        let guard = self.documents.pin();
        Ok(u64::from(
            guard.remove(&make_document_key(collection, id)).is_some(),
        ))
    }

    async fn close(&self) -> StoreResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
