//! MongoDB record backend.
//!
//! Expiry is delegated to MongoDB TTL indexes on `ExpiredAt`. The server's
//! TTL monitor runs roughly once a minute, so an expired record may stay
//! readable for a short while after its expiry instant.

use std::time::Duration;

use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, Database, IndexModel};
use tokenstore_core::{BasicRecord, RecordBackend, ReferenceRecord, StoreError, StoreResult};
use tracing::{debug, info};

use crate::config::MongoConfig;
use crate::document::{BasicDocument, ReferenceDocument, basic_key_filter};

/// Server error code for a unique index violation.
const DUPLICATE_KEY: i32 = 11000;

/// Map a driver error onto the store taxonomy.
pub(crate) fn map_mongo_error(err: MongoError) -> StoreError {
    if let ErrorKind::Write(WriteFailure::WriteError(ref write_error)) = *err.kind
        && write_error.code == DUPLICATE_KEY
    {
        return StoreError::conflict(write_error.message.clone());
    }
    StoreError::backend(err.to_string())
}

/// Record backend on a MongoDB database.
///
/// Holds one [`Client`]; the driver pools connections internally and the
/// handle is shared by all concurrent calls.
#[derive(Debug, Clone)]
pub struct MongoBackend {
    client: Client,
    database: Database,
}

impl MongoBackend {
    /// Connect using the given configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an invalid configuration, or a
    /// backend error if the connection string cannot be resolved.
    pub async fn connect(config: &MongoConfig) -> StoreResult<Self> {
        config.validate()?;

        let mut options = ClientOptions::parse(&config.url)
            .await
            .map_err(map_mongo_error)?;
        options.app_name = config.app_name.clone();
        options.connect_timeout = Some(config.connect_timeout);
        options.server_selection_timeout = Some(config.connect_timeout);

        let client = Client::with_options(options).map_err(map_mongo_error)?;
        info!(database = %config.database, "Connected to MongoDB");

        Ok(Self::from_client(client, &config.database))
    }

    /// Wrap an existing client.
    #[must_use]
    pub fn from_client(client: Client, database: &str) -> Self {
        let database = client.database(database);
        Self { client, database }
    }

    /// Get a reference to the client.
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Get a reference to the database.
    #[must_use]
    pub fn database(&self) -> &Database {
        &self.database
    }

    fn basic(&self, collection: &str) -> Collection<BasicDocument> {
        self.database.collection(collection)
    }

    fn reference(&self, collection: &str) -> Collection<ReferenceDocument> {
        self.database.collection(collection)
    }
}

#[async_trait]
impl RecordBackend for MongoBackend {
    async fn ensure_expiry_index(
        &self,
        collection: &str,
        index_name: &str,
        expire_after: Duration,
    ) -> StoreResult<()> {
        let options = IndexOptions::builder()
            .name(index_name.to_string())
            .expire_after(expire_after)
            .build();
        let model = IndexModel::builder()
            .keys(doc! { "ExpiredAt": 1 })
            .options(options)
            .build();

        self.database
            .collection::<mongodb::bson::Document>(collection)
            .create_index(model)
            .await
            .map_err(map_mongo_error)?;

        info!(collection, index = index_name, ?expire_after, "Ensured TTL index");
        Ok(())
    }

    async fn insert_basic(&self, collection: &str, record: &BasicRecord) -> StoreResult<()> {
        self.basic(collection)
            .insert_one(BasicDocument::from(record))
            .await
            .map_err(map_mongo_error)?;
        Ok(())
    }

    async fn insert_reference(
        &self,
        collection: &str,
        record: &ReferenceRecord,
    ) -> StoreResult<()> {
        self.reference(collection)
            .insert_one(ReferenceDocument::from(record))
            .await
            .map_err(map_mongo_error)?;
        Ok(())
    }

    async fn find_basic(&self, collection: &str, id: &str) -> StoreResult<Option<BasicRecord>> {
        let found = self
            .basic(collection)
            .find_one(basic_key_filter(id))
            .await
            .map_err(map_mongo_error)?;
        found.map(BasicRecord::try_from).transpose()
    }

    async fn find_reference(
        &self,
        collection: &str,
        id: &str,
    ) -> StoreResult<Option<ReferenceRecord>> {
        let found = self
            .reference(collection)
            .find_one(doc! { "_id": id })
            .await
            .map_err(map_mongo_error)?;
        found.map(ReferenceRecord::try_from).transpose()
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<u64> {
        let result = self
            .database
            .collection::<mongodb::bson::Document>(collection)
            .delete_one(doc! { "_id": id })
            .await
            .map_err(map_mongo_error)?;
        debug!(collection, deleted = result.deleted_count, "Deleted document");
        Ok(result.deleted_count)
    }

    async fn close(&self) -> StoreResult<()> {
        self.client.clone().shutdown().await;
        info!(database = %self.database.name(), "MongoDB client shut down");
        Ok(())
    }
}
