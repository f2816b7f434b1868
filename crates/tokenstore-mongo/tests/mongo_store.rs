//! Token store behaviour against a real MongoDB.
//!
//! Uses testcontainers; run with `cargo test -p tokenstore-mongo -- --ignored`
//! on a machine with docker.

use std::time::Duration;

use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::mongo::Mongo;
use time::OffsetDateTime;
use tokenstore_core::{RecordBackend, Token, TokenConfig, TokenStore};
use tokenstore_mongo::{MongoConfig, MongoTokenStore, connect_store};
use tokio::sync::OnceCell;

static SHARED_MONGO: OnceCell<(ContainerAsync<Mongo>, String)> = OnceCell::const_new();

async fn mongo_url() -> String {
    let (_, url) = SHARED_MONGO
        .get_or_init(|| async {
            let container = Mongo::default()
                .start()
                .await
                .expect("start mongo container");
            let port = container
                .get_host_port_ipv4(27017)
                .await
                .expect("get port");
            (container, format!("mongodb://127.0.0.1:{port}"))
        })
        .await;
    url.clone()
}

/// Store on a fresh database so tests do not see each other's records.
async fn store(database: &str) -> MongoTokenStore {
    let config = MongoConfig::new(mongo_url().await, database);
    connect_store(&config, TokenConfig::default())
        .await
        .expect("store initializes")
}

/// BSON dates keep milliseconds only.
fn truncate_millis(instant: OffsetDateTime) -> OffsetDateTime {
    let nanos = instant.unix_timestamp_nanos() / 1_000_000 * 1_000_000;
    OffsetDateTime::from_unix_timestamp_nanos(nanos).unwrap()
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_init_declares_ttl_indexes() {
    let store = store("init_indexes").await;
    let database = store.backend().database();

    for (collection, index) in [
        ("oauth2_basic", "basic_expired_at_ttl"),
        ("oauth2_access", "access_expired_at_ttl"),
        ("oauth2_refresh", "refresh_expired_at_ttl"),
    ] {
        let names = database
            .collection::<mongodb::bson::Document>(collection)
            .list_index_names()
            .await
            .unwrap();
        assert!(names.iter().any(|name| name == index), "{collection}: {names:?}");
    }

    // Declaring again is a no-op.
    let again = TokenConfig::default();
    tokenstore_core::TokenRecordStore::new(store.backend().clone(), again)
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_full_grant_scenario() {
    let store = store("full_grant").await;
    let now = OffsetDateTime::now_utc();
    let token = Token::new("client-1")
        .with_user("user-1")
        .with_code("c1", now, Duration::from_secs(600))
        .with_access("a1", now, Duration::from_secs(3600))
        .with_refresh("r1", now, Duration::from_secs(24 * 3600));

    store.create(&token).await.unwrap();

    assert_eq!(store.get_by_code("c1").await.unwrap().as_ref(), Some(&token));
    assert_eq!(store.get_by_access("a1").await.unwrap().as_ref(), Some(&token));
    assert_eq!(store.get_by_refresh("r1").await.unwrap().as_ref(), Some(&token));

    let backend = store.backend();
    let access = backend
        .find_reference("oauth2_access", "a1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        access.expires_at,
        truncate_millis(now + time::Duration::hours(1))
    );

    let generated = backend
        .find_basic("oauth2_basic", &access.basic_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        generated.expires_at,
        truncate_millis(now + time::Duration::hours(24))
    );
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_remove_by_access_keeps_refresh() {
    let store = store("remove_access").await;
    let now = OffsetDateTime::now_utc();
    let token = Token::new("client-1")
        .with_access("a1", now, Duration::from_secs(3600))
        .with_refresh("r1", now, Duration::from_secs(7200));

    store.create(&token).await.unwrap();
    store.remove_by_access("a1").await.unwrap();

    assert!(store.get_by_access("a1").await.unwrap().is_none());
    assert_eq!(store.get_by_refresh("r1").await.unwrap(), Some(token));

    // Removing again is not an error.
    store.remove_by_access("a1").await.unwrap();
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_reads_grant_with_object_id_keys() {
    use mongodb::bson::{doc, oid::ObjectId};
    use tokenstore_mongo::document::to_bson_datetime;

    let store = store("object_id_keys").await;
    let database = store.backend().database();
    let now = OffsetDateTime::now_utc();
    let token = Token::new("client-1").with_access("a1", now, Duration::from_secs(3600));
    let expired_at = to_bson_datetime(now + time::Duration::hours(1));
    let id = ObjectId::new();

    database
        .collection::<mongodb::bson::Document>("oauth2_basic")
        .insert_one(doc! {
            "_id": id,
            "Data": token.to_payload().unwrap(),
            "ExpiredAt": expired_at,
        })
        .await
        .unwrap();
    database
        .collection::<mongodb::bson::Document>("oauth2_access")
        .insert_one(doc! { "_id": "a1", "BasicID": id, "ExpiredAt": expired_at })
        .await
        .unwrap();

    assert_eq!(store.get_by_access("a1").await.unwrap(), Some(token));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_unknown_keys_are_not_found() {
    let store = store("unknown_keys").await;

    assert!(store.get_by_code("missing").await.unwrap().is_none());
    assert!(store.get_by_access("missing").await.unwrap().is_none());
    assert!(store.get_by_refresh("missing").await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_duplicate_access_token_conflicts() {
    let store = store("duplicate_access").await;
    let now = OffsetDateTime::now_utc();
    let token = Token::new("client-1").with_access("a1", now, Duration::from_secs(3600));

    store.create(&token).await.unwrap();
    let err = store.create(&token).await.unwrap_err();
    assert!(err.is_conflict(), "unexpected error: {err}");
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_close_shuts_down_client() {
    let store = store("close").await;
    store.close().await.unwrap();
}
