use anyhow::{Context, Result};
use tokenstore_core::{RecordKind, TokenStore};
use tokenstore_mongo::{MongoTokenStore, connect_store};
use tracing::{debug, info};

use crate::cli::KeyKind;
use crate::config::AppConfig;
use crate::output::{print_not_found, print_success, print_token};

async fn open(config: &AppConfig) -> Result<MongoTokenStore> {
    connect_store(&config.mongo, config.tokens.clone())
        .await
        .with_context(|| format!("failed to open token store on '{}'", config.mongo.database))
}

/// Connect and declare the TTL indexes. Declaring is idempotent.
pub async fn init(config: &AppConfig) -> Result<()> {
    let store = open(config).await?;
    info!(database = %config.mongo.database, "TTL indexes declared");
    for kind in RecordKind::ALL {
        print_success(&format!(
            "{} ({})",
            config.tokens.collection(kind),
            kind.expiry_index_name()
        ));
    }
    store.close().await?;
    Ok(())
}

pub async fn get(config: &AppConfig, kind: KeyKind, key: &str) -> Result<()> {
    let store = open(config).await?;
    let found = match kind {
        KeyKind::Code => store.get_by_code(key).await,
        KeyKind::Access => store.get_by_access(key).await,
        KeyKind::Refresh => store.get_by_refresh(key).await,
    }?;
    debug!(
        kind = kind.as_str(),
        collection = config.tokens.collection(kind.record_kind()),
        found = found.is_some(),
        "Token lookup"
    );
    match found {
        Some(token) => print_token(&token)?,
        None => print_not_found(&format!(
            "no token for that key in '{}'",
            config.tokens.collection(kind.record_kind())
        )),
    }
    store.close().await?;
    Ok(())
}

pub async fn remove(config: &AppConfig, kind: KeyKind, key: &str) -> Result<()> {
    let store = open(config).await?;
    match kind {
        KeyKind::Code => store.remove_by_code(key).await,
        KeyKind::Access => store.remove_by_access(key).await,
        KeyKind::Refresh => store.remove_by_refresh(key).await,
    }?;
    info!(
        kind = kind.as_str(),
        collection = config.tokens.collection(kind.record_kind()),
        "Token record removed"
    );
    print_success(&format!(
        "removed from '{}'",
        config.tokens.collection(kind.record_kind())
    ));
    store.close().await?;
    Ok(())
}
