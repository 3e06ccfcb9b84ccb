pub mod bootstrap;
pub mod serve;

use std::sync::Arc;

use anyhow::Context;

use crate::config::AppConfig;
use crate::database::{MemoryStore, PgStore, Store};

/// Connect to Postgres and apply migrations, or fall back to the in-memory
/// store when no database is configured (or `memory` is forced).
pub(crate) async fn open_store(config: &AppConfig, memory: bool) -> anyhow::Result<Arc<dyn Store>> {
    match (&config.database.url, memory) {
        (Some(url), false) => {
            let store = PgStore::connect(url, &config.database)
                .await
                .context("failed to connect to database")?;
            store.migrate().await.context("failed to run migrations")?;
            Ok(Arc::new(store))
        }
        _ => {
            tracing::warn!("No database configured; using the in-memory store (data is lost on exit)");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
