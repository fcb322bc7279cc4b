/// Database abstraction layer
///
/// The monitoring core only talks to the repository traits; `LibsqlStore`
/// backs them in production and `MemoryStore` in tests.
pub mod memory;
pub mod migrations;
pub mod models;
pub mod repository;

pub use memory::MemoryStore;
pub use repository::{
    LibsqlStore, ServiceRepository, StatusCheckRepository, Store, SummaryRepository,
};

use std::path::Path;

use anyhow::{Context, Result};

use crate::pool::open_pool;

const POOL_SIZE: usize = 4;

/// Initialize database with schema
pub async fn initialize_database(conn: &libsql::Connection) -> Result<()> {
    migrations::run_migrations(conn).await
}

/// Open the database file, bring its schema up to date and wrap it in a store
pub async fn open_store(path: impl AsRef<Path>) -> Result<LibsqlStore> {
    let path = path.as_ref();
    let pool = open_pool(path, POOL_SIZE)
        .await
        .with_context(|| format!("Failed to open database at {}", path.display()))?;

    let conn = pool.get().await.map_err(|e| anyhow::anyhow!("Failed to get database connection: {}", e))?;
    initialize_database(&conn).await?;
    drop(conn);

    Ok(LibsqlStore::new_from_pool(pool))
}
