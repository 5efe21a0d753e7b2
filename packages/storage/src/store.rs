// ABOUTME: SQLite-backed store with a single FIFO write gate
// ABOUTME: Reads go straight to the pool; every write is one gated transaction

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::{Sqlite, SqliteConnection, Transaction};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

use crate::error::StorageResult;
use crate::schema;

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub max_connections: u32,
    pub busy_timeout_seconds: u64,
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: planboard_core::database_file(),
            max_connections: 8,
            busy_timeout_seconds: 30,
        }
    }
}

/// Handle to the planning database. Cheap to clone.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
    pub(crate) write_gate: Arc<Mutex<()>>,
    path: PathBuf,
}

impl Store {
    /// Open (creating if needed) the database file, then bring its schema up to date.
    pub async fn open(config: StoreConfig) -> StorageResult<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        debug!("Opening database: {}", config.path.display());

        // Pragmas live on the connect options so every pooled connection gets them.
        // Rollback journal with full sync: once a commit returns, the main file
        // alone holds the whole database and can be copied as a backup.
        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Delete)
            .synchronous(SqliteSynchronous::Full)
            .busy_timeout(Duration::from_secs(config.busy_timeout_seconds));

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .acquire_timeout(Duration::from_secs(config.busy_timeout_seconds))
            .connect_with(options)
            .await?;

        let store = Self {
            pool,
            write_gate: Arc::new(Mutex::new(())),
            path: config.path,
        };

        let report = schema::apply(&store).await?;
        info!(
            "Database ready at {} (schema v{} -> v{})",
            store.path.display(),
            report.from_version,
            report.to_version
        );

        Ok(store)
    }

    /// Pool for direct reads. Never write through it; use [`Store::begin_write`].
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wait for the write gate, then open a transaction.
    ///
    /// The gate is a fair mutex, so writers are served in submission order and
    /// each one commits (or rolls back) before the next begins. Dropping the
    /// returned [`WriteTxn`] without committing rolls it back.
    pub async fn begin_write(&self) -> StorageResult<WriteTxn> {
        let guard = Arc::clone(&self.write_gate).lock_owned().await;
        debug!("Write gate acquired");
        let tx = self.pool.begin().await?;
        Ok(WriteTxn { tx, _guard: guard })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// An open write transaction holding the store's write gate.
pub struct WriteTxn {
    // Declared first so the transaction is released before the gate
    tx: Transaction<'static, Sqlite>,
    _guard: OwnedMutexGuard<()>,
}

impl WriteTxn {
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.tx
    }

    pub async fn commit(self) -> StorageResult<()> {
        self.tx.commit().await?;
        debug!("Write committed");
        Ok(())
    }
}
