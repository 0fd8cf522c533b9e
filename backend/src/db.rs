//! Storage handle: the SQLite pool and request-scoped transactions.
//!
//! One [`Database`] is built at startup and cloned into every handler through
//! axum state. Each request obtains its own [`Session`] via
//! [`Database::acquire`]; nothing else touches the pool.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::{debug, info};

/// How long a writer waits for another session's write lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Storage failures. Never retried; they surface as 500s.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to the database at `url`, creating the file if it is missing.
    ///
    /// Readers never block writers in WAL mode; concurrent writers queue on
    /// the busy timeout.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        info!(max_connections, "Database pool ready");
        Ok(Self { pool })
    }

    /// A private in-memory database.
    ///
    /// Each SQLite connection to `:memory:` is its own database, so the pool
    /// holds exactly one connection and never lets it expire.
    pub async fn in_memory() -> Result<Self, StorageError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Ok(Self { pool })
    }

    /// Apply pending schema migrations. Safe to call repeatedly.
    pub async fn migrate(&self) -> Result<(), StorageError> {
        MIGRATOR.run(&self.pool).await?;
        Ok(())
    }

    /// Begin the unit of work for one request.
    pub async fn acquire(&self) -> Result<Session, StorageError> {
        let tx = self.pool.begin().await?;
        Ok(Session { tx })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// A transaction bound to a single request.
///
/// `commit` makes the work durable. A session dropped without committing,
/// whether from an early `?` return or a panic, is rolled back and its
/// connection goes back to the pool.
pub struct Session {
    tx: Transaction<'static, Sqlite>,
}

impl Session {
    pub async fn commit(self) -> Result<(), StorageError> {
        self.tx.commit().await?;
        debug!("Session committed");
        Ok(())
    }

    pub async fn rollback(self) -> Result<(), StorageError> {
        self.tx.rollback().await?;
        debug!("Session rolled back");
        Ok(())
    }

    pub(crate) fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.tx
    }
}
