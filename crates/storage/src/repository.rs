//! Repository Implementation

use crate::schema;
use crate::StorageError;
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, info};

/// Stored posture record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PostureRecord {
    pub id: i64,
    pub user_id: Option<String>,
    pub neck_angle: f64,
    pub posture_state: Option<String>,
    /// Local wall-clock time of persistence, no offset
    pub recorded_at: NaiveDateTime,
}

/// Candidate record as submitted by a client.
///
/// Carries no `id` or `recorded_at`; both are assigned by [`PostureStore::insert`].
/// Absent strings stay null and an absent angle reads as 0.0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPostureRecord {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub neck_angle: f64,
    #[serde(default)]
    pub posture_state: Option<String>,
}

/// Database connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite connection URL, e.g. `sqlite://neckfree.db`
    pub url: String,
    /// Upper bound on pooled connections
    pub max_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://neckfree.db".to_string(),
            max_connections: 5,
        }
    }
}

/// SQLite-backed posture record store
#[derive(Debug, Clone)]
pub struct PostureStore {
    pool: SqlitePool,
}

impl PostureStore {
    /// Open (creating if missing) the configured database and ensure the schema exists
    pub async fn connect(config: &StoreConfig) -> Result<Self, StorageError> {
        info!("Opening posture store at {}", config.url);

        let mut options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| StorageError::Connection(e.to_string()))?
            .create_if_missing(true);
        if !is_memory_url(&config.url) {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        Self::with_pool(pool).await
    }

    /// Create a private in-memory store.
    ///
    /// The in-memory database is dropped once its last connection closes, so the
    /// pool keeps one connection open that is never recycled.
    pub async fn in_memory() -> Result<Self, StorageError> {
        debug!("Creating in-memory posture store");

        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, StorageError> {
        sqlx::query(schema::CREATE_TABLE).execute(&pool).await?;
        Ok(Self { pool })
    }

    /// Persist a new record, assigning its id and recording time
    pub async fn insert(&self, record: NewPostureRecord) -> Result<PostureRecord, StorageError> {
        let recorded_at = Local::now().naive_local();
        let sql = schema::insert_returning();

        let stored = sqlx::query_as::<_, PostureRecord>(&sql)
            .bind(record.user_id)
            .bind(record.neck_angle)
            .bind(record.posture_state)
            .bind(recorded_at)
            .fetch_one(&self.pool)
            .await?;

        debug!("Inserted posture record with ID {}", stored.id);
        Ok(stored)
    }

    /// Get every stored record, oldest id first
    pub async fn list_all(&self) -> Result<Vec<PostureRecord>, StorageError> {
        let sql = schema::select_all();
        let records = sqlx::query_as::<_, PostureRecord>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    /// Get the records submitted by one user
    pub async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<PostureRecord>, StorageError> {
        let sql = schema::select_by_user();
        let records = sqlx::query_as::<_, PostureRecord>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    /// Close the underlying pool; later operations fail with a connection error
    pub async fn close(&self) {
        info!("Closing posture store");
        self.pool.close().await;
    }
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}
