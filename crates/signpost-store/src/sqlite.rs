//! SQLite implementation of the Store trait.
//!
//! This is the primary storage backend. It uses rusqlite with bundled SQLite,
//! wrapped in async via tokio::spawn_blocking. Key uniqueness is enforced by
//! the table's primary key, never by a read-then-write check.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use signpost_core::{now_millis, ResourceClass};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{InsertResult, Mutation, Store};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        tracing::debug!(path = %path.display(), "opened sqlite store");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(|_| StoreError::Poisoned)?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

#[async_trait]
impl Store for SqliteStore {
    async fn insert(&self, class: ResourceClass, key: &str, body: &[u8]) -> Result<InsertResult> {
        let key = key.to_string();
        let body = body.to_vec();

        self.blocking(move |conn| {
            let now = now_millis();
            let written = conn.execute(
                "INSERT INTO records (class, key, body, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                params![class.as_str(), key, body, now],
            );

            match written {
                Ok(_) => Ok(InsertResult::Inserted),
                Err(e) if is_unique_violation(&e) => Ok(InsertResult::Duplicate),
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    async fn get(&self, class: ResourceClass, key: &str) -> Result<Option<Vec<u8>>> {
        let key = key.to_string();

        self.blocking(move |conn| {
            conn.query_row(
                "SELECT body FROM records WHERE class = ?1 AND key = ?2",
                params![class.as_str(), key],
                |row| row.get(0),
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn list(&self, class: ResourceClass) -> Result<Vec<Vec<u8>>> {
        self.blocking(move |conn| {
            let mut stmt =
                conn.prepare("SELECT body FROM records WHERE class = ?1 ORDER BY key")?;
            let bodies = stmt
                .query_map(params![class.as_str()], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<Vec<u8>>>>()?;
            Ok(bodies)
        })
        .await
    }

    async fn update(
        &self,
        class: ResourceClass,
        key: &str,
        mutation: Mutation,
    ) -> Result<Option<Vec<u8>>> {
        let key = key.to_string();

        self.blocking(move |conn| {
            let tx = conn.transaction()?;

            let current: Option<Vec<u8>> = tx
                .query_row(
                    "SELECT body FROM records WHERE class = ?1 AND key = ?2",
                    params![class.as_str(), key],
                    |row| row.get(0),
                )
                .optional()?;

            let Some(current) = current else {
                return Ok(None);
            };

            // Dropping `tx` on error rolls back.
            let updated = mutation(current)?;
            tx.execute(
                "UPDATE records SET body = ?3, updated_at = ?4 WHERE class = ?1 AND key = ?2",
                params![class.as_str(), key, updated, now_millis()],
            )?;
            tx.commit()?;

            Ok(Some(updated))
        })
        .await
    }

    async fn remove(&self, class: ResourceClass, key: &str) -> Result<Option<Vec<u8>>> {
        let key = key.to_string();

        self.blocking(move |conn| {
            conn.query_row(
                "DELETE FROM records WHERE class = ?1 AND key = ?2 RETURNING body",
                params![class.as_str(), key],
                |row| row.get(0),
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }
}
