// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::store::KeyValueStore;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use tracing::{debug, info};

const KIND_STRING: &str = "string";
const KIND_BOOL: &str = "bool";

/// Establishes the database connection pool.
/// If the database does not exist, it creates it.
/// It also ensures the `preferences` table exists.
pub async fn establish_connection_pool(database_url: &str) -> Result<SqlitePool> {
    if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
        info!("Creating database {}", database_url);
        Sqlite::create_database(database_url)
            .await
            .context("Failed to create database")?;
    } else {
        info!("Database already exists.");
    }

    let pool = SqlitePool::connect(database_url)
        .await
        .context("Failed to connect to database")?;

    ensure_schema(&pool).await?;

    Ok(pool)
}

/// Creates the key-value table if it is missing.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS preferences (
            key TEXT PRIMARY KEY NOT NULL,
            kind TEXT NOT NULL,
            value TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create 'preferences' table")?;

    info!("'preferences' table is ready.");

    Ok(())
}

#[derive(Debug, sqlx::FromRow)]
struct PreferenceRow {
    kind: String,
    value: String,
}

/// Key-value store persisted in the `preferences` table, one row per key.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, key: &str) -> Result<Option<PreferenceRow>> {
        sqlx::query_as::<_, PreferenceRow>("SELECT kind, value FROM preferences WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to read preference '{}'", key))
    }

    async fn upsert(&self, key: &str, kind: &str, value: &str) -> Result<()> {
        debug!("Writing preference {} ({}), {} bytes", key, kind, value.len());
        sqlx::query(
            "INSERT INTO preferences (key, kind, value) VALUES (?, ?, ?) \
             ON CONFLICT(key) DO UPDATE SET kind = excluded.kind, value = excluded.value",
        )
        .bind(key)
        .bind(kind)
        .bind(value)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to write preference '{}'", key))?;

        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        match self.fetch(key).await? {
            None => Ok(None),
            Some(row) if row.kind == KIND_STRING => Ok(Some(row.value)),
            Some(row) => bail!("Preference '{}' holds a {}, not a string", key, row.kind),
        }
    }

    async fn set_string(&self, key: &str, value: &str) -> Result<()> {
        self.upsert(key, KIND_STRING, value).await
    }

    async fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.fetch(key).await? {
            None => Ok(None),
            Some(row) if row.kind == KIND_BOOL => {
                let value = row
                    .value
                    .parse::<bool>()
                    .with_context(|| format!("Preference '{}' is not a valid bool", key))?;
                Ok(Some(value))
            }
            Some(row) => bail!("Preference '{}' holds a {}, not a bool", key, row.kind),
        }
    }

    async fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        self.upsert(key, KIND_BOOL, &value.to_string()).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM preferences WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to remove preference '{}'", key))?;

        debug!("Removed {} rows for preference {}", result.rows_affected(), key);

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    /// Helper function to set up an in-memory SQLite database for testing.
    /// A single connection keeps every query on the same in-memory database.
    pub(crate) async fn setup_test_db() -> Result<SqlitePool> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        ensure_schema(&pool).await?;

        Ok(pool)
    }

    #[tokio::test]
    async fn test_string_round_trip_and_overwrite() {
        let store = SqliteStore::new(setup_test_db().await.unwrap());

        assert_eq!(store.get_string("tasks").await.unwrap(), None);

        store.set_string("tasks", "[]").await.unwrap();
        store.set_string("tasks", r#"[{"id":"a"}]"#).await.unwrap();

        assert_eq!(
            store.get_string("tasks").await.unwrap().as_deref(),
            Some(r#"[{"id":"a"}]"#)
        );
    }

    #[tokio::test]
    async fn test_bool_round_trip() {
        let store = SqliteStore::new(setup_test_db().await.unwrap());

        assert_eq!(store.get_bool("reminders_enabled").await.unwrap(), None);
        store.set_bool("reminders_enabled", false).await.unwrap();
        assert_eq!(store.get_bool("reminders_enabled").await.unwrap(), Some(false));
        store.set_bool("reminders_enabled", true).await.unwrap();
        assert_eq!(store.get_bool("reminders_enabled").await.unwrap(), Some(true));
    }

    #[tokio::test]
    async fn test_kind_mismatch_is_an_error() {
        let store = SqliteStore::new(setup_test_db().await.unwrap());

        store.set_string("tasks", "[]").await.unwrap();
        assert!(store.get_bool("tasks").await.is_err());
    }

    #[tokio::test]
    async fn test_remove() {
        let store = SqliteStore::new(setup_test_db().await.unwrap());

        store.set_bool("reminders_enabled", false).await.unwrap();
        store.remove("reminders_enabled").await.unwrap();
        store.remove("never_written").await.unwrap();

        assert_eq!(store.get_bool("reminders_enabled").await.unwrap(), None);
    }
}
