use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::time::Duration;

use super::{duplicate_id, record_id, RecordBackend};
use crate::config::BackendConfig;
use crate::error::{AppError, AppResult};

/// SQLite record store
///
/// Each resource gets a table `r_<name>` holding the record JSON as TEXT.
/// `seq` preserves insertion order for listing.
pub struct SqliteBackend {
    pool: SqlitePool,
}

impl SqliteBackend {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &BackendConfig) -> AppResult<Self> {
        // An in-memory database lives only as long as its connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(&config.url)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to SQLite: {}", e)))?;

        Ok(Self::new(pool))
    }

    /// Resource names are validated at configuration load, so quoting is enough here.
    fn table_name(resource: &str) -> String {
        format!("\"r_{}\"", resource)
    }

    fn decode(data: &str) -> AppResult<Value> {
        serde_json::from_str(data).map_err(AppError::Serialization)
    }
}

#[async_trait]
impl RecordBackend for SqliteBackend {
    async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Health check failed: {}", e)))?;
        Ok(())
    }

    async fn init_resource(&self, resource: &str) -> AppResult<()> {
        let sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                data TEXT NOT NULL
            )
            "#,
            Self::table_name(resource)
        );

        sqlx::query(&sql).execute(&self.pool).await.map_err(|e| {
            AppError::Database(format!("Failed to create table for {}: {}", resource, e))
        })?;
        Ok(())
    }

    async fn insert_records(&self, resource: &str, records: Vec<Value>) -> AppResult<Vec<Value>> {
        let sql = format!(
            "INSERT INTO {} (id, data) VALUES (?1, ?2)",
            Self::table_name(resource)
        );

        // Dropping the transaction on an early return rolls the batch back.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        for record in &records {
            let id = record_id(record)
                .ok_or_else(|| AppError::BadRequest("Record has no id".to_string()))?;
            let data = serde_json::to_string(record)?;

            match sqlx::query(&sql)
                .bind(&id)
                .bind(&data)
                .execute(&mut *tx)
                .await
            {
                Ok(_) => {}
                Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                    return Err(duplicate_id(&id))
                }
                Err(e) => {
                    return Err(AppError::Database(format!("Failed to insert record: {}", e)))
                }
            }
        }

        tx.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit transaction: {}", e)))?;

        Ok(records)
    }

    async fn find_record(&self, resource: &str, id: &str) -> AppResult<Option<Value>> {
        let sql = format!("SELECT data FROM {} WHERE id = ?1", Self::table_name(resource));

        let data: Option<String> = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to find record: {}", e)))?;

        data.as_deref().map(Self::decode).transpose()
    }

    async fn list_records(&self, resource: &str) -> AppResult<Vec<Value>> {
        let sql = format!("SELECT data FROM {} ORDER BY seq", Self::table_name(resource));

        let rows: Vec<String> = sqlx::query_scalar(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to list records: {}", e)))?;

        rows.iter().map(|data| Self::decode(data)).collect()
    }

    async fn delete_record(&self, resource: &str, id: &str) -> AppResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", Self::table_name(resource));

        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete record: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}
