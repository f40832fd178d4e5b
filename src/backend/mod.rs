use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::config::{BackendConfig, BackendType};
use crate::error::{AppError, AppResult};

pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

/// Storage abstraction for auto-generated resources
///
/// Records are schemaless JSON objects identified by their `id` field.
/// Listing returns records in insertion order; ordering by request
/// parameters happens above this layer so every backend orders identically.
#[async_trait]
pub trait RecordBackend: Send + Sync {
    /// Check if the storage backend is healthy and accessible
    async fn health_check(&self) -> AppResult<()>;

    /// Create storage for a resource if it does not exist yet
    async fn init_resource(&self, resource: &str) -> AppResult<()>;

    /// Store a batch of records that already carry an `id`
    ///
    /// All-or-nothing: when any id is taken, by a stored record or by an
    /// earlier record of the batch, nothing is written.
    async fn insert_records(&self, resource: &str, records: Vec<Value>) -> AppResult<Vec<Value>>;

    /// Store a single record that already carries an `id`
    async fn insert_record(&self, resource: &str, record: Value) -> AppResult<Value> {
        self.insert_records(resource, vec![record])
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal("Insert returned no record".to_string()))
    }

    /// Find a record by ID
    async fn find_record(&self, resource: &str, id: &str) -> AppResult<Option<Value>>;

    /// All records of a resource in insertion order
    async fn list_records(&self, resource: &str) -> AppResult<Vec<Value>>;

    /// Delete a record, returning whether it existed
    async fn delete_record(&self, resource: &str, id: &str) -> AppResult<bool>;
}

/// The record's `id` rendered as a string key.
pub fn record_id(record: &Value) -> Option<String> {
    match record.get("id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

pub fn duplicate_id(id: &str) -> AppError {
    AppError::Conflict(format!("Record with id '{}' already exists", id))
}

/// Validate an incoming record and give it a UUID `id` when it has none.
pub fn prepare_record(mut record: Value) -> AppResult<(String, Value)> {
    let object = record
        .as_object_mut()
        .ok_or_else(|| AppError::BadRequest("Record must be a JSON object".to_string()))?;

    match object.get("id") {
        None | Some(Value::Null) => {
            object.insert(
                "id".to_string(),
                Value::String(uuid::Uuid::new_v4().to_string()),
            );
        }
        Some(Value::String(_)) | Some(Value::Number(_)) => {}
        Some(_) => {
            return Err(AppError::BadRequest(
                "Record id must be a string or a number".to_string(),
            ))
        }
    }

    let id = record_id(&record)
        .ok_or_else(|| AppError::Internal("Record id missing after preparation".to_string()))?;
    Ok((id, record))
}

/// Factory for creating backend instances
pub struct BackendFactory;

impl BackendFactory {
    /// Create a backend based on configuration
    pub async fn create(config: &BackendConfig) -> AppResult<Arc<dyn RecordBackend>> {
        match config.backend_type {
            BackendType::Memory => {
                info!("using in-memory record backend");
                Ok(Arc::new(memory::MemoryBackend::new()))
            }
            #[cfg(feature = "sqlite")]
            BackendType::Sqlite => {
                info!(url = %config.url, "using sqlite record backend");
                let backend = sqlite::SqliteBackend::connect(config).await?;
                Ok(Arc::new(backend))
            }
            #[cfg(not(feature = "sqlite"))]
            BackendType::Sqlite => Err(AppError::Configuration(
                "SQLite support is not compiled in (enable the `sqlite` feature)".to_string(),
            )),
        }
    }
}
