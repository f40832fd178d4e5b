use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

use super::{duplicate_id, record_id, RecordBackend};
use crate::error::{AppError, AppResult};

/// Process-local record store, one insertion-ordered list per resource.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    resources: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

fn unknown_resource(resource: &str) -> AppError {
    AppError::Internal(format!("Resource '{}' is not initialized", resource))
}

#[async_trait]
impl RecordBackend for MemoryBackend {
    async fn health_check(&self) -> AppResult<()> {
        Ok(())
    }

    async fn init_resource(&self, resource: &str) -> AppResult<()> {
        self.resources
            .write()
            .await
            .entry(resource.to_string())
            .or_default();
        Ok(())
    }

    async fn insert_records(&self, resource: &str, records: Vec<Value>) -> AppResult<Vec<Value>> {
        let mut resources = self.resources.write().await;
        let stored = resources
            .get_mut(resource)
            .ok_or_else(|| unknown_resource(resource))?;

        let mut taken: HashSet<String> = stored.iter().filter_map(record_id).collect();
        for record in &records {
            let id = record_id(record)
                .ok_or_else(|| AppError::BadRequest("Record has no id".to_string()))?;
            if !taken.insert(id.clone()) {
                return Err(duplicate_id(&id));
            }
        }

        stored.extend(records.iter().cloned());
        Ok(records)
    }

    async fn find_record(&self, resource: &str, id: &str) -> AppResult<Option<Value>> {
        let resources = self.resources.read().await;
        let records = resources
            .get(resource)
            .ok_or_else(|| unknown_resource(resource))?;

        Ok(records
            .iter()
            .find(|r| record_id(r).as_deref() == Some(id))
            .cloned())
    }

    async fn list_records(&self, resource: &str) -> AppResult<Vec<Value>> {
        let resources = self.resources.read().await;
        resources
            .get(resource)
            .cloned()
            .ok_or_else(|| unknown_resource(resource))
    }

    async fn delete_record(&self, resource: &str, id: &str) -> AppResult<bool> {
        let mut resources = self.resources.write().await;
        let records = resources
            .get_mut(resource)
            .ok_or_else(|| unknown_resource(resource))?;

        let before = records.len();
        records.retain(|r| record_id(r).as_deref() != Some(id));
        Ok(records.len() != before)
    }
}
