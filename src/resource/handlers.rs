use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use super::ResourceState;
use crate::backend::{duplicate_id, prepare_record};
use crate::error::{AppError, AppResult};
use crate::extractors::RecordJson;
use crate::sort;

/// `GET` on a collection: every record, ordered by the resolved sort.
pub async fn list_records(
    State(state): State<ResourceState>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<Vec<Value>>> {
    let resource = &state.resource;

    let spec = sort::resolve_sort(&params, &resource.sort).inspect_err(|e| {
        warn!(resource = %resource.name, error = %e, "rejected sort request");
    })?;
    debug!(resource = %resource.name, sort = %spec, "resolved sort");

    let records = state.backend.list_records(&resource.name).await?;
    Ok(Json(sort::apply(&records, &spec)))
}

/// `POST` on a collection. Accepts one object or an array of objects;
/// an array is stored all-or-nothing.
pub async fn create_records(
    State(state): State<ResourceState>,
    RecordJson(payload): RecordJson<Value>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let name = &state.resource.name;

    match payload {
        Value::Array(items) => {
            // Validate the whole batch before anything is written.
            let mut ids = HashSet::with_capacity(items.len());
            let mut records = Vec::with_capacity(items.len());
            for item in items {
                let (id, record) = prepare_record(item)?;
                if !ids.insert(id.clone()) {
                    return Err(duplicate_id(&id));
                }
                records.push(record);
            }

            let created = state.backend.insert_records(name, records).await?;
            debug!(resource = %name, count = created.len(), "created records");
            Ok((StatusCode::CREATED, Json(Value::Array(created))))
        }
        item => {
            let (id, record) = prepare_record(item)?;
            let created = state.backend.insert_record(name, record).await?;
            debug!(resource = %name, id = %id, "created record");
            Ok((StatusCode::CREATED, Json(created)))
        }
    }
}

/// `GET` on an item route.
pub async fn get_record(
    State(state): State<ResourceState>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    state
        .backend
        .find_record(&state.resource.name, &id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Record '{}' not found", id)))
}

/// `DELETE` on an item route.
pub async fn delete_record(
    State(state): State<ResourceState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    if state.backend.delete_record(&state.resource.name, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Record '{}' not found", id)))
    }
}
