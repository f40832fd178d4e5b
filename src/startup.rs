use axum::{
    extract::State,
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

use crate::backend::{BackendFactory, RecordBackend};
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::logging::logging_middleware;
use crate::resource::handlers::{create_records, delete_record, get_record, list_records};
use crate::resource::{Endpoint, RegisteredResource, ResourceState};

const HEALTH_PATH: &str = "/health";

/// Create the configured backend and build the application router.
pub async fn build_app(config: &AppConfig) -> AppResult<Router> {
    let backend = BackendFactory::create(&config.backend).await?;
    build_router(config, backend).await
}

/// Register every configured resource against `backend`.
pub async fn build_router(config: &AppConfig, backend: Arc<dyn RecordBackend>) -> AppResult<Router> {
    config.validate()?;

    let mut app = Router::new();
    let mut seen_paths = HashSet::from([HEALTH_PATH.to_string()]);

    for resource_config in &config.resources {
        let resource = Arc::new(RegisteredResource::from_config(resource_config)?);

        for endpoint in &resource.endpoints {
            if !seen_paths.insert(endpoint.path().to_string()) {
                return Err(AppError::Configuration(format!(
                    "Endpoint '{}' is registered more than once",
                    endpoint.path()
                )));
            }
        }

        backend.init_resource(&resource.name).await?;
        info!(
            resource = %resource.name,
            endpoints = ?resource.endpoints.iter().map(Endpoint::path).collect::<Vec<_>>(),
            sort_param = %resource.sort.param_name(),
            default_sort = %resource.sort.default_spec(),
            "registered resource"
        );

        app = app.merge(resource_router(backend.clone(), resource));
    }

    let health = Router::new()
        .route(HEALTH_PATH, get(health_check))
        .with_state(backend);

    Ok(app
        .merge(health)
        .layer(middleware::from_fn(logging_middleware)))
}

fn resource_router(backend: Arc<dyn RecordBackend>, resource: Arc<RegisteredResource>) -> Router {
    let mut router = Router::new();

    for endpoint in &resource.endpoints {
        router = match endpoint {
            Endpoint::Collection(path) => {
                router.route(path, get(list_records).post(create_records))
            }
            Endpoint::Item(path) => router.route(path, get(get_record).delete(delete_record)),
        };
    }

    router.with_state(ResourceState { backend, resource })
}

async fn health_check(
    State(backend): State<Arc<dyn RecordBackend>>,
) -> Result<Json<Value>, AppError> {
    backend.health_check().await?;
    Ok(Json(json!({ "status": "ok" })))
}
