//! Auto-generated REST resources.
//!
//! A [`ResourceConfig`] is compiled once into a [`RegisteredResource`] whose
//! endpoints and sort settings are shared read-only by every request.

use std::sync::Arc;

use crate::backend::RecordBackend;
use crate::config::ResourceConfig;
use crate::error::{AppError, AppResult};
use crate::sort::SortConfig;

pub mod handlers;

/// Route shape derived from a configured endpoint path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `/users`: list and create.
    Collection(String),
    /// `/users/{id}`: fetch and delete one record.
    Item(String),
}

impl Endpoint {
    /// Parse an endpoint such as `/users` or `/users/:id`.
    ///
    /// `:name` segments are rewritten to axum's `{name}` form. Only the last
    /// segment may be a parameter.
    pub fn parse(raw: &str) -> AppResult<Endpoint> {
        let trimmed = raw.trim_end_matches('/');
        if !trimmed.starts_with('/') {
            return Err(AppError::Configuration(format!(
                "Endpoint '{}' must start with '/'",
                raw
            )));
        }

        let segments: Vec<&str> = trimmed.split('/').skip(1).collect();
        let mut path = String::new();
        let mut has_param = false;

        for (i, segment) in segments.iter().enumerate() {
            let param = segment
                .strip_prefix(':')
                .or_else(|| segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')));

            match param {
                Some(name) if name.is_empty() => {
                    return Err(AppError::Configuration(format!(
                        "Endpoint '{}' has an unnamed parameter",
                        raw
                    )))
                }
                Some(name) if i + 1 == segments.len() => {
                    path.push_str(&format!("/{{{}}}", name));
                    has_param = true;
                }
                Some(_) => {
                    return Err(AppError::Configuration(format!(
                        "Endpoint '{}' may only have a parameter in its last segment",
                        raw
                    )))
                }
                None if segment.is_empty() => {
                    return Err(AppError::Configuration(format!(
                        "Endpoint '{}' contains an empty segment",
                        raw
                    )))
                }
                None => {
                    path.push('/');
                    path.push_str(segment);
                }
            }
        }

        if path.is_empty() {
            return Err(AppError::Configuration(format!(
                "Endpoint '{}' has no path segments",
                raw
            )));
        }

        Ok(if has_param {
            Endpoint::Item(path)
        } else {
            Endpoint::Collection(path)
        })
    }

    pub fn path(&self) -> &str {
        match self {
            Endpoint::Collection(path) | Endpoint::Item(path) => path,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegisteredResource {
    pub name: String,
    pub endpoints: Vec<Endpoint>,
    pub sort: SortConfig,
}

impl RegisteredResource {
    pub fn from_config(config: &ResourceConfig) -> AppResult<Self> {
        let endpoints = config
            .endpoints
            .iter()
            .map(|raw| Endpoint::parse(raw))
            .collect::<AppResult<Vec<_>>>()?;

        let sort = SortConfig::from_options(&config.sort).map_err(|e| {
            AppError::Configuration(format!(
                "Invalid sort settings for resource '{}': {}",
                config.name, e
            ))
        })?;

        Ok(RegisteredResource {
            name: config.name.clone(),
            endpoints,
            sort,
        })
    }
}

/// Router state for one resource's handlers.
#[derive(Clone)]
pub struct ResourceState {
    pub backend: Arc<dyn RecordBackend>,
    pub resource: Arc<RegisteredResource>,
}
