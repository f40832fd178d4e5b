use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use crate::error::{AppError, AppResult};
use crate::sort::DEFAULT_SORT_PARAM;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    pub resources: Vec<ResourceConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    #[default]
    Memory,
    Sqlite,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BackendConfig {
    #[serde(rename = "type", default)]
    pub backend_type: BackendType,
    #[serde(default = "default_sqlite_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig {
            backend_type: BackendType::Memory,
            url: default_sqlite_url(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_sqlite_url() -> String {
    "sqlite::memory:".to_string()
}

fn default_max_connections() -> u32 {
    1
}

/// One auto-generated REST resource.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ResourceConfig {
    pub name: String,
    pub endpoints: Vec<String>,
    #[serde(default)]
    pub sort: SortOptions,
}

/// Sort settings as written in the configuration file.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SortOptions {
    /// Query parameter carrying the sort expression.
    #[serde(default = "default_sort_param")]
    pub param: String,
    /// Attribute paths clients may sort by. Unrestricted when absent.
    #[serde(default)]
    pub attributes: Option<Vec<String>>,
    /// Sort expression used when the request has none.
    #[serde(default)]
    pub default: Option<String>,
}

impl Default for SortOptions {
    fn default() -> Self {
        SortOptions {
            param: default_sort_param(),
            attributes: None,
            default: None,
        }
    }
}

fn default_sort_param() -> String {
    DEFAULT_SORT_PARAM.to_string()
}

impl ResourceConfig {
    pub fn new(name: &str, endpoints: &[&str]) -> Self {
        ResourceConfig {
            name: name.to_string(),
            endpoints: endpoints.iter().map(|e| e.to_string()).collect(),
            sort: SortOptions::default(),
        }
    }

    pub fn with_sort(mut self, sort: SortOptions) -> Self {
        self.sort = sort;
        self
    }
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("environment variable pattern is valid")
    })
}

fn resource_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("resource name pattern is valid")
    })
}

impl AppConfig {
    /// Load configuration from YAML file
    pub fn load_from_file<P: AsRef<Path>>(config_path: P) -> AppResult<Self> {
        let path = config_path.as_ref();

        let content = fs::read_to_string(path).map_err(|e| {
            AppError::Configuration(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
            .map_err(|e| AppError::Configuration(format!("{}: {}", path.display(), e)))
    }

    /// Parse configuration from YAML text, expanding environment variables first.
    pub fn from_yaml(content: &str) -> AppResult<Self> {
        let expanded = Self::expand_env_vars(content)?;

        let app_config: AppConfig = serde_yaml::from_str(&expanded)
            .map_err(|e| AppError::Configuration(format!("Failed to parse config: {}", e)))?;

        app_config.validate()?;
        Ok(app_config)
    }

    /// Zero-config mode: in-memory records and a single `users` resource.
    pub fn default_config() -> Self {
        AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            backend: BackendConfig::default(),
            resources: vec![ResourceConfig::new("users", &["/users", "/users/:id"])],
        }
    }

    /// Expand `${VAR_NAME}` or `${VAR_NAME:-default}`.
    fn expand_env_vars(content: &str) -> AppResult<String> {
        let mut missing: Option<String> = None;

        let expanded = env_var_pattern().replace_all(content, |caps: &Captures| {
            let name = &caps[1];
            match (std::env::var(name), caps.get(2)) {
                (Ok(value), _) => value,
                (Err(_), Some(default)) => default.as_str().to_string(),
                (Err(_), None) => {
                    missing.get_or_insert_with(|| name.to_string());
                    String::new()
                }
            }
        });

        match missing {
            Some(name) => Err(AppError::Configuration(format!(
                "Environment variable {} not found and no default provided",
                name
            ))),
            None => Ok(expanded.into_owned()),
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.resources.is_empty() {
            return Err(AppError::Configuration(
                "Configuration must contain at least one resource".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for resource in &self.resources {
            if !resource_name_pattern().is_match(&resource.name) {
                return Err(AppError::Configuration(format!(
                    "Invalid resource name '{}'",
                    resource.name
                )));
            }
            if !names.insert(resource.name.as_str()) {
                return Err(AppError::Configuration(format!(
                    "Duplicate resource name '{}'",
                    resource.name
                )));
            }
            if resource.endpoints.is_empty() {
                return Err(AppError::Configuration(format!(
                    "Resource '{}' has no endpoints",
                    resource.name
                )));
            }
            if let Some(endpoint) = resource.endpoints.iter().find(|e| !e.starts_with('/')) {
                return Err(AppError::Configuration(format!(
                    "Endpoint '{}' of resource '{}' must start with '/'",
                    endpoint, resource.name
                )));
            }
        }

        Ok(())
    }

    pub fn find_resource(&self, name: &str) -> Option<&ResourceConfig> {
        self.resources.iter().find(|r| r.name == name)
    }
}
