pub mod backend;
pub mod config;
pub mod error;
pub mod extractors;
pub mod logging;
pub mod parser;
pub mod resource;
pub mod sort;
pub mod startup;

// Re-export commonly used types for easier access
pub use config::{AppConfig, ResourceConfig, SortOptions};
pub use error::{AppError, AppResult};
pub use parser::{SortDirection, SortError, SortKey, SortSpec};
pub use sort::SortConfig;
