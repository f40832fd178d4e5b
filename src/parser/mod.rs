pub mod sort_parser;

pub use sort_parser::{SortDirection, SortError, SortKey, SortSpec};
