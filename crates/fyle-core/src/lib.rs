//! Fyle Core: error type, configuration, category catalog.

pub mod catalog;
pub mod config;
pub mod error;

pub use catalog::{CategoryCatalog, CategorySpec, CATALOG_VERSION, FALLBACK_CATEGORY};
pub use config::{DataPaths, ExtractorSettings, FyleConfig};
pub use error::{Error, Result};
