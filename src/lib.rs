//! Fixed-width and pipe-delimited astronomical catalogs to JSON Lines.
//!
//! Layout:
//! - config: catalog document loading + validated field rules
//! - record: per-line extraction and the rewrite pipeline
//! - render: value typing and JSON output
//! - export: streaming driver with atomic output
//! - source: local source resolution, gzip handling

pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod record;
pub mod render;
pub mod source;

pub use config::{CatalogConfig, FieldRule, Format, load_catalogs};
pub use error::CatalogError;
pub use export::{ExportSummary, attach_header, export_catalog, transform_stream};
pub use record::RecordTransformer;
