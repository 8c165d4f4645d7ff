//! Configuration layer: catalog document loading + validated in-memory rules.
//!
//! This module is separate from record transformation. It owns:
//! - FieldRule / CatalogConfig (read-only once built)
//! - the catalogs.xml loader and its checks
//! - tdat header column recovery

pub mod header;
pub mod load;
pub mod rule;

pub use header::parse_tdat_header;
pub use load::{load_catalogs, parse_catalogs};
pub use rule::{CatalogConfig, ColumnRange, FieldRule, Format};
