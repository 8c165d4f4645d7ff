//! Output rendering: per-value type inference and JSON Lines serialization.

pub mod json;

pub use json::{JsonRecord, infer_value, to_json_record, write_json_line};
