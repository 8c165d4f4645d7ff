//! Record transformation: one raw line in, at most one JSON record out.
//!
//! Each line gets a fresh `CandidateRecord`; nothing is carried between
//! lines. Entries keep a reference to the rule that produced them so the
//! rewrite stages never have to map an output key back to a rule.

pub mod extract;
pub mod rewrite;

use crate::config::{CatalogConfig, FieldRule, Format};
use crate::error::Result;
use crate::render::{self, JsonRecord};

pub use extract::{extract_delimited, extract_fixed_width};
pub use rewrite::rewrite;

/// One extracted value, keyed for output, with its owning rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<'a> {
    pub key: String,
    pub value: String,
    pub rule: &'a FieldRule,
}

/// Ordered key/value candidates for a single line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateRecord<'a> {
    entries: Vec<Entry<'a>>,
}

impl<'a> CandidateRecord<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert, or overwrite the value of an existing key in place.
    pub fn insert(&mut self, key: String, value: String, rule: &'a FieldRule) {
        match self.position(&key) {
            Some(idx) => {
                self.entries[idx].value = value;
                self.entries[idx].rule = rule;
            }
            None => self.entries.push(Entry { key, value, rule }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.position(key).map(|idx| self.entries[idx].value.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.key == key)
    }
}

/// Post-rewrite fields, in output order.
pub type FieldMap = Vec<(String, String)>;

/// Applies one catalog's rules to raw lines.
pub struct RecordTransformer<'a> {
    config: &'a CatalogConfig,
    columns: Vec<&'a str>,
}

impl<'a> RecordTransformer<'a> {
    pub fn new(config: &'a CatalogConfig) -> Self {
        let columns = match config.format() {
            Format::Delimited => config.column_order(),
            Format::FixedWidth => Vec::new(),
        };
        Self { config, columns }
    }

    /// Extract and rewrite one line.
    ///
    /// `Ok(None)` means the line was skipped on purpose (a delimited line
    /// that does not match the record pattern). Fixed-width lines that do
    /// not fit the configured columns are `MalformedRecord` errors.
    pub fn transform_fields(&self, line_no: usize, line: &str) -> Result<Option<FieldMap>> {
        let candidate = match self.config.format() {
            Format::FixedWidth => extract_fixed_width(self.config, line_no, line)?,
            Format::Delimited => match extract_delimited(self.config, &self.columns, line) {
                Some(candidate) => candidate,
                None => return Ok(None),
            },
        };
        Ok(Some(rewrite(candidate)))
    }

    /// Same as `transform_fields`, with values typed for output.
    pub fn transform(&self, line_no: usize, line: &str) -> Result<Option<JsonRecord>> {
        Ok(self
            .transform_fields(line_no, line)?
            .map(|fields| render::to_json_record(&fields)))
    }
}
