//! Validated, immutable per-catalog field rules.
//!
//! A `CatalogConfig` is built once by the loader and then only read. The one
//! way to "change" it, attaching header-recovered columns, consumes the value
//! and hands back a new one.

use std::collections::BTreeMap;
use std::fmt;

/// Raw layout of a catalog's source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Fields at fixed byte columns (`dat`).
    FixedWidth,
    /// Pipe-separated fields, column order from a header (`tdat`).
    Delimited,
}

impl Format {
    /// Parse the `type` attribute token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "dat" => Some(Self::FixedWidth),
            "tdat" => Some(Self::Delimited),
            _ => None,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Self::FixedWidth => "dat",
            Self::Delimited => "tdat",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FixedWidth => write!(f, "fixed-width"),
            Self::Delimited => write!(f, "delimited"),
        }
    }
}

/// 1-based inclusive column range. Always `1 <= start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRange {
    start: usize,
    end: usize,
}

impl ColumnRange {
    pub fn new(start: usize, end: usize) -> Option<Self> {
        (start >= 1 && start <= end).then_some(Self { start, end })
    }

    pub fn start(self) -> usize {
        self.start
    }

    pub fn end(self) -> usize {
        self.end
    }

    /// Zero-based half-open byte span `[start-1, end)`.
    pub fn byte_span(self) -> std::ops::Range<usize> {
        self.start - 1..self.end
    }
}

/// Transformation contract for one named field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub name: String,
    pub range: Option<ColumnRange>,
    pub rename_to: Option<String>,
    pub keep_after_copy: bool,
    pub prefix: Option<String>,
    pub excluded: bool,
}

impl FieldRule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            range: None,
            rename_to: None,
            keep_after_copy: false,
            prefix: None,
            excluded: false,
        }
    }

    /// Placeholder for a column the header declares but the catalog does not.
    pub fn excluded(name: impl Into<String>) -> Self {
        Self {
            excluded: true,
            ..Self::new(name)
        }
    }

    pub fn with_range(mut self, start: usize, end: usize) -> Self {
        self.range = ColumnRange::new(start, end);
        self
    }

    pub fn with_rename(mut self, rename_to: impl Into<String>, keep_after_copy: bool) -> Self {
        self.rename_to = Some(rename_to.into());
        self.keep_after_copy = keep_after_copy;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn is_included(&self) -> bool {
        !self.excluded
    }

    /// Non-empty rename target, if any.
    pub fn rename_target(&self) -> Option<&str> {
        self.rename_to.as_deref().filter(|r| !r.is_empty())
    }
}

/// One catalog: identity, source locations and field rules.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    name: String,
    format: Format,
    url: String,
    header_url: Option<String>,
    epoch: String,
    rules: Vec<FieldRule>,
    by_name: BTreeMap<String, usize>,
    columns: Option<Vec<String>>,
}

impl CatalogConfig {
    /// Build from already-validated parts. Rule names must be unique; a
    /// later duplicate replaces the earlier rule in place.
    pub fn new(
        name: impl Into<String>,
        format: Format,
        url: impl Into<String>,
        epoch: impl Into<String>,
        rules: Vec<FieldRule>,
    ) -> Self {
        let mut config = Self {
            name: name.into(),
            format,
            url: url.into(),
            header_url: None,
            epoch: epoch.into(),
            rules: Vec::with_capacity(rules.len()),
            by_name: BTreeMap::new(),
            columns: None,
        };
        for rule in rules {
            config.push_rule(rule);
        }
        config
    }

    pub fn with_header_url(mut self, header_url: Option<String>) -> Self {
        self.header_url = header_url;
        self
    }

    /// Attach the column order recovered from a header. Columns with no
    /// declared rule get an excluded placeholder so every column is covered.
    pub fn with_header_columns(mut self, columns: Vec<String>) -> Self {
        for column in &columns {
            if !self.by_name.contains_key(column) {
                self.push_rule(FieldRule::excluded(column.clone()));
            }
        }
        self.columns = Some(columns);
        self
    }

    fn push_rule(&mut self, rule: FieldRule) {
        match self.by_name.get(&rule.name) {
            Some(&idx) => self.rules[idx] = rule,
            None => {
                self.by_name.insert(rule.name.clone(), self.rules.len());
                self.rules.push(rule);
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn header_url(&self) -> Option<&str> {
        self.header_url.as_deref()
    }

    pub fn epoch(&self) -> &str {
        &self.epoch
    }

    pub fn rule(&self, name: &str) -> Option<&FieldRule> {
        self.by_name.get(name).map(|&idx| &self.rules[idx])
    }

    /// Rules in declaration order (synthesized placeholders last).
    pub fn rules(&self) -> impl Iterator<Item = &FieldRule> {
        self.rules.iter()
    }

    /// Column names for positional assignment of delimited values.
    pub fn column_order(&self) -> Vec<&str> {
        match &self.columns {
            Some(columns) => columns.iter().map(String::as_str).collect(),
            None => self.rules.iter().map(|r| r.name.as_str()).collect(),
        }
    }

    /// Largest configured `end` column, 0 when no rule has a range.
    pub fn max_end(&self) -> usize {
        self.rules
            .iter()
            .filter_map(|r| r.range.map(ColumnRange::end))
            .max()
            .unwrap_or(0)
    }
}
