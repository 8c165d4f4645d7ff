//! Catalog document (catalogs.xml) loading.
//!
//! XML shape:
//! <catalogs>
//!   <catalog name="heasarc_hip" type="tdat">
//!     <url>https://.../heasarc_hip.tdat.gz</url>
//!     <headerUrl>heasarc_hip.header</headerUrl>   <!-- optional -->
//!     <epoch>J2000</epoch>
//!     <fields>
//!       <field name="hip_number" renameTo="hip" prefix="HIP " keepAfterCopy="true"/>
//!       <field name="ra" start="1" end="10"/>
//!     </fields>
//!   </catalog>
//! </catalogs>
//!
//! Deserialization is permissive (everything defaults to empty); all the
//! checks live in `validate_and_build`.

use crate::config::rule::{CatalogConfig, ColumnRange, FieldRule, Format};
use crate::error::{CatalogError, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogsSpec {
    #[serde(rename = "catalog", default)]
    pub catalogs: Vec<RawCatalog>,
}

/// Raw catalog shape as it appears in the document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCatalog {
    #[serde(rename = "@name", default)]
    pub name: String,

    #[serde(rename = "@type", default)]
    pub kind: String,

    #[serde(default)]
    pub url: String,

    #[serde(rename = "headerUrl", default)]
    pub header_url: Option<String>,

    #[serde(default)]
    pub epoch: String,

    #[serde(default)]
    pub fields: RawFields,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFields {
    #[serde(rename = "field", default)]
    pub fields: Vec<RawField>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawField {
    #[serde(rename = "@name", default)]
    pub name: String,

    #[serde(rename = "@renameTo", default)]
    pub rename_to: String,

    #[serde(rename = "@prefix", default)]
    pub prefix: String,

    #[serde(rename = "@keepAfterCopy", default)]
    pub keep_after_copy: String,

    #[serde(rename = "@start", default)]
    pub start: String,

    #[serde(rename = "@end", default)]
    pub end: String,
}

/// Read and validate a catalog document from disk.
pub fn load_catalogs(path: impl AsRef<Path>) -> Result<Vec<CatalogConfig>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| {
        CatalogError::config(format!("cannot read catalog file {}: {}", path.display(), e))
    })?;
    parse_catalogs(&text)
}

/// Parse and validate a catalog document held in memory.
pub fn parse_catalogs(xml: &str) -> Result<Vec<CatalogConfig>> {
    let spec: CatalogsSpec = quick_xml::de::from_str(xml)
        .map_err(|e| CatalogError::config(format!("invalid catalog document: {}", e)))?;
    spec.validate_and_build()
}

impl CatalogsSpec {
    pub fn validate_and_build(&self) -> Result<Vec<CatalogConfig>> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::with_capacity(self.catalogs.len());
        for raw in &self.catalogs {
            let config = raw.validate_and_build()?;
            if !seen.insert(config.name().to_string()) {
                return Err(CatalogError::config(format!(
                    "duplicate catalog name: {}",
                    config.name()
                )));
            }
            out.push(config);
        }
        Ok(out)
    }
}

impl RawCatalog {
    pub fn validate_and_build(&self) -> Result<CatalogConfig> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CatalogError::config(
                "attribute 'name' of tag 'catalog' cannot be empty",
            ));
        }
        let kind = self.kind.trim();
        if kind.is_empty() {
            return Err(CatalogError::config(format!(
                "catalog '{}': attribute 'type' cannot be empty",
                name
            )));
        }
        let format = Format::from_token(kind).ok_or_else(|| {
            CatalogError::config(format!(
                "catalog '{}': attribute 'type' must be 'tdat' or 'dat', got '{}'",
                name, kind
            ))
        })?;
        let url = self.url.trim();
        if url.is_empty() {
            return Err(CatalogError::config(format!(
                "catalog '{}': 'url' cannot be empty",
                name
            )));
        }
        let epoch = self.epoch.trim();
        if epoch.is_empty() {
            return Err(CatalogError::config(format!(
                "catalog '{}': 'epoch' cannot be empty",
                name
            )));
        }
        let header_url = self
            .header_url
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(str::to_string);

        let mut names = BTreeSet::new();
        let mut rules = Vec::with_capacity(self.fields.fields.len());
        for raw in &self.fields.fields {
            let rule = raw.validate_and_build(name)?;
            if !names.insert(rule.name.clone()) {
                return Err(CatalogError::config(format!(
                    "catalog '{}': duplicate field '{}'",
                    name, rule.name
                )));
            }
            rules.push(rule);
        }

        Ok(CatalogConfig::new(name, format, url, epoch, rules).with_header_url(header_url))
    }
}

impl RawField {
    fn validate_and_build(&self, catalog: &str) -> Result<FieldRule> {
        if self.name.is_empty() {
            return Err(CatalogError::config(format!(
                "catalog '{}': attribute 'name' of tag 'field' cannot be empty",
                catalog
            )));
        }

        let mut rule = FieldRule::new(self.name.clone());
        if !self.rename_to.is_empty() {
            rule.rename_to = Some(self.rename_to.clone());
        }
        if !self.prefix.is_empty() {
            rule.prefix = Some(self.prefix.clone());
        }
        rule.keep_after_copy = self.keep_after_copy.trim().eq_ignore_ascii_case("true");

        // Non-numeric bounds count as absent; a lone bound gives no range.
        if let (Some(start), Some(end)) = (parse_column(&self.start), parse_column(&self.end)) {
            rule.range = Some(ColumnRange::new(start, end).ok_or_else(|| {
                CatalogError::config(format!(
                    "catalog '{}': field '{}' has invalid column range {}..{}",
                    catalog, self.name, start, end
                ))
            })?);
        }
        Ok(rule)
    }
}

fn parse_column(s: &str) -> Option<usize> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
