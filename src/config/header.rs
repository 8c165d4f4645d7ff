//! Column order recovery from a tdat header.
//!
//! The relevant header line looks like:
//! line[1] = name ra dec vmag class

use crate::error::{CatalogError, Result};
use regex::Regex;
use std::sync::LazyLock;

static FIELD_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^line\[1\] = (.*)$").expect("valid header regex"));

/// Column names from the first `line[1] = ...` line.
pub fn parse_tdat_header(text: &str) -> Result<Vec<String>> {
    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if let Some(caps) = FIELD_LINE_RE.captures(line) {
            let columns: Vec<String> = caps[1].split_whitespace().map(str::to_string).collect();
            if columns.is_empty() {
                return Err(CatalogError::config("tdat header 'line[1]' lists no columns"));
            }
            return Ok(columns);
        }
    }
    Err(CatalogError::config(
        "tdat header has no 'line[1] = ...' column declaration",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_first_field_line() {
        let header = "<HEADER>\r\ntable_name = heasarc_hip\r\nline[1] = hip_number  ra dec\r\nline[1] = other\r\n<DATA>\r\n";
        assert_eq!(
            parse_tdat_header(header).unwrap(),
            vec!["hip_number", "ra", "dec"]
        );
    }

    #[test]
    fn missing_field_line_is_config_error() {
        let err = parse_tdat_header("<HEADER>\ntable_name = x\n").unwrap_err();
        assert!(matches!(err, CatalogError::Configuration { .. }));
    }

    #[test]
    fn empty_field_line_is_config_error() {
        assert!(parse_tdat_header("line[1] =  \n").is_err());
    }
}
