use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};
use crate::record::CandidateRecord;

/// Cut every ranged field out of a fixed-width line.
///
/// Columns are 1-based inclusive byte positions, so `start=1,end=10` reads
/// bytes `[0, 10)`. Values are trimmed. A range past the end of the line
/// (or splitting a multi-byte character) fails the whole line.
pub fn extract_fixed_width<'a>(
    config: &'a CatalogConfig,
    line_no: usize,
    line: &str,
) -> Result<CandidateRecord<'a>> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let mut record = CandidateRecord::new();

    for rule in config.rules() {
        let Some(range) = rule.range else {
            continue;
        };
        let raw = line.get(range.byte_span()).ok_or_else(|| {
            let reason = if range.end() > line.len() {
                format!(
                    "field '{}' needs columns {}-{} but line has {} bytes (records need {})",
                    rule.name,
                    range.start(),
                    range.end(),
                    line.len(),
                    config.max_end()
                )
            } else {
                format!(
                    "field '{}' columns {}-{} split a multi-byte character",
                    rule.name,
                    range.start(),
                    range.end()
                )
            };
            CatalogError::MalformedRecord {
                catalog: config.name().to_string(),
                line: line_no,
                reason,
            }
        })?;

        // Prefixed fields with a rename target are keyed by the target from the start.
        let key = match (&rule.prefix, rule.rename_target()) {
            (Some(_), Some(target)) => target.to_string(),
            _ => rule.name.clone(),
        };
        record.insert(key, raw.trim().to_string(), rule);
    }

    Ok(record)
}

/// Split a pipe-delimited line and pair values with `columns` by position.
///
/// Only lines that are empty or end in `|` are records; anything else
/// (tdat header/trailer lines, truncated rows) yields `None`. Columns
/// without a rule are ignored, as are values beyond the last column.
pub fn extract_delimited<'a>(
    config: &'a CatalogConfig,
    columns: &[&str],
    line: &str,
) -> Option<CandidateRecord<'a>> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if !(line.is_empty() || line.ends_with('|')) {
        return None;
    }

    let mut record = CandidateRecord::new();
    for (column, value) in columns.iter().zip(line.split('|')) {
        if let Some(rule) = config.rule(column) {
            record.insert(rule.name.clone(), value.to_string(), rule);
        }
    }
    Some(record)
}
