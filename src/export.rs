//! Single-pass export of one catalog to JSON Lines.
//!
//! Record N is written before record N+1 is read. Output goes to a
//! temporary file next to the target and is only renamed to
//! `<catalog>.json` once every line has been processed, so a failed run
//! never leaves a file that looks complete.

use crate::config::{CatalogConfig, Format, parse_tdat_header};
use crate::error::{CatalogError, Result};
use crate::record::RecordTransformer;
use crate::render::write_json_line;
use crate::source::{open_source, read_header};
use std::fs;
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span, warn};

/// Counts reported when a catalog finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub catalog: String,
    pub lines_read: usize,
    pub records_written: usize,
    /// Blank delimited lines and delimited lines that are not records.
    pub lines_skipped: usize,
    /// Lines that are not valid UTF-8, and fixed-width lines (blank ones
    /// included) that do not fit the configured columns.
    pub malformed: usize,
}

/// Stream `reader` through the catalog's rules into `writer`.
///
/// A line that is not valid UTF-8 or does not fit the fixed-width columns
/// is logged and counted, and the next line is processed as usual. Read
/// and write failures abort with `CatalogError::Io`.
pub fn transform_stream<R: BufRead, W: Write>(
    config: &CatalogConfig,
    mut reader: R,
    writer: &mut W,
) -> Result<ExportSummary> {
    let catalog = config.name();
    let transformer = RecordTransformer::new(config);
    let mut summary = ExportSummary {
        catalog: catalog.to_string(),
        ..ExportSummary::default()
    };
    let mut buf = Vec::new();

    for lno in 1.. {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| CatalogError::io(catalog, format!("read line {}", lno), e))?;
        if n == 0 {
            break;
        }
        summary.lines_read += 1;

        let raw = buf.strip_suffix(b"\n").unwrap_or(&buf[..]);
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        let line = match std::str::from_utf8(raw) {
            Ok(line) => line,
            Err(e) => {
                let err = CatalogError::MalformedRecord {
                    catalog: catalog.to_string(),
                    line: lno,
                    reason: format!("invalid UTF-8 at byte {}", e.valid_up_to()),
                };
                warn!(catalog, line = lno, "{}", err);
                summary.malformed += 1;
                continue;
            }
        };

        if config.format() == Format::Delimited && line.trim().is_empty() {
            summary.lines_skipped += 1;
            continue;
        }

        match transformer.transform(lno, line) {
            Ok(Some(record)) => {
                write_json_line(writer, &record).map_err(|e| {
                    CatalogError::io(catalog, format!("write record for line {}", lno), e)
                })?;
                summary.records_written += 1;
            }
            Ok(None) => {
                debug!(catalog, line = lno, "skipping non-record line");
                summary.lines_skipped += 1;
            }
            Err(err @ CatalogError::MalformedRecord { .. }) => {
                warn!(catalog, line = lno, "{}", err);
                summary.malformed += 1;
            }
            Err(err) => return Err(err),
        }
    }

    Ok(summary)
}

/// Attach header columns to a delimited catalog.
///
/// The header comes from `header_path` when given, otherwise from the
/// catalog's `headerUrl` resolved through `resolve`. Fixed-width catalogs
/// and delimited catalogs without any header are returned unchanged.
pub fn attach_header(
    config: CatalogConfig,
    header_path: Option<&Path>,
    resolve: impl FnOnce(&str) -> PathBuf,
) -> Result<CatalogConfig> {
    if config.format() != Format::Delimited {
        return Ok(config);
    }
    let path = match (header_path, config.header_url()) {
        (Some(path), _) => path.to_path_buf(),
        (None, Some(url)) => resolve(url),
        (None, None) => {
            warn!(
                catalog = config.name(),
                "no header configured; using field declaration order for columns"
            );
            return Ok(config);
        }
    };

    let text = read_header(config.name(), &path)?;
    let columns = parse_tdat_header(&text).map_err(|e| match e {
        CatalogError::Configuration { message } => CatalogError::config(format!(
            "catalog '{}': header {}: {}",
            config.name(),
            path.display(),
            message
        )),
        other => other,
    })?;
    debug!(catalog = config.name(), columns = columns.len(), "header columns loaded");
    Ok(config.with_header_columns(columns))
}

/// Export `source` to `<out_dir>/<catalog>.json`.
pub fn export_catalog(
    config: &CatalogConfig,
    source: &Path,
    out_dir: &Path,
) -> Result<(ExportSummary, PathBuf)> {
    let catalog = config.name();
    let _span = info_span!("export", catalog).entered();

    let reader = open_source(catalog, source)?;

    fs::create_dir_all(out_dir).map_err(|e| {
        CatalogError::io(catalog, format!("create output dir {}", out_dir.display()), e)
    })?;
    let target = out_dir.join(format!("{}.json", catalog));

    // Dropped (and deleted) on any early return below.
    let mut tmp = tempfile::Builder::new()
        .prefix(&format!(".{}.", catalog))
        .suffix(".json.partial")
        .tempfile_in(out_dir)
        .map_err(|e| CatalogError::io(catalog, "create temporary output", e))?;

    let summary = {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        let summary = transform_stream(config, reader, &mut writer)?;
        writer
            .flush()
            .map_err(|e| CatalogError::io(catalog, "flush output", e))?;
        summary
    };

    tmp.as_file()
        .sync_all()
        .map_err(|e| CatalogError::io(catalog, "sync output", e))?;
    tmp.persist(&target).map_err(|e| {
        CatalogError::io(catalog, format!("rename output to {}", target.display()), e.error)
    })?;

    info!(
        catalog,
        lines = summary.lines_read,
        records = summary.records_written,
        skipped = summary.lines_skipped,
        malformed = summary.malformed,
        output = %target.display(),
        "export complete"
    );
    Ok((summary, target))
}
