//! Local source files: resolving catalog URLs to paths and opening them.
//!
//! Nothing is downloaded. A remote URL resolves to a file with the same
//! name inside the data directory, which the caller is expected to have
//! fetched already.

use crate::error::{CatalogError, Result};
use flate2::bufread::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Map a configured URL (or path) to the local file to read.
pub fn resolve_source(url: &str, data_dir: &Path) -> PathBuf {
    if let Some(path) = url.strip_prefix("file://") {
        return PathBuf::from(path);
    }
    if !url.contains("://") {
        let path = Path::new(url);
        if path.is_absolute() || path.exists() {
            return path.to_path_buf();
        }
        return data_dir.join(path);
    }

    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    let file_name = without_query
        .rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or(without_query);
    data_dir.join(file_name)
}

/// Open a source for line reading, gunzipping when it starts with the gzip magic.
pub fn open_source(catalog: &str, path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)
        .map_err(|e| CatalogError::io(catalog, format!("open source {}", path.display()), e))?;
    let mut reader = BufReader::new(file);
    let head = reader
        .fill_buf()
        .map_err(|e| CatalogError::io(catalog, format!("read source {}", path.display()), e))?;

    if head.starts_with(&GZIP_MAGIC) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}

/// Read a tdat header file (plain or gzipped) into a string.
pub fn read_header(catalog: &str, path: &Path) -> Result<String> {
    let mut text = String::new();
    open_source(catalog, path)?
        .read_to_string(&mut text)
        .map_err(|e| CatalogError::io(catalog, format!("read header {}", path.display()), e))?;
    Ok(text)
}
