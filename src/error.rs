//! Error taxonomy shared by the loader, the transformer and the export driver.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog document is unusable. Fatal for the whole load.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// One input line could not be parsed with the catalog's format.
    #[error("malformed record in catalog '{catalog}' at line {line}: {reason}")]
    MalformedRecord {
        catalog: String,
        line: usize,
        reason: String,
    },

    /// Source unreadable, decompression failure, or output unwritable.
    #[error("I/O error in catalog '{catalog}': {context}: {source}")]
    Io {
        catalog: String,
        context: String,
        #[source]
        source: io::Error,
    },
}

impl CatalogError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn io(catalog: &str, context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            catalog: catalog.to_string(),
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
