//! Error handling module
//!
//! Provides the error types shared by extraction, configuration and rendering.

use crate::config::ConfigError;
use crate::connection::Engine;
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Failure of a single catalog operation, before the assembler attaches
/// the object it was working on.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("query failed: {}", error_chain(.0))]
    Query(#[from] tokio_postgres::Error),

    #[error("cannot connect to {target}: {}", error_chain(.source))]
    Connect {
        target: String,
        source: deadpool_postgres::PoolError,
    },

    #[error("cannot connect to {target}: {reason}")]
    Unavailable { target: String, reason: String },

    #[error("object no longer exists: {0}")]
    Missing(String),

    #[error("unexpected catalog value: {0}")]
    Malformed(String),

    #[error("inconsistent catalog data: {0}")]
    Inconsistent(String),
}

/// The catalog object being extracted when a failure happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogObject {
    Server,
    Database(String),
    Table { database: String, table: String },
    View { database: String, view: String },
}

impl fmt::Display for CatalogObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogObject::Server => write!(f, "server"),
            CatalogObject::Database(db) => write!(f, "database {}", db),
            CatalogObject::Table { database, table } => {
                write!(f, "table {}.{}", database, table)
            }
            CatalogObject::View { database, view } => write!(f, "view {}.{}", database, view),
        }
    }
}

/// Extraction-wide error type
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Connection error ({target}): {source}")]
    Connection {
        target: CatalogObject,
        #[source]
        source: CatalogError,
    },

    #[error("Catalog query `{operation}` failed for {object}: {source}")]
    CatalogQuery {
        object: CatalogObject,
        operation: &'static str,
        #[source]
        source: CatalogError,
    },

    #[error("Unsupported engine: {0} has no catalog reader")]
    UnsupportedEngine(Engine),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ExtractError {
    /// Object that was in progress when the extraction failed, if any
    pub fn object(&self) -> Option<&CatalogObject> {
        match self {
            ExtractError::Connection { target, .. } => Some(target),
            ExtractError::CatalogQuery { object, .. } => Some(object),
            _ => None,
        }
    }
}

/// Renderer failure; the snapshot that was being rendered is unaffected
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Render an error followed by every cause that adds to its message.
///
/// Driver errors often display only their kind ("db error") and keep the
/// server's message in the source chain.
pub fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut text = err.to_string();
    let mut cause = err.source();
    while let Some(inner) = cause {
        let inner_text = inner.to_string();
        if !text.contains(&inner_text) {
            text.push_str(": ");
            text.push_str(&inner_text);
        }
        cause = inner.source();
    }
    text
}

/// Helper to wrap a catalog failure with the object it belongs to.
///
/// Failures to obtain a connection become `Connection`, everything else
/// `CatalogQuery`.
pub fn catalog_error(
    object: CatalogObject,
    operation: &'static str,
) -> impl FnOnce(CatalogError) -> ExtractError {
    move |source| match source {
        CatalogError::Connect { .. } | CatalogError::Unavailable { .. } => {
            ExtractError::Connection {
                target: object,
                source,
            }
        }
        source => ExtractError::CatalogQuery {
            object,
            operation,
            source,
        },
    }
}
