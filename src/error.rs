//! Error types for the database sources and the Markdown sink.

use std::path::PathBuf;
use thiserror::Error;

/// Failure reading one of the reader's databases.
///
/// A missing store is not an error (it reads as empty); these are the
/// cases where a store exists but the driver cannot use it.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The SQLite driver refused to open the file
    #[error("Can't open database {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: sqlx::Error,
    },

    /// Query failed against an opened database
    #[error("SQL error in {}: {source}", .path.display())]
    Query {
        path: PathBuf,
        #[source]
        source: sqlx::Error,
    },
}

/// Failure writing exported documents.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to create output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
