//! Error types for the store
//!
//! Storage faults, bootstrap failures, and schema mismatches are kept
//! distinguishable from each other and from ordinary "no rows" outcomes.
//! A read that matches nothing yields an empty cursor; an update or delete
//! against a missing key yields an affected-row count of zero. Neither is
//! an error.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Copying the seed image into place failed. The target file, if
    /// partially written, has been removed.
    #[error("failed to materialize seed database at '{path}': {source}")]
    Bootstrap {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A fault from the underlying storage engine.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The database file was written by a newer version of this crate.
    #[error("database schema version {found} is newer than supported version {supported}")]
    SchemaIncompatible { found: u32, supported: u32 },

    /// The schema version matches but required tables are missing.
    #[error("database schema is corrupted: required tables are missing")]
    SchemaCorrupted,

    /// Hashing or verifying a password failed.
    #[error("password hash error: {0}")]
    PasswordHash(String),
}
