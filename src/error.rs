// src/error.rs

//! Error types for srcpm
//!
//! Library code returns [`Result`] everywhere and never terminates the
//! process; the binary decides what is fatal.

use thiserror::Error;

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, Error>;

/// All errors produced by the srcpm library
#[derive(Error, Debug)]
pub enum Error {
    /// SQLite failure from the package catalog
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// Filesystem or stream failure
    #[error("I/O error: {0}")]
    IoError(String),

    /// Something required to start could not be set up
    #[error("Initialization error: {0}")]
    InitError(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A package (or file) that was expected to exist does not
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// HTTP request failed or returned a status other than 200
    #[error("Download failed: {0}")]
    DownloadError(String),

    /// Archive digest does not match the catalog
    #[error(
        "Archive hash for '{package}' does not match the catalog (expected {expected}, got {actual}); \
         you can skip this check by re-running with --force/-f"
    )]
    ChecksumMismatch {
        package: String,
        expected: String,
        actual: String,
    },

    /// Tarball could not be extracted
    #[error("Extraction failed: {0}")]
    ExtractError(String),

    /// External build action exited unsuccessfully
    #[error("Build failed: {message}")]
    BuildError { message: String, output: String },

    /// Malformed manifest or other structured input
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A pipeline step failed for one package
    #[error("{package}: {phase} failed: {source}")]
    PipelineError {
        package: String,
        phase: String,
        #[source]
        source: Box<Error>,
    },

    /// The operator aborted the run
    #[error("Aborted: {0}")]
    Aborted(String),
}

impl Error {
    /// Captured output of a failed build, if this error (or its cause) carries one
    pub fn build_output(&self) -> Option<&str> {
        match self {
            Error::BuildError { output, .. } => Some(output),
            Error::PipelineError { source, .. } => source.build_output(),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ParseError(err.to_string())
    }
}
