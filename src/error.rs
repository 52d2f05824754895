// src/error.rs

use thiserror::Error;

/// Errors raised by the tracker and its export path.
#[derive(Error, Debug)]
pub enum TrackerError {
    /// A snapshot was requested before the source delivered any report.
    #[error("Unable to capture performance report: no report received yet")]
    NoReport,

    /// An export was requested while the snapshot store is empty.
    #[error("No snapshots to write")]
    EmptyStore,

    /// `write_snapshots_to_default` was called without `export.default_path`.
    #[error("No default export path configured")]
    MissingExportPath,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
