use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the viewer dashboard crates.
#[derive(Error, Debug)]
pub enum ViewerError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader or writer failed below the record level.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The source table lacks one or more of the time/channel/count columns.
    #[error("Missing required column(s): {0}")]
    MissingColumns(String),

    /// A timestamp cell did not match any recognised format.
    #[error("Line {line}: invalid timestamp {value:?}")]
    TimestampParse { line: usize, value: String },

    /// A viewer-count cell was not a non-negative number.
    #[error("Line {line}: invalid viewer count {value:?}")]
    ViewerCount { line: usize, value: String },

    /// A row is structurally unusable (too few fields, empty channel, ...).
    #[error("Line {line}: {message}")]
    MalformedRow { line: usize, message: String },

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A JSON document could not be parsed or written.
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ViewerError {
    /// `true` for errors caused by the content of the source table rather
    /// than by the environment. These abort a request before any
    /// aggregation runs.
    pub fn is_data_format(&self) -> bool {
        matches!(
            self,
            ViewerError::Csv(_)
                | ViewerError::MissingColumns(_)
                | ViewerError::TimestampParse { .. }
                | ViewerError::ViewerCount { .. }
                | ViewerError::MalformedRow { .. }
        )
    }
}

/// Convenience alias used throughout the viewer crates.
pub type Result<T> = std::result::Result<T, ViewerError>;
