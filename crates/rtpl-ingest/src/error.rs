//! Error types for loading models and row tables.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading input files.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Input file not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input file exceeds the size limit.
    #[error("file too large: {path} ({size} bytes, max {max_size} bytes)")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    // === Model Errors ===
    /// Model JSON could not be parsed.
    #[error("failed to parse model {path}: {source}")]
    ModelParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // === CSV Errors ===
    /// Failed to read a CSV record.
    #[error("failed to read CSV {path}: {source}")]
    CsvRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// CSV file has no header row.
    #[error("CSV file is empty: {path}")]
    EmptyCsv { path: PathBuf },
}

impl IngestError {
    /// Map an I/O error on `path`, singling out missing files.
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
