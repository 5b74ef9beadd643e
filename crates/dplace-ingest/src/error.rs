//! Error types for loading and writing a D-PLACE repository.

use std::path::PathBuf;

use dplace_model::ValidationError;
use thiserror::Error;

/// Errors that can occur while reading or writing repository files.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Required file does not exist.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write file.
    #[error("failed to {operation} {path}: {source}")]
    FileWrite {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === CSV Errors ===
    /// Malformed CSV.
    #[error("failed to parse CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A row carries more fields than the header declares.
    #[error("{path}: row {row} has more fields than the header")]
    ExtraFields { path: PathBuf, row: usize },

    /// A row failed record validation.
    #[error("{path}: row {row}: {source}")]
    Record {
        path: PathBuf,
        row: usize,
        #[source]
        source: ValidationError,
    },

    // === Bibliography and Tree Errors ===
    /// BibTeX syntax error.
    #[error("{path}: BibTeX syntax error at line {line}: {message}")]
    Bibtex {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Nexus file without a usable TREES block.
    #[error("{path}: {message}")]
    Nexus { path: PathBuf, message: String },

    /// Newick syntax error.
    #[error("invalid Newick: {message}")]
    Newick { message: String },
}

impl IngestError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound { path }
        } else {
            Self::FileRead { path, source }
        }
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::ExtraFields {
            path: PathBuf::from("/repos/EA/data.csv"),
            row: 3,
        };
        assert_eq!(
            err.to_string(),
            "/repos/EA/data.csv: row 3 has more fields than the header"
        );
    }

    #[test]
    fn test_missing_file_maps_to_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = IngestError::read("/repos/x.csv", io);
        assert!(matches!(err, IngestError::FileNotFound { .. }));
    }
}
