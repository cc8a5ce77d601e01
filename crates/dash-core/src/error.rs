use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the dashboard core.
///
/// Malformed *data* is never an error: bad numbers, bad dates and absent
/// optional columns degrade to documented defaults in the cleaner. The
/// variants here cover the fatal load path and the one per-aggregation
/// contract violation (a required column missing).
#[derive(Error, Debug)]
pub enum DashError {
    /// The input file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file could not be interpreted as tabular data at all.
    #[error("Not a recognizable tabular file: {0}")]
    Format(String),

    /// A column required by a specific aggregation is absent.
    #[error("Required column '{0}' is missing")]
    MissingColumn(&'static str),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = DashError::FileRead {
            path: PathBuf::from("/data/superstore.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/data/superstore.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_format() {
        let err = DashError::Format("no known columns in header".to_string());
        assert_eq!(
            err.to_string(),
            "Not a recognizable tabular file: no known columns in header"
        );
    }

    #[test]
    fn test_error_display_missing_column() {
        let err = DashError::MissingColumn("Order Date");
        assert_eq!(err.to_string(), "Required column 'Order Date' is missing");
    }

    #[test]
    fn test_error_display_config() {
        let err = DashError::Config("unknown view".to_string());
        assert_eq!(err.to_string(), "Configuration error: unknown view");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: DashError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }
}
