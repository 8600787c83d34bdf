use std::path::PathBuf;
use thiserror::Error;

/// Errors raised at the I/O edge of the analyzer.
///
/// The parsing engine itself never fails: malformed rows are dropped and
/// unrecognised tables fall back to a default schema. These variants cover
/// reading inputs from disk and unpacking archives.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A ZIP bundle could not be opened or one of its entries could not be read.
    #[error("Invalid archive: {0}")]
    Archive(String),

    /// The input path exists but is not a `.csv`, `.txt` or `.zip` file.
    #[error("Unsupported input: {0}")]
    UnsupportedInput(PathBuf),

    /// The input path does not exist.
    #[error("Input not found: {0}")]
    InputNotFound(PathBuf),

    /// A command-line value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A JSON document could not be serialised or parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the analyzer crates.
pub type Result<T> = std::result::Result<T, AnalyzerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = AnalyzerError::FileRead {
            path: PathBuf::from("/exports/lb.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/exports/lb.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_archive() {
        let err = AnalyzerError::Archive("bad central directory".to_string());
        assert_eq!(err.to_string(), "Invalid archive: bad central directory");
    }

    #[test]
    fn test_error_display_unsupported_input() {
        let err = AnalyzerError::UnsupportedInput(PathBuf::from("/exports/report.pdf"));
        assert_eq!(err.to_string(), "Unsupported input: /exports/report.pdf");
    }

    #[test]
    fn test_error_display_input_not_found() {
        let err = AnalyzerError::InputNotFound(PathBuf::from("/missing"));
        assert_eq!(err.to_string(), "Input not found: /missing");
    }

    #[test]
    fn test_error_display_config() {
        let err = AnalyzerError::Config("unknown sort field".to_string());
        assert_eq!(err.to_string(), "Configuration error: unknown sort field");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: AnalyzerError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: AnalyzerError = json_err.into();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }
}
