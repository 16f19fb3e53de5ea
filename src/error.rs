use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the library.
///
/// Only failures that stop a whole generation run are represented here. Problems with a
/// single source or documentation unit are reported as skips by the extractors and never
/// surface as an `Error`.
#[derive(Debug, Error)]
pub enum Error {
    /// Low-level I/O failure while discovering units or persisting the document
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The directory that should receive the generated document does not exist
    #[error("Output directory does not exist: {}", .0.display())]
    OutputDirMissing(PathBuf),

    /// The configured serving root is missing or not a directory
    #[error("Serving root is not a directory: {}", .0.display())]
    InvalidServingRoot(PathBuf),

    /// The document could not be rendered
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The configuration file could not be read or is malformed
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(format!("JSON serialization failed: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Serialization(format!("YAML serialization failed: {}", err))
    }
}
