//! Error types for board descriptor operations.

use std::path::PathBuf;

/// Errors that can occur while loading board descriptors.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    /// TOML deserialization error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// JSON (PlatformIO board manifest) error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error reading board files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Board file not found.
    #[error("board file not found: {}", path.display())]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// The file extension is neither `.toml` nor `.json`.
    #[error("unsupported board file format: {}", path.display())]
    UnsupportedFormat {
        /// The offending path.
        path: PathBuf,
    },
}

/// Result type for board operations.
pub type Result<T> = std::result::Result<T, BoardError>;
