//! Configuration errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::ldscript::ScriptSource;

/// Fatal, non-retryable failure raised while composing an environment.
///
/// No environment record is produced once one of these is returned.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("package '{name}' could not be resolved")]
    UnresolvedPackage { name: String },

    #[error("package '{name}' resolved to {}, which is not a directory", path.display())]
    MissingPackageDir { name: String, path: PathBuf },

    #[error("board descriptor is missing required field '{key}'")]
    MissingBoardField { key: String },

    #[error("invalid board descriptor: {detail}")]
    InvalidBoard { detail: String },

    #[error("{origin} linker script not found: {}", path.display())]
    MissingLinkerScript { origin: ScriptSource, path: PathBuf },

    #[error("source directory for library '{library}' not found: {}", path.display())]
    MissingLibrarySource { library: String, path: PathBuf },
}

impl ConfigError {
    /// The package, field, script or directory the error is about.
    pub fn subject(&self) -> String {
        match self {
            ConfigError::UnresolvedPackage { name } | ConfigError::MissingPackageDir { name, .. } => {
                name.clone()
            }
            ConfigError::MissingBoardField { key } => key.clone(),
            ConfigError::InvalidBoard { detail } => detail.clone(),
            ConfigError::MissingLinkerScript { path, .. }
            | ConfigError::MissingLibrarySource { path, .. } => path.display().to_string(),
        }
    }
}
