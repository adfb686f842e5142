// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RerunError {
    #[error("cannot resolve package {import_path}: {message}")]
    Resolve {
        import_path: String,
        message: String,
    },

    #[error("expected package \"main\" for {import_path}, got {name:?}")]
    NotExecutable { import_path: String, name: String },

    #[error("no install directory known for {0}; set GOBIN")]
    NoInstallDir(String),

    #[error("file watcher error: {0}")]
    Watcher(#[from] notify::Error),

    #[error("go list output: {0}")]
    GoListJson(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RerunError>;

impl RerunError {
    pub fn resolve(import_path: impl Into<String>, message: impl Into<String>) -> Self {
        RerunError::Resolve {
            import_path: import_path.into(),
            message: message.into(),
        }
    }
}
