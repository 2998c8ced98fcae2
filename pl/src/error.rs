//! Loader error types

use std::path::PathBuf;
use thiserror::Error;

/// Boxed error returned by template engines when a partial is rejected
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while validating loader options
///
/// These are always raised before the filesystem is touched.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("'{field}' is required by partials-loader")]
    Missing { field: &'static str },

    #[error("'{field}' must be {expected}, got {found}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("'{field}' must contain only strings, element {index} is {found}")]
    NotAString {
        field: &'static str,
        index: usize,
        found: &'static str,
    },

    #[error("'{field}' must not be an empty list")]
    Empty { field: &'static str },
}

/// Errors that abort a `register_partials` call
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("Invalid options: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Engine rejected partial '{name}': {source}")]
    Register {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("Path {path} is not below root {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },
}

impl LoaderError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Check if this error was raised before any filesystem access
    pub fn is_config(&self) -> bool {
        matches!(self, LoaderError::Config(_))
    }
}
