//! Error types for builder-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading or saving `~/.builder/*.yaml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure, annotated with the file involved.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with the offending file.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}

/// Field-level failure of the origin name input.
///
/// `NameTaken` and `CheckUnavailable` come from the remote availability
/// check; the rest are decided locally before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("an origin name is required")]
    Required,

    #[error("origin names may be at most {max} characters")]
    TooLong { max: usize },

    #[error(
        "origin names may only contain lowercase letters, digits, '-' and '_', \
         and must start with a letter or digit"
    )]
    InvalidCharacters,

    #[error("this origin name is already taken")]
    NameTaken,

    /// The availability check itself failed (network or auth). Soft failure:
    /// the field stays invalid but the user is told to retry, not to rename.
    #[error("could not check origin availability; try again")]
    CheckUnavailable,
}

/// Failure of a `createOrigin` submission, recorded in the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("origin name is already taken")]
    NameTaken,

    #[error("authentication token was rejected")]
    Unauthorized,

    #[error("network error: {0}")]
    Network(String),

    #[error("server rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected error: {0}")]
    Unexpected(String),
}
