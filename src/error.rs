//! Error type shared by the store, search, resolve, and extract modules.
//!
//! Absence and corruption are not errors here: they are reported as values
//! ([`StoreLoad`](crate::store::StoreLoad), [`Resolution`](crate::resolve::Resolution),
//! [`ExtractOutcome`](crate::extract::ExtractOutcome)) so callers pick the
//! recovery. What remains are failures the caller cannot recover from locally.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PaperError>;

#[derive(Debug, Error)]
pub enum PaperError {
    /// A caller-supplied argument was rejected before any work was done.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The literature-search provider failed or returned an error feed.
    #[error("upstream search failed: {0}")]
    Upstream(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl PaperError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PaperError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<reqwest::Error> for PaperError {
    fn from(err: reqwest::Error) -> Self {
        PaperError::Upstream(err.to_string())
    }
}
