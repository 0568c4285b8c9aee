//! Error types for the store, the markup writer and the query collaborator.
//!
//! These never escape the operation boundaries of the editor: callers log them
//! and degrade to "feature unavailable" (empty store, empty listing, retry on
//! next save).

use std::path::PathBuf;

/// Failures while reading or writing a persisted JSON store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store file does not exist.
    #[error("store file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file exists but could not be read or written.
    #[error("io error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file content is not a valid store document.
    #[error("malformed store {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The in-memory items could not be serialised.
    #[error("failed to serialise store: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Regenerating the derived markup failed.
    #[error(transparent)]
    Markup(#[from] MarkupError),
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::NotFound(path);
        }
        Self::Io { path, source }
    }

    pub fn parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }
}

/// Failures while serialising or writing a markup document.
#[derive(Debug, thiserror::Error)]
pub enum MarkupError {
    #[error("xml writer error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("io error writing {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures reported by the host query collaborator.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// No backend answers this request.
    #[error("query backend unavailable for {0}")]
    Unavailable(String),

    /// The backend answered with an error object.
    #[error("{method} failed: {message}")]
    Rpc { method: String, message: String },

    /// The answer did not have the expected shape.
    #[error("malformed response for {method}: {message}")]
    Malformed { method: String, message: String },
}

/// Failures while installing the log subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LogInitError {
    #[error("cannot open log file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("a global log subscriber is already installed")]
    AlreadyInstalled,
}
