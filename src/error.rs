use std::path::PathBuf;

use thiserror::Error;

/// Errors a transfer can terminate with.
///
/// Every failure collapses into the single error slot of a transfer, so the
/// variants carry enough context to be shown to a user as-is.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The URL could not be parsed or uses an unsupported scheme.
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// The HTTP client for the transfer could not be built.
    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("chunk size must be greater than 0")]
    InvalidChunkSize,

    #[error("invalid header: {name}")]
    InvalidHeader { name: String },

    /// Connection, TLS, redirect or body read failure.
    #[error("network error downloading {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("HTTP {status} downloading {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error writing to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The transfer was cancelled by the caller.
    #[error("download cancelled")]
    Cancelled,

    /// The transfer task stopped without reaching an outcome, e.g. it panicked.
    #[error("transfer task ended unexpectedly")]
    Aborted,
}

impl DownloadError {
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, DownloadError>;
