//! Error types for the snapshot converter.

use std::path::PathBuf;

use thiserror::Error;

/// Application-wide error type.
///
/// A cycle that hits any of these (except the locally-recovered record drops,
/// which never surface as errors) is aborted without publishing a snapshot.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Network, HTTP-status or body-decode failure on a backend call.
    /// Timeouts surface here as well.
    #[error("API request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The configured contest id is missing from the backend's contest list.
    #[error("contest {0} not found in backend response")]
    ContestNotFound(String),

    /// A judgement carried an outcome code outside the known vocabulary.
    /// Publishing a guess would misinform the public scoreboard, so this
    /// aborts the cycle instead.
    #[error("unknown judging outcome: {0}")]
    UnknownVerdict(String),

    /// A contest-level field came back in a shape we cannot interpret.
    #[error("malformed {field} in backend response: {value}")]
    MalformedField { field: &'static str, value: String },

    /// Snapshot document serialization failed.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Writing an output document failed.
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invalid or incomplete configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type alias using FeedError
pub type FeedResult<T> = Result<T, FeedError>;
