//! Error types shared across the crate.

use thiserror::Error;

/// Result alias for calls against the remote collaborators.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Failures talking to the catalog or favorites services.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport-level failure (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-2xx status.
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    /// The body was not the JSON shape we expected.
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A configured base URL could not be turned into an endpoint.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Local I/O (writing a downloaded stream).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// No collaborator path yielded a playable URL.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("no stream found for track {0}")]
    NoStreamFound(String),
}

/// The audio output refused to start playback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackStartError {
    /// A source change interrupted an in-flight start. Expected churn.
    #[error("playback start aborted by a source change")]
    Aborted,

    /// Decode failure, device failure or anything else that is not churn.
    #[error("playback failed to start: {0}")]
    Failed(String),
}

impl PlaybackStartError {
    pub fn is_abort(&self) -> bool {
        matches!(self, PlaybackStartError::Aborted)
    }
}

/// Failures raised on the audio thread.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("no audio output device: {0}")]
    Device(String),

    #[error("stream fetch failed: {0}")]
    Fetch(String),

    #[error("stream decode failed: {0}")]
    Decode(String),
}
