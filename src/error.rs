//! Error types for armonik-worker.

use thiserror::Error;

/// Main error type for all worker operations.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// A size header is missing, not hexadecimal, or declares more bytes than remain.
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    /// A text field (method name, data dependency) is not valid UTF-8.
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// The handler failed after a successful decode.
    #[error("Processing error: {0}")]
    Processing(String),

    /// No handler registered for the requested method name.
    #[error("Handler not found for method: {0}")]
    HandlerNotFound(String),

    /// Invalid or unreadable configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error (configuration files, result sinks).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error (configuration files).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// MsgPack serialization error.
    #[error("MsgPack encode error: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    /// MsgPack deserialization error.
    #[error("MsgPack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),
}

/// Coarse classification used in task statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Framing violation in the payload.
    MalformedFrame,
    /// Non UTF-8 text field.
    InvalidEncoding,
    /// Anything that went wrong after the payload was decoded.
    Processing,
}

impl WorkerError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkerError::MalformedFrame(_) => ErrorKind::MalformedFrame,
            WorkerError::InvalidEncoding(_) => ErrorKind::InvalidEncoding,
            _ => ErrorKind::Processing,
        }
    }

    /// Whether this error comes from decoding the payload.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::MalformedFrame | ErrorKind::InvalidEncoding
        )
    }
}

/// Result type alias using WorkerError.
pub type Result<T> = std::result::Result<T, WorkerError>;
