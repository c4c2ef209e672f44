//! Client-side error types.

use std::io;
use thiserror::Error;

/// Result type for administrative client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while issuing an administrative command.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Failed to spawn the bridge process.
    #[error("failed to spawn bridge process: {0}")]
    SpawnFailed(#[source] io::Error),

    /// Failed to write to bridge stdin.
    #[error("failed to write to bridge: {0}")]
    WriteFailed(#[source] io::Error),

    /// Failed to release a client.
    #[error("failed to close client for {data_source}: {source}")]
    CloseFailed {
        data_source: String,
        #[source]
        source: io::Error,
    },

    /// Failed to serialize request to JSON.
    #[error("failed to serialize request: {0}")]
    SerializeFailed(#[source] serde_json::Error),

    /// Failed to deserialize response from JSON.
    #[error("failed to deserialize response: {0}")]
    DeserializeFailed(#[source] serde_json::Error),

    /// Request timed out waiting for response.
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// Bridge process exited unexpectedly.
    #[error("bridge process exited unexpectedly")]
    BridgeExited,

    /// Response channel was closed (internal error).
    #[error("response channel closed unexpectedly")]
    ChannelClosed,

    /// The client pool was released; no new clients are handed out.
    #[error("client pool has been released")]
    Released,

    /// The command was cancelled by the caller.
    #[error("command cancelled: {0}")]
    Cancelled(String),

    /// The server reported that the target entity does not exist.
    #[error("entity not found: {0}")]
    NotFound(String),

    /// The server returned an error response.
    #[error("server error: {message} (code: {code})")]
    Remote {
        /// Error code from the server.
        code: String,
        /// Error message from the server.
        message: String,
    },

    /// The command returned no result table.
    #[error("command returned no result table: {0}")]
    NoResult(String),

    /// A response column required by the record shape is missing.
    #[error("response to `{command}` is missing required columns: {}", missing.join(", "))]
    Shape {
        command: String,
        missing: Vec<String>,
    },

    /// A cell could not be converted to the record field type.
    #[error("response to `{command}` has invalid value in column {column}: {message}")]
    Decode {
        command: String,
        column: String,
        message: String,
    },
}

impl ClientError {
    /// Create a remote error from an error response.
    ///
    /// Codes that denote a missing entity are classified as [`ClientError::NotFound`].
    pub fn remote(code: impl Into<String>, message: impl Into<String>) -> Self {
        let code = code.into();
        let message = message.into();
        if is_not_found_code(&code) {
            Self::NotFound(message)
        } else {
            Self::Remote { code, message }
        }
    }

    /// Check if this error means the target entity does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this error was caused by caller cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// Check if this error indicates the bridge has exited.
    pub fn is_bridge_exited(&self) -> bool {
        matches!(self, Self::BridgeExited | Self::ChannelClosed)
    }
}

fn is_not_found_code(code: &str) -> bool {
    code.contains("EntityNotFound")
        || code.contains("DatabaseNotFound")
        || code.contains("TableNotFound")
        || code.ends_with("NotFound")
}

impl From<tokio::sync::oneshot::error::RecvError> for ClientError {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        Self::ChannelClosed
    }
}
