//! Network error types for frame encoding and decoding.

use thiserror::Error;

/// Errors that can occur while turning socket text into frames and back.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The text was not JSON at all
    #[error("frame is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),

    /// JSON that does not match any known frame type or payload shape
    #[error("frame does not match the protocol: {0}")]
    Schema(#[source] serde_json::Error),

    /// Failed to encode an outbound frame
    #[error("failed to encode frame: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Result type for frame operations
pub type Result<T> = std::result::Result<T, FrameError>;
