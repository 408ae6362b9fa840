use std::time::Duration;

use thiserror::Error;

/// Terminal decoding/normalization failures. Any of these aborts the
/// session; partial frames are not errors and never reach this type.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("VarInt too long (max size: 5)")]
    VarIntTooLong,

    #[error("Invalid packet length: {0}")]
    InvalidPacketLength(i32),

    #[error("Status payload shorter than its length prefix")]
    TruncatedPayload,

    #[error("Invalid server address '{0}'! Should follow pattern 'host' or 'host:port'!")]
    InvalidAddress(String),

    #[error("Invalid status JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid favicon base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Status payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Everything `ping` can surface to the caller.
#[derive(Debug, Error)]
pub enum PingError {
    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("Connection error: {0}")]
    Transport(#[from] std::io::Error),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}
