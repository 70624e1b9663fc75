//! Transport decoding error type.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputDecodingError {
    #[error("invalid hex payload: {0}")]
    InvalidHex(String),
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(String),
    #[error("unknown input encoding `{0}` (expected auto, hex, base64 or none)")]
    UnknownEncoding(String),
}
