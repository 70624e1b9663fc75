//! Error types for archive decoding.

use keyed_archive_transport::InputDecodingError;
use thiserror::Error;

/// Invalid [`InputOutputConfiguration`](crate::InputOutputConfiguration) input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unsupported compression algorithm `{0}` (expected zlib)")]
    UnsupportedCompression(String),
    #[error("invalid compression specification `{0}` (expected ALGORITHM[:OPTION])")]
    InvalidCompressionSpec(String),
    #[error("invalid {algorithm} option `{option}`: {reason}")]
    InvalidCompressionOption {
        algorithm: &'static str,
        option: String,
        reason: String,
    },
    #[error("unknown dump encoding `{0}` (expected hex or base64)")]
    UnknownDumpEncoding(String),
}

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("missing input data")]
    MissingInput,
    #[error("unable to decode input text: {0}")]
    InputDecoding(#[from] InputDecodingError),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("unable to decompress input with {algorithm}: {source}")]
    Decompression {
        algorithm: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to parse property list: {0}")]
    PropertyList(#[from] plist::Error),
    #[error("decoded property list is {found}, expected a dictionary with $objects key")]
    MalformedArchive { found: String },
    #[error("unable to classify record at index {index}: {shape} `{value}`")]
    UnclassifiedRecord {
        index: usize,
        shape: &'static str,
        value: String,
    },
    #[error("key path `{keypath}`: {reason}")]
    KeyPath { keypath: String, reason: String },
    #[error("object graph nested deeper than {0} levels")]
    DepthLimitExceeded(usize),
    #[error("SQLite: {0}")]
    Sqlite(#[from] rusqlite::Error),
}
