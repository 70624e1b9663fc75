//! Transport-encoding detection for keyed archive input.
//!
//! Archived blobs are often copied out of logs, debuggers or database
//! consoles as hex (`<62706c69 73743030 ...>`) or base64 text. This crate
//! recovers the binary payload before it reaches the property-list parser.
//!
//! # Example
//!
//! ```
//! use keyed_archive_transport::{guess_encoding, InputEncoding, TransportEncoding};
//!
//! let decoded = guess_encoding(b"<62706c69 73743030>", InputEncoding::Auto).unwrap();
//! assert_eq!(decoded.encoding, TransportEncoding::Hex);
//! assert_eq!(decoded.data, b"bplist00");
//! ```

mod base64_text;
mod error;
mod hex_text;
mod registry;
mod types;

pub use base64_text::Base64Decoder;
pub use error::InputDecodingError;
pub use hex_text::HexDecoder;
pub use registry::{guess_encoding, Decoders};
pub use types::{DecodedInput, InputEncoding, TransportDecoder, TransportEncoding};
