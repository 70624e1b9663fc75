//! Hex transport decoder.
//!
//! Accepts `<0a1b 2c3d>` style dumps as printed by `NSData.description` as
//! well as bare hex runs. Bracketed runs are preferred when present.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{longest_run, strip_whitespace};
use crate::{DecodedInput, InputDecodingError, TransportDecoder, TransportEncoding};

static BRACKETED_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([A-Fa-f\s0-9]+)>").expect("valid hex regex"));
static BARE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Fa-f\s0-9]+)").expect("valid hex regex"));

#[derive(Debug, Default, Clone, Copy)]
pub struct HexDecoder;

impl HexDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl TransportDecoder for HexDecoder {
    fn id(&self) -> &'static str {
        "hex"
    }

    fn encoding(&self) -> TransportEncoding {
        TransportEncoding::Hex
    }

    fn priority(&self) -> u8 {
        1
    }

    fn decode(&self, input: &[u8]) -> Result<Option<DecodedInput>, InputDecodingError> {
        if !input.is_ascii() {
            return Ok(None);
        }
        // ASCII is always valid UTF-8.
        let text = std::str::from_utf8(input).map_err(|e| InputDecodingError::InvalidHex(e.to_string()))?;

        let run = match longest_run(&BRACKETED_RUN, text) {
            Some(run) => run,
            None => match longest_run(&BARE_RUN, text) {
                Some(run) => run,
                None => return Ok(None),
            },
        };
        let encoded = strip_whitespace(run);
        let data = hex::decode(&encoded).map_err(|e| InputDecodingError::InvalidHex(e.to_string()))?;
        Ok(Some(DecodedInput {
            encoding: TransportEncoding::Hex,
            encoded_len: encoded.len(),
            data,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_bare_run() {
        let out = HexDecoder::new().decode(b"6170706c65").unwrap().unwrap();
        assert_eq!(out.data, b"apple");
        assert_eq!(out.encoded_len, 10);
    }

    #[test]
    fn prefers_bracketed_run_and_strips_whitespace() {
        let input = b"ffffffffffffffffffff  <6170 706c\n65>";
        let out = HexDecoder::new().decode(input).unwrap().unwrap();
        assert_eq!(out.data, b"apple");
    }

    #[test]
    fn non_ascii_yields_nothing() {
        assert_eq!(HexDecoder::new().decode(&[0x62, 0xff, 0x00]).unwrap(), None);
    }

    #[test]
    fn odd_length_run_is_an_error() {
        assert!(matches!(
            HexDecoder::new().decode(b"abc"),
            Err(InputDecodingError::InvalidHex(_))
        ));
    }
}
