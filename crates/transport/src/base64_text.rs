//! Base64 transport decoder (standard alphabet, canonical padding).

use std::sync::LazyLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use regex::Regex;

use crate::types::{longest_run, strip_whitespace};
use crate::{DecodedInput, InputDecodingError, TransportDecoder, TransportEncoding};

static RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z\s0-9+/=]+)").expect("valid base64 regex"));

#[derive(Debug, Default, Clone, Copy)]
pub struct Base64Decoder;

impl Base64Decoder {
    pub fn new() -> Self {
        Self
    }
}

impl TransportDecoder for Base64Decoder {
    fn id(&self) -> &'static str {
        "base64"
    }

    fn encoding(&self) -> TransportEncoding {
        TransportEncoding::Base64
    }

    fn priority(&self) -> u8 {
        0
    }

    fn decode(&self, input: &[u8]) -> Result<Option<DecodedInput>, InputDecodingError> {
        if !input.is_ascii() {
            return Ok(None);
        }
        let text =
            std::str::from_utf8(input).map_err(|e| InputDecodingError::InvalidBase64(e.to_string()))?;
        let Some(run) = longest_run(&RUN, text) else {
            return Ok(None);
        };
        let encoded = strip_whitespace(run);
        let data = STANDARD
            .decode(&encoded)
            .map_err(|e| InputDecodingError::InvalidBase64(e.to_string()))?;
        Ok(Some(DecodedInput {
            encoding: TransportEncoding::Base64,
            encoded_len: encoded.len(),
            data,
        }))
    }
}
