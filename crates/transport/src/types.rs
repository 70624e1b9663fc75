//! Common transport decoder trait and value types.

use std::fmt;
use std::str::FromStr;

use crate::InputDecodingError;

/// Transport encoding requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InputEncoding {
    /// Try every decoder and keep the best candidate.
    #[default]
    Auto,
    Hex,
    Base64,
    /// Pass the input through unchanged.
    None,
}

impl InputEncoding {
    pub fn id(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Hex => "hex",
            Self::Base64 => "base64",
            Self::None => "none",
        }
    }
}

impl fmt::Display for InputEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for InputEncoding {
    type Err = InputDecodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "hex" => Ok(Self::Hex),
            "base64" => Ok(Self::Base64),
            "none" => Ok(Self::None),
            _ => Err(InputDecodingError::UnknownEncoding(s.to_owned())),
        }
    }
}

/// Encoding that actually produced a [`DecodedInput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportEncoding {
    Identity,
    Hex,
    Base64,
}

impl fmt::Display for TransportEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Identity => "none",
            Self::Hex => "hex",
            Self::Base64 => "base64",
        })
    }
}

/// Payload recovered from a transport-encoded input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedInput {
    pub encoding: TransportEncoding,
    /// Length of the encoded run the payload was decoded from.
    pub encoded_len: usize,
    pub data: Vec<u8>,
}

impl DecodedInput {
    pub fn identity(input: &[u8]) -> Self {
        Self {
            encoding: TransportEncoding::Identity,
            encoded_len: input.len(),
            data: input.to_vec(),
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// Trait for decoders that reverse one binary-to-text transport encoding.
pub trait TransportDecoder {
    fn id(&self) -> &'static str;
    fn encoding(&self) -> TransportEncoding;
    /// Tie-break rank among candidates of equal length; higher wins.
    fn priority(&self) -> u8;
    /// Returns `Ok(None)` when the input holds nothing in this decoder's alphabet.
    fn decode(&self, input: &[u8]) -> Result<Option<DecodedInput>, InputDecodingError>;
}

/// Returns the longest capture of group 1 in `text`; the first one wins among equals.
pub(crate) fn longest_run<'t>(regex: &regex::Regex, text: &'t str) -> Option<&'t str> {
    let mut best: Option<&'t str> = None;
    for captures in regex.captures_iter(text) {
        if let Some(run) = captures.get(1) {
            if best.map_or(true, |b| run.as_str().len() > b.len()) {
                best = Some(run.as_str());
            }
        }
    }
    best
}

pub(crate) fn strip_whitespace(run: &str) -> String {
    run.chars().filter(|c| !c.is_whitespace()).collect()
}
