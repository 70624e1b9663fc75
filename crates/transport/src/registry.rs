//! Decoder registry and encoding auto-detection.

use tracing::debug;

use crate::{
    Base64Decoder, DecodedInput, HexDecoder, InputDecodingError, InputEncoding, TransportDecoder,
};

/// Every concrete transport decoder, in declaration order.
pub struct Decoders {
    pub hex: HexDecoder,
    pub base64: Base64Decoder,
}

impl Default for Decoders {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoders {
    pub fn new() -> Self {
        Self {
            hex: HexDecoder::new(),
            base64: Base64Decoder::new(),
        }
    }

    pub fn all(&self) -> [&dyn TransportDecoder; 2] {
        [&self.hex, &self.base64]
    }

    /// Runs every decoder and returns the surviving candidates, best first.
    ///
    /// Candidates are ordered by encoded run length, then by decoder priority.
    /// Decoders that fail are dropped.
    pub fn rank(&self, input: &[u8]) -> Vec<(&'static str, DecodedInput, u8)> {
        let mut candidates = Vec::new();
        for decoder in self.all() {
            match decoder.decode(input) {
                Ok(Some(decoded)) => candidates.push((decoder.id(), decoded, decoder.priority())),
                Ok(None) => debug!(decoder = decoder.id(), "no encoded run found"),
                Err(e) => debug!(decoder = decoder.id(), error = %e, "decoder rejected input"),
            }
        }
        candidates.sort_by(|(_, a, pa), (_, b, pb)| {
            b.encoded_len.cmp(&a.encoded_len).then_with(|| pb.cmp(pa))
        });
        candidates
    }
}

/// Recovers the binary payload from `input` according to `encoding`.
///
/// Finding nothing is not an error: explicit modes then yield an empty
/// payload, and `auto` falls back to passing the input through.
pub fn guess_encoding(
    input: &[u8],
    encoding: InputEncoding,
) -> Result<DecodedInput, InputDecodingError> {
    let decoders = Decoders::new();
    let explicit: &dyn TransportDecoder = match encoding {
        InputEncoding::None => return Ok(DecodedInput::identity(input)),
        InputEncoding::Hex => &decoders.hex,
        InputEncoding::Base64 => &decoders.base64,
        InputEncoding::Auto => {
            let picked = decoders
                .rank(input)
                .into_iter()
                .next()
                .map(|(_, decoded, _)| decoded)
                .filter(|decoded| !decoded.data.is_empty())
                .unwrap_or_else(|| DecodedInput::identity(input));
            debug!(encoding = %picked.encoding, "auto-detected input encoding");
            return Ok(picked);
        }
    };
    Ok(explicit.decode(input)?.unwrap_or(DecodedInput {
        encoding: explicit.encoding(),
        encoded_len: 0,
        data: Vec::new(),
    }))
}
