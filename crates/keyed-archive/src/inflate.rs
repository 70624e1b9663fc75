//! zlib/deflate helpers: configured input decompression and the bounded
//! raw inflate used by content sniffing.

use std::io::Read;

use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};
use flate2::{Decompress, DecompressError, FlushDecompress, Status};
use thiserror::Error;
use tracing::info;

use crate::config::Decompression;
use crate::error::ArchiveError;

/// Upper bound on bytes produced by a single sniffing inflate.
pub const MAX_INFLATED_LEN: usize = 64 * 1024 * 1024;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, Error)]
pub enum InflateError {
    #[error("deflate stream ended before its final block")]
    Truncated,
    #[error("inflated output exceeds {MAX_INFLATED_LEN} bytes")]
    LimitExceeded,
    #[error(transparent)]
    Corrupt(#[from] DecompressError),
}

/// Inflates a raw deflate stream (no zlib or gzip header).
pub fn inflate_raw(bytes: &[u8]) -> Result<Vec<u8>, InflateError> {
    inflate_raw_with_limit(bytes, MAX_INFLATED_LEN)
}

pub(crate) fn inflate_raw_with_limit(bytes: &[u8], limit: usize) -> Result<Vec<u8>, InflateError> {
    let mut inflater = Decompress::new(false);
    let mut out = Vec::with_capacity(bytes.len().saturating_mul(4).clamp(64, limit.max(64)));
    loop {
        if out.len() == out.capacity() {
            if out.len() >= limit {
                return Err(InflateError::LimitExceeded);
            }
            let grow = out.len().max(64).min(limit - out.len());
            out.reserve_exact(grow);
        }
        let consumed = inflater.total_in() as usize;
        let produced = out.len();
        let status = inflater.decompress_vec(&bytes[consumed..], &mut out, FlushDecompress::Finish)?;
        match status {
            Status::StreamEnd => return Ok(out),
            Status::Ok | Status::BufError => {
                let stalled = inflater.total_in() as usize == consumed && out.len() == produced;
                if stalled && out.len() < out.capacity() {
                    return Err(InflateError::Truncated);
                }
            }
        }
    }
}

/// Applies the configured input decompression.
pub fn decompress_input(data: &[u8], decompression: &Decompression) -> Result<Vec<u8>, ArchiveError> {
    let Decompression::Zlib { window_bits } = *decompression;
    let mut out = Vec::new();
    let result = match window_bits {
        -15..=-8 => DeflateDecoder::new(data).read_to_end(&mut out),
        24..=31 => GzDecoder::new(data).read_to_end(&mut out),
        40..=47 if data.starts_with(&GZIP_MAGIC) => GzDecoder::new(data).read_to_end(&mut out),
        _ => ZlibDecoder::new(data).read_to_end(&mut out),
    };
    result.map_err(|source| ArchiveError::Decompression {
        algorithm: decompression.algorithm(),
        source,
    })?;
    info!(
        algorithm = decompression.algorithm(),
        window_bits,
        compressed = data.len(),
        decompressed = out.len(),
        "decompressed input"
    );
    Ok(out)
}
