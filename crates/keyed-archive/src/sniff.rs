//! Best-effort reinterpretation of opaque byte blobs.
//!
//! Stages run in [`STAGES`] order and the first that recognises the bytes
//! wins. A stage that does not recognise its input is not an error; only
//! the render depth guard propagates out of here.

use tracing::debug;

use crate::archive::Archive;
use crate::config::InputOutputConfiguration;
use crate::error::ArchiveError;
use crate::inflate::inflate_raw;
use crate::render::{encode_dump, RenderContext};
use crate::value::parse_property_list;

/// `(text, label)` produced by a recognising stage.
pub type SniffedText = (String, String);

type SniffStage =
    fn(&[u8], &InputOutputConfiguration, &RenderContext) -> Result<Option<SniffedText>, ArchiveError>;

/// Sniffing stages and the label each one attaches.
pub const STAGES: &[(&str, SniffStage)] = &[
    ("keyed archive", sniff_keyed_archive),
    ("zlib compressed", sniff_deflate),
    ("JSON", sniff_json),
];

/// Returns display text for `bytes` and, when a stage recognised them, a
/// content label such as `keyed archive` or `zlib compressed, JSON`.
///
/// Unrecognised bytes fall back to a hex or base64 dump limited to the
/// configured length.
pub fn ascii_dump_for_data(
    bytes: &[u8],
    configuration: &InputOutputConfiguration,
    ctx: &RenderContext,
) -> Result<(String, Option<String>), ArchiveError> {
    if !configuration.dont_decode_data {
        for (label, stage) in STAGES {
            if let Some((text, content_type)) = stage(bytes, configuration, ctx)? {
                debug!(stage = label, len = bytes.len(), "recognised data");
                return Ok((text, Some(content_type)));
            }
        }
    }
    let dump = encode_dump(
        bytes,
        configuration.output_dump_encoding,
        configuration.output_dump_length,
    );
    Ok((dump, None))
}

fn sniff_keyed_archive(
    bytes: &[u8],
    configuration: &InputOutputConfiguration,
    ctx: &RenderContext,
) -> Result<Option<SniffedText>, ArchiveError> {
    let value = match parse_property_list(bytes) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "data is not a property list");
            return Ok(None);
        }
    };
    let mut child_ctx = ctx.nested()?;
    let child = match Archive::build_with(value, configuration.for_child_archive(), &child_ctx) {
        Ok(child) => child,
        Err(e @ ArchiveError::DepthLimitExceeded(_)) => return Err(e),
        Err(e) => {
            debug!(error = %e, "data is not a keyed archive");
            return Ok(None);
        }
    };
    let text = child.dump_string_with(&mut child_ctx)?;
    Ok(Some((text.trim().to_string(), "keyed archive".to_string())))
}

fn sniff_deflate(
    bytes: &[u8],
    configuration: &InputOutputConfiguration,
    ctx: &RenderContext,
) -> Result<Option<SniffedText>, ArchiveError> {
    let inflated = match inflate_raw(bytes) {
        Ok(inflated) => inflated,
        Err(e) => {
            debug!(error = %e, "data is not a deflate stream");
            return Ok(None);
        }
    };
    let (text, inner) = ascii_dump_for_data(&inflated, configuration, &ctx.nested()?)?;
    let label = match inner {
        Some(inner) => format!("zlib compressed, {inner}"),
        None => "zlib compressed".to_string(),
    };
    Ok(Some((text, label)))
}

fn sniff_json(
    bytes: &[u8],
    _configuration: &InputOutputConfiguration,
    _ctx: &RenderContext,
) -> Result<Option<SniffedText>, ArchiveError> {
    let value = match serde_json::from_slice::<serde_json::Value>(bytes) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "data is not JSON");
            return Ok(None);
        }
    };
    match serde_json::to_string_pretty(&value) {
        Ok(text) => Ok(Some((text, "JSON".to_string()))),
        Err(e) => {
            debug!(error = %e, "unable to pretty-print JSON");
            Ok(None)
        }
    }
}
