//! Decoding many archives at once, each tagged with caller metadata.

use std::fmt;

use tracing::debug;

use crate::archive::Archive;
use crate::config::InputOutputConfiguration;
use crate::error::ArchiveError;

/// Outcome of decoding one row. Empty input yields neither an archive nor
/// an error.
#[derive(Debug)]
pub struct BatchRow<M> {
    pub archive: Option<Archive>,
    pub metadata: M,
    pub error: Option<ArchiveError>,
}

impl<M: fmt::Display> BatchRow<M> {
    /// The metadata line (when non-empty) followed by the archive dump,
    /// the error, or `(null)`.
    pub fn dump_string(&self) -> String {
        let mut out = String::new();
        let metadata = self.metadata.to_string();
        if !metadata.is_empty() {
            out.push_str(&metadata);
            out.push('\n');
        }
        match (&self.archive, &self.error) {
            (Some(archive), _) => match archive.dump_string() {
                Ok(dump) => out.push_str(&dump),
                Err(e) => out.push_str(&format!("error: {e}\n")),
            },
            (None, Some(e)) => out.push_str(&format!("error: {e}\n")),
            (None, None) => out.push_str("(null)\n"),
        }
        out
    }
}

/// Decodes every `(bytes, metadata)` row; one row failing never stops the
/// batch. Rows are transport-decoded per `configuration.input_encoding`.
pub fn decode_batch<B, M, I>(rows: I, configuration: &InputOutputConfiguration) -> Vec<BatchRow<M>>
where
    B: AsRef<[u8]>,
    I: IntoIterator<Item = (B, M)>,
{
    rows.into_iter()
        .enumerate()
        .map(|(index, (bytes, metadata))| {
            let bytes = bytes.as_ref();
            if bytes.is_empty() {
                debug!(row = index, "empty row");
                return BatchRow {
                    archive: None,
                    metadata,
                    error: None,
                };
            }
            match Archive::from_encoded_bytes(bytes, configuration.clone()) {
                Ok(archive) => BatchRow {
                    archive: Some(archive),
                    metadata,
                    error: None,
                },
                Err(e) => {
                    debug!(row = index, error = %e, "row failed to decode");
                    BatchRow {
                        archive: None,
                        metadata,
                        error: Some(e),
                    }
                }
            }
        })
        .collect()
}
