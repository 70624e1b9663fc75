//! Tree-drawing text helpers and per-dump render state.

use std::collections::HashSet;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::config::{DumpEncoding, DumpLength};
use crate::error::ArchiveError;
use crate::nodes::NodeId;

/// Maximum nesting of node renders (including nested archives) in one dump.
pub const MAX_RENDER_DEPTH: usize = 256;

/// Column width of hex/base64 dump lines.
pub const DUMP_LINE_WIDTH: usize = 76;

const BRANCH: &str = "├─  ";
const LAST_BRANCH: &str = "╰─  ";
const CONTINUATION: &str = "│   ";

/// Mutable state threaded through one `dump_string` call.
///
/// `seen` holds every instance already expanded in this dump; a second
/// visit renders as a one-line back-reference. `depth` counts nested
/// renders and is bounded by `max_depth`.
#[derive(Debug, Clone)]
pub struct RenderContext {
    seen: HashSet<NodeId>,
    depth: usize,
    max_depth: usize,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderContext {
    pub fn new() -> Self {
        Self::with_max_depth(MAX_RENDER_DEPTH)
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            seen: HashSet::new(),
            depth: 0,
            max_depth,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Records `id` as expanded. Returns `false` if it already was.
    pub fn enter(&mut self, id: NodeId) -> bool {
        self.seen.insert(id)
    }

    pub fn has_seen(&self, id: NodeId) -> bool {
        self.seen.contains(&id)
    }

    /// Runs `render` one level deeper.
    pub fn descend<T>(
        &mut self,
        render: impl FnOnce(&mut Self) -> Result<T, ArchiveError>,
    ) -> Result<T, ArchiveError> {
        if self.depth >= self.max_depth {
            return Err(ArchiveError::DepthLimitExceeded(self.max_depth));
        }
        self.depth += 1;
        let result = render(self);
        self.depth -= 1;
        result
    }

    /// Context for an archive nested in a data blob: node ids restart, so
    /// `seen` is fresh, but depth carries over.
    pub fn nested(&self) -> Result<Self, ArchiveError> {
        if self.depth >= self.max_depth {
            return Err(ArchiveError::DepthLimitExceeded(self.max_depth));
        }
        Ok(Self {
            seen: HashSet::new(),
            depth: self.depth + 1,
            max_depth: self.max_depth,
        })
    }
}

// ── Tree text ─────────────────────────────────────────────────────────────

/// Prefixes a sibling entry with a branch glyph.
///
/// Multi-line entries keep `├─` on their first line and `│` on the lines
/// after it; the final line of the last sibling closes with `╰─`.
pub fn indent_item(text: &str, is_last: bool) -> String {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    match lines.as_slice() {
        [] => String::from(if is_last { LAST_BRANCH } else { BRANCH }),
        [only] => format!("{}{only}", if is_last { LAST_BRANCH } else { BRANCH }),
        [first, middle @ .., last] => {
            let mut out = String::with_capacity(text.len() + lines.len() * 8);
            out.push_str(BRANCH);
            out.push_str(first);
            for line in middle {
                out.push_str(CONTINUATION);
                out.push_str(line);
            }
            out.push_str(if is_last { LAST_BRANCH } else { CONTINUATION });
            out.push_str(last);
            out
        }
    }
}

/// Hangs the lines after the first under a `│` rule `width` columns wide,
/// closing the last one with `╰─`.
pub fn indent_continuation(text: &str, width: usize) -> String {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let [first, middle @ .., last] = lines.as_slice() else {
        return text.to_string();
    };
    let rule = format!("│{}", " ".repeat(width.saturating_sub(1)));
    let last_rule = format!("╰─{}", " ".repeat(width.saturating_sub(2)));
    let mut out = String::with_capacity(text.len() + lines.len() * (width + 4));
    out.push_str(first);
    for line in middle {
        out.push_str(&rule);
        out.push_str(line);
    }
    out.push_str(&last_rule);
    out.push_str(last);
    out
}

/// Hard-wraps `text` every `width` characters.
pub fn wrap_to_width(text: &str, width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(width.max(1))
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Hex or base64 dump of at most `length` bytes, wrapped at
/// [`DUMP_LINE_WIDTH`], followed by `[+ N bytes]` when truncated.
pub fn encode_dump(bytes: &[u8], encoding: DumpEncoding, length: DumpLength) -> String {
    let shown = match length.limit() {
        Some(limit) => &bytes[..limit.min(bytes.len())],
        None => bytes,
    };
    let omitted = bytes.len() - shown.len();
    let encoded = match encoding {
        DumpEncoding::Hex => hex::encode(shown),
        DumpEncoding::Base64 => STANDARD.encode(shown),
    };
    let mut dump = wrap_to_width(&encoded, DUMP_LINE_WIDTH);
    if omitted > 0 {
        dump.push_str(&format!("\n[+ {omitted} bytes]"));
    }
    dump
}
