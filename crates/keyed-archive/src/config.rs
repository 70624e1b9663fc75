//! Input/output configuration shared by parsing, sniffing and rendering.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use keyed_archive_transport::InputEncoding;
use regex::Regex;

use crate::error::ConfigError;

/// Number of bytes shown in a data dump unless configured otherwise.
pub const DEFAULT_DUMP_LENGTH: usize = 32;

/// Window bits used by `zlib` without an explicit option.
pub const DEFAULT_WINDOW_BITS: i32 = 15;

static COMPRESSION_SPEC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\w+)(?::(-?\w+))?$").expect("valid compression spec regex")
});

// ── Dump encoding ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DumpEncoding {
    #[default]
    Hex,
    Base64,
}

impl fmt::Display for DumpEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hex => "hex",
            Self::Base64 => "base64",
        })
    }
}

impl FromStr for DumpEncoding {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hex" => Ok(Self::Hex),
            "base64" => Ok(Self::Base64),
            _ => Err(ConfigError::UnknownDumpEncoding(s.to_string())),
        }
    }
}

// ── Dump length ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpLength {
    Limited(usize),
    Unlimited,
}

impl Default for DumpLength {
    fn default() -> Self {
        Self::Limited(DEFAULT_DUMP_LENGTH)
    }
}

impl DumpLength {
    /// Command-line convention: any negative count means no limit.
    pub fn from_signed(n: i64) -> Self {
        usize::try_from(n).map_or(Self::Unlimited, Self::Limited)
    }

    pub fn limit(self) -> Option<usize> {
        match self {
            Self::Limited(n) => Some(n),
            Self::Unlimited => None,
        }
    }
}

// ── Decompression ─────────────────────────────────────────────────────────

/// Decompression applied to the input before property-list parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decompression {
    /// `window_bits` follows zlib: 8..=15 expects a zlib header, -15..=-8
    /// raw deflate, 24..=31 a gzip header, 40..=47 either header. 0 reads
    /// the window size from the zlib header.
    Zlib { window_bits: i32 },
}

impl Default for Decompression {
    fn default() -> Self {
        Self::Zlib {
            window_bits: DEFAULT_WINDOW_BITS,
        }
    }
}

impl Decompression {
    pub fn algorithm(&self) -> &'static str {
        match self {
            Self::Zlib { .. } => "zlib",
        }
    }
}

fn valid_window_bits(bits: i32) -> bool {
    matches!(bits, 0 | 8..=15 | -15..=-8 | 24..=31 | 40..=47)
}

impl FromStr for Decompression {
    type Err = ConfigError;

    /// Parses `ALGORITHM[:OPTION]`, e.g. `zlib` or `zlib:-15`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = COMPRESSION_SPEC
            .captures(s)
            .ok_or_else(|| ConfigError::InvalidCompressionSpec(s.to_string()))?;
        let algorithm = &captures[1];
        if !algorithm.eq_ignore_ascii_case("zlib") {
            return Err(ConfigError::UnsupportedCompression(algorithm.to_string()));
        }
        let window_bits = match captures.get(2) {
            None => DEFAULT_WINDOW_BITS,
            Some(option) => {
                let invalid = |reason: &str| ConfigError::InvalidCompressionOption {
                    algorithm: "zlib",
                    option: option.as_str().to_string(),
                    reason: reason.to_string(),
                };
                let bits: i32 = option
                    .as_str()
                    .parse()
                    .map_err(|_| invalid("window bits must be an integer"))?;
                if !valid_window_bits(bits) {
                    return Err(invalid("window bits out of range"));
                }
                bits
            }
        };
        Ok(Self::Zlib { window_bits })
    }
}

impl fmt::Display for Decompression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zlib { window_bits } => write!(f, "zlib:{window_bits}"),
        }
    }
}

// ── InputOutputConfiguration ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputOutputConfiguration {
    pub output_dump_encoding: DumpEncoding,
    pub output_dump_length: DumpLength,
    pub input_data_offset: usize,
    pub input_data_decompression: Option<Decompression>,
    /// Disables content sniffing; every blob is dumped as hex/base64.
    pub dont_decode_data: bool,
    pub input_encoding: InputEncoding,
}

impl InputOutputConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output_dump_encoding(mut self, encoding: DumpEncoding) -> Self {
        self.output_dump_encoding = encoding;
        self
    }

    pub fn with_output_dump_length(mut self, length: DumpLength) -> Self {
        self.output_dump_length = length;
        self
    }

    pub fn with_input_data_offset(mut self, offset: usize) -> Self {
        self.input_data_offset = offset;
        self
    }

    pub fn with_input_data_decompression(mut self, decompression: Option<Decompression>) -> Self {
        self.input_data_decompression = decompression;
        self
    }

    pub fn with_dont_decode_data(mut self, dont_decode_data: bool) -> Self {
        self.dont_decode_data = dont_decode_data;
        self
    }

    pub fn with_input_encoding(mut self, encoding: InputEncoding) -> Self {
        self.input_encoding = encoding;
        self
    }

    /// Configuration for an archive found inside a data blob: the blob is
    /// already binary, so no offset, decompression or transport decoding.
    pub fn for_child_archive(&self) -> Self {
        Self {
            input_data_offset: 0,
            input_data_decompression: None,
            input_encoding: InputEncoding::None,
            ..self.clone()
        }
    }
}
