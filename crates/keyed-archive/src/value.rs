//! Primitive property-list values.
//!
//! This is the input alphabet of the archive decoder. Values are produced
//! by the `plist` crate and converted once; the rest of the crate never
//! touches `plist::Value` directly.

use std::fmt;
use std::io::Cursor;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

/// Key used by XML property lists to spell a UID as a one-entry dictionary.
const XML_UID_KEY: &str = "CF$UID";

#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveValue {
    Null,
    Bool(bool),
    Integer(i128),
    Float(f64),
    String(String),
    Date(DateTime<Utc>),
    Data(Vec<u8>),
    /// Index into the archive's `$objects` table.
    Reference(u64),
    Array(Vec<PrimitiveValue>),
    Mapping(IndexMap<String, PrimitiveValue>),
}

impl PrimitiveValue {
    /// Short name of the runtime shape, used in diagnostics.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "real",
            Self::String(_) => "string",
            Self::Date(_) => "date",
            Self::Data(_) => "data",
            Self::Reference(_) => "uid",
            Self::Array(_) => "array",
            Self::Mapping(_) => "dictionary",
        }
    }

    pub fn as_mapping(&self) -> Option<&IndexMap<String, PrimitiveValue>> {
        match self {
            Self::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[PrimitiveValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Data(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<u64> {
        match self {
            Self::Reference(index) => Some(*index),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i128> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value of an integer or real.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Looks up `key` if this value is a mapping.
    pub fn get(&self, key: &str) -> Option<&PrimitiveValue> {
        self.as_mapping().and_then(|m| m.get(key))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.as_mapping().is_some_and(|m| m.contains_key(key))
    }
}

/// Formats a real the way the tree printer shows numbers: shortest
/// round-trip form, integral values keep a trailing `.0`, and magnitudes
/// outside `1e-4..1e16` use a signed two-digit exponent (`1e+16`, `1.5e-05`).
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    let magnitude = value.abs();
    if value.is_finite() && magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let scientific = format!("{value:e}");
        if let Some((mantissa, exponent)) = scientific.split_once('e') {
            if let Ok(exponent) = exponent.parse::<i32>() {
                let sign = if exponent < 0 { '-' } else { '+' };
                return format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs());
            }
        }
    }
    format!("{value:?}")
}

impl fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("(null)"),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => f.write_str(&format_float(*x)),
            Self::String(s) => f.write_str(s),
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d %H:%M:%S")),
            Self::Data(bytes) => write!(f, "<{}>", hex::encode(bytes)),
            Self::Reference(index) => write!(f, "UID({index})"),
            Self::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_nested(f, item)?;
                }
                f.write_str("]")
            }
            Self::Mapping(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key:?}: ")?;
                    write_nested(f, value)?;
                }
                f.write_str("}")
            }
        }
    }
}

// Strings inside containers are quoted so element boundaries stay visible.
fn write_nested(f: &mut fmt::Formatter<'_>, value: &PrimitiveValue) -> fmt::Result {
    match value {
        PrimitiveValue::String(s) => write!(f, "{s:?}"),
        other => write!(f, "{other}"),
    }
}

// ── plist bridge ──────────────────────────────────────────────────────────

impl From<plist::Value> for PrimitiveValue {
    fn from(value: plist::Value) -> Self {
        match value {
            plist::Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            plist::Value::Dictionary(dictionary) => {
                if let Some(index) = xml_uid(&dictionary) {
                    return Self::Reference(index);
                }
                Self::Mapping(
                    dictionary
                        .into_iter()
                        .map(|(key, value)| (key, Self::from(value)))
                        .collect(),
                )
            }
            plist::Value::Boolean(b) => Self::Bool(b),
            plist::Value::Data(bytes) => Self::Data(bytes),
            plist::Value::Date(date) => Self::Date(DateTime::<Utc>::from(SystemTime::from(date))),
            plist::Value::Real(x) => Self::Float(x),
            plist::Value::Integer(i) => Self::Integer(
                i.as_signed()
                    .map(i128::from)
                    .or_else(|| i.as_unsigned().map(i128::from))
                    .unwrap_or_default(),
            ),
            plist::Value::String(s) => Self::String(s),
            plist::Value::Uid(uid) => Self::Reference(uid.get()),
            _ => Self::Null,
        }
    }
}

/// XML archives spell references as `<dict><key>CF$UID</key><integer>N</integer></dict>`.
fn xml_uid(dictionary: &plist::Dictionary) -> Option<u64> {
    if dictionary.len() != 1 {
        return None;
    }
    dictionary
        .get(XML_UID_KEY)
        .and_then(|v| v.as_unsigned_integer())
}

/// Parses binary or XML property-list bytes.
pub fn parse_property_list(bytes: &[u8]) -> Result<PrimitiveValue, plist::Error> {
    plist::Value::from_reader(Cursor::new(bytes)).map(PrimitiveValue::from)
}
