//! Dotted key-path lookup into ordinary property lists.
//!
//! Preference files and other plists often embed an archive as a data
//! value, e.g. `Window.State` in a defaults domain.

use crate::archive::Archive;
use crate::config::InputOutputConfiguration;
use crate::error::ArchiveError;
use crate::value::{parse_property_list, PrimitiveValue};

/// Follows `keypath` (`a.b.c`) through nested dictionaries. Array
/// elements can be addressed by decimal index.
pub fn value_for_keypath<'v>(
    value: &'v PrimitiveValue,
    keypath: &str,
) -> Result<&'v PrimitiveValue, ArchiveError> {
    let failure = |reason: String| ArchiveError::KeyPath {
        keypath: keypath.to_string(),
        reason,
    };
    let mut current = value;
    for element in keypath.split('.') {
        current = match current {
            PrimitiveValue::Mapping(mapping) => mapping
                .get(element)
                .ok_or_else(|| failure(format!("no value for key `{element}`")))?,
            PrimitiveValue::Array(items) => element
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get(index))
                .ok_or_else(|| failure(format!("no array element `{element}`")))?,
            other => {
                return Err(failure(format!(
                    "cannot look up `{element}` in a {}",
                    other.shape()
                )))
            }
        };
    }
    Ok(current)
}

/// Decodes the archive stored as data at `keypath` in the property list
/// `plist_bytes`.
pub fn archive_from_plist_keypath(
    plist_bytes: &[u8],
    keypath: &str,
    configuration: InputOutputConfiguration,
) -> Result<Archive, ArchiveError> {
    let plist = parse_property_list(plist_bytes)?;
    let value = value_for_keypath(&plist, keypath)?;
    let bytes = value.as_bytes().ok_or_else(|| ArchiveError::KeyPath {
        keypath: keypath.to_string(),
        reason: format!("value is a {}, expected data", value.shape()),
    })?;
    if bytes.is_empty() {
        return Err(ArchiveError::KeyPath {
            keypath: keypath.to_string(),
            reason: "archived data is empty".to_string(),
        });
    }
    Archive::from_bytes(bytes, configuration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn sample() -> PrimitiveValue {
        let mut inner = IndexMap::new();
        inner.insert("blob".to_string(), PrimitiveValue::Data(vec![1, 2, 3]));
        inner.insert(
            "list".to_string(),
            PrimitiveValue::Array(vec![PrimitiveValue::Integer(10), PrimitiveValue::Integer(20)]),
        );
        let mut outer = IndexMap::new();
        outer.insert("Window".to_string(), PrimitiveValue::Mapping(inner));
        PrimitiveValue::Mapping(outer)
    }

    #[test]
    fn walks_dictionaries_and_arrays() {
        let plist = sample();
        assert_eq!(
            value_for_keypath(&plist, "Window.blob").unwrap(),
            &PrimitiveValue::Data(vec![1, 2, 3])
        );
        assert_eq!(
            value_for_keypath(&plist, "Window.list.1").unwrap(),
            &PrimitiveValue::Integer(20)
        );
    }

    #[test]
    fn missing_elements_are_errors() {
        let plist = sample();
        for keypath in ["Door", "Window.missing", "Window.list.9", "Window.blob.x"] {
            let err = value_for_keypath(&plist, keypath).unwrap_err();
            assert!(
                matches!(&err, ArchiveError::KeyPath { keypath: k, .. } if k == keypath),
                "{keypath}: {err}"
            );
        }
    }
}
