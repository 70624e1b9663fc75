mod common;

use common::*;
use keyed_archive::{
    parse_property_list, Archive, ArchiveError, Decompression, InputEncoding,
    InputOutputConfiguration, InstanceKind, NodeBody, PrimitiveValue, Slot,
};
use plist::Value;
use pretty_assertions::assert_eq;

fn config() -> InputOutputConfiguration {
    InputOutputConfiguration::default()
}

fn decode(bytes: &[u8]) -> Archive {
    Archive::from_bytes(bytes, config()).unwrap()
}

// ---------------------------------------------------------------------------
// construction
// ---------------------------------------------------------------------------

#[test]
fn node_ids_match_object_positions() {
    let archive = decode(&demo_dictionary());
    assert_eq!(archive.len(), 7);
    for (index, node) in archive.nodes().iter().enumerate() {
        assert_eq!(node.id(), index);
    }
    let kinds: Vec<_> = archive.nodes().iter().map(|n| n.kind_name()).collect();
    assert_eq!(
        kinds,
        vec!["Null", "Dictionary", "String", "String", "String", "Integer", "ClassMarker"]
    );
}

#[test]
fn metadata_and_lookup() {
    let archive = decode(&demo_dictionary());
    assert_eq!(archive.archiver(), Some("NSKeyedArchiver"));
    assert_eq!(archive.version(), Some(100_000));
    assert_eq!(archive.top_object_keys().collect::<Vec<_>>(), vec!["root"]);
    assert_eq!(archive.top_object("root").map(|n| n.id()), Some(1));
    assert!(archive.top_object("missing").is_none());
    assert_eq!(archive.top_value("root"), Some(&PrimitiveValue::Reference(1)));
    assert_eq!(archive.unresolved_reference_count(), 0);
}

#[test]
fn dictionary_is_flattened_into_properties() {
    let archive = decode(&demo_dictionary());
    let instance = archive.object_at_index(1).unwrap().as_instance().unwrap();
    assert_eq!(instance.kind, InstanceKind::Dictionary);
    assert_eq!(instance.class, Slot::Node(6));
    let keys: Vec<_> = instance.properties.keys().cloned().collect();
    assert_eq!(keys, vec!["name", "count"]);
    assert_eq!(instance.get("name"), Some(&Slot::Node(4)));
    assert!(instance.get("NS.keys").is_none());
    assert!(instance.get("NS.objects").is_none());
    assert_eq!(archive.property_string(1, "name").unwrap().as_deref(), Some("demo"));
    assert_eq!(archive.property_string(1, "count").unwrap().as_deref(), Some("3"));
    assert_eq!(archive.property_string(1, "nope").unwrap(), None);
    assert_eq!(archive.property_string(2, "name").unwrap(), None);
}

#[test]
fn array_keys_are_zero_padded() {
    let mut objects = vec![string("$null")];
    let elements: Vec<Value> = (0..12).map(|i| uid(3 + i)).collect();
    objects.push(dict(vec![("$class", uid(2)), ("NS.objects", Value::Array(elements))]));
    objects.push(class("NSArray"));
    for i in 0..12i64 {
        objects.push(Value::Integer(i.into()));
    }
    let archive = decode(&archive(objects));
    let instance = archive.object_at_index(1).unwrap().as_instance().unwrap();
    assert_eq!(instance.properties.len(), 12);
    let keys: Vec<_> = instance.properties.keys().cloned().collect();
    assert_eq!(keys.first().map(String::as_str), Some("00"));
    assert_eq!(keys.last().map(String::as_str), Some("11"));
    assert!(instance.get("NS.objects").is_none());
}

#[test]
fn forward_references_resolve() {
    // The root instance refers to a record that appears after it.
    let archive = decode(&archive(vec![
        string("$null"),
        dict(vec![("$class", uid(3)), ("later", uid(2))]),
        string("after"),
        class("Holder"),
    ]));
    let instance = archive.object_at_index(1).unwrap().as_instance().unwrap();
    assert_eq!(instance.get("later"), Some(&Slot::Node(2)));
    assert_eq!(archive.property_string(1, "later").unwrap().as_deref(), Some("after"));
}

#[test]
fn mutable_data_inlines_referenced_bytes() {
    let archive = decode(&archive(vec![
        string("$null"),
        dict(vec![("$class", uid(3)), ("NS.data", uid(2))]),
        Value::Data(vec![1, 2, 3]),
        class("NSMutableData"),
    ]));
    let instance = archive.object_at_index(1).unwrap().as_instance().unwrap();
    assert_eq!(
        instance.get("NS.data"),
        Some(&Slot::Value(PrimitiveValue::Data(vec![1, 2, 3])))
    );
}

#[test]
fn out_of_range_reference_stays_raw_and_is_counted() {
    let archive = decode(&archive(vec![
        string("$null"),
        dict(vec![("$class", uid(2)), ("NS.objects", Value::Array(vec![uid(99)]))]),
        class("NSArray"),
    ]));
    assert_eq!(archive.unresolved_reference_count(), 1);
    let instance = archive.object_at_index(1).unwrap().as_instance().unwrap();
    assert_eq!(instance.get("0"), Some(&Slot::Value(PrimitiveValue::Reference(99))));
    assert_eq!(
        archive.dump_string().unwrap(),
        "root: <NSArray id 1>\n╰─  0: UID(99)\n"
    );
}

#[test]
fn reference_zero_is_a_real_reference() {
    let archive = decode(&archive(vec![
        string("$null"),
        dict(vec![("$class", uid(2)), ("nothing", uid(0))]),
        class("Box"),
    ]));
    let instance = archive.object_at_index(1).unwrap().as_instance().unwrap();
    assert_eq!(instance.get("nothing"), Some(&Slot::Node(0)));
    assert_eq!(archive.object_at_index(0).unwrap().body(), &NodeBody::Null);
}

// ---------------------------------------------------------------------------
// errors
// ---------------------------------------------------------------------------

#[test]
fn empty_input_is_missing_input() {
    assert!(matches!(Archive::from_bytes(b"", config()), Err(ArchiveError::MissingInput)));
    assert!(matches!(
        Archive::from_encoded_bytes(b"", config()),
        Err(ArchiveError::MissingInput)
    ));
}

#[test]
fn unparseable_bytes_are_a_property_list_error() {
    assert!(matches!(
        Archive::from_bytes(&[0xde, 0xad, 0xbe, 0xef], config()),
        Err(ArchiveError::PropertyList(_))
    ));
}

#[test]
fn non_archive_property_lists_are_malformed() {
    let cases = vec![
        Value::Array(vec![string("x")]),
        dict(vec![("$top", dict(vec![]))]),
        dict(vec![("$objects", string("not an array"))]),
    ];
    for value in cases {
        let err = Archive::from_bytes(&to_binary(&value), config()).unwrap_err();
        assert!(matches!(err, ArchiveError::MalformedArchive { .. }), "{err}");
    }
}

#[test]
fn unclassifiable_record_is_fatal() {
    let bytes = archive(vec![string("$null"), Value::Array(vec![])]);
    let err = Archive::from_bytes(&bytes, config()).unwrap_err();
    assert!(matches!(
        err,
        ArchiveError::UnclassifiedRecord { index: 1, shape: "array", .. }
    ));
}

// ---------------------------------------------------------------------------
// input preprocessing
// ---------------------------------------------------------------------------

#[test]
fn offset_skips_leading_bytes() {
    let mut bytes = b"JUNK".to_vec();
    bytes.extend(hello_archive());
    let archive =
        Archive::from_bytes(&bytes, config().with_input_data_offset(4)).unwrap();
    assert_eq!(archive.dump_string().unwrap(), "root: hello\n");
}

#[test]
fn configured_zlib_decompression() {
    let compressed = zlib(&hello_archive());
    let configuration = config().with_input_data_decompression(Some(Decompression::default()));
    let archive = Archive::from_bytes(&compressed, configuration).unwrap();
    assert_eq!(archive.dump_string().unwrap(), "root: hello\n");

    let raw = deflate(&hello_archive());
    let configuration = config()
        .with_input_data_decompression(Some("zlib:-15".parse::<Decompression>().unwrap()));
    let archive = Archive::from_bytes(&raw, configuration).unwrap();
    assert_eq!(archive.dump_string().unwrap(), "root: hello\n");
}

#[test]
fn failed_decompression_is_reported() {
    let configuration = config().with_input_data_decompression(Some(Decompression::default()));
    assert!(matches!(
        Archive::from_bytes(&hello_archive(), configuration),
        Err(ArchiveError::Decompression { .. })
    ));
}

#[test]
fn transport_encodings_matrix() {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;

    let binary = demo_dictionary();
    let hex_text = hex::encode(&binary);
    let bracketed = format!("<{}>", hex_text);
    let base64_text = STANDARD.encode(&binary);
    let cases: Vec<(&[u8], InputEncoding)> = vec![
        (&binary, InputEncoding::Auto),
        (&binary, InputEncoding::None),
        (hex_text.as_bytes(), InputEncoding::Auto),
        (bracketed.as_bytes(), InputEncoding::Hex),
        (base64_text.as_bytes(), InputEncoding::Auto),
        (base64_text.as_bytes(), InputEncoding::Base64),
    ];
    for (input, encoding) in cases {
        let archive =
            Archive::from_encoded_bytes(input, config().with_input_encoding(encoding)).unwrap();
        assert_eq!(archive.len(), 7, "{encoding}");
    }
}

#[test]
fn invalid_explicit_transport_encoding_is_an_error() {
    let err = Archive::from_encoded_bytes(b"abc", config().with_input_encoding(InputEncoding::Hex))
        .unwrap_err();
    assert!(matches!(err, ArchiveError::InputDecoding(_)));
}

#[test]
fn xml_archives_use_cf_uid_references() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>$archiver</key><string>NSKeyedArchiver</string>
    <key>$objects</key>
    <array>
        <string>$null</string>
        <dict>
            <key>$class</key><dict><key>CF$UID</key><integer>3</integer></dict>
            <key>NS.string</key><string>from xml</string>
        </dict>
        <string>unused</string>
        <dict><key>$classname</key><string>NSMutableString</string></dict>
    </array>
    <key>$top</key>
    <dict><key>root</key><dict><key>CF$UID</key><integer>1</integer></dict></dict>
    <key>$version</key><integer>100000</integer>
</dict>
</plist>"#;
    let parsed = parse_property_list(xml.as_bytes()).unwrap();
    assert_eq!(parsed.get("$top").and_then(|t| t.get("root")), Some(&PrimitiveValue::Reference(1)));
    let archive = Archive::build(parsed, config()).unwrap();
    assert_eq!(archive.dump_string().unwrap(), "root: from xml\n");
}

#[test]
fn archive_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Archive>();
}
