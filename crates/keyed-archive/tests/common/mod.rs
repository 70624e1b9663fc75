//! Fixture builders: keyed archives written as binary property lists.
#![allow(dead_code)]

use std::io::Write;

use flate2::write::{DeflateEncoder, ZlibEncoder};
use flate2::Compression;
use plist::{Dictionary, Uid, Value};

pub fn uid(index: u64) -> Value {
    Value::Uid(Uid::new(index))
}

pub fn string(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn dict(entries: Vec<(&str, Value)>) -> Value {
    let mut dictionary = Dictionary::new();
    for (key, value) in entries {
        dictionary.insert(key.to_string(), value);
    }
    Value::Dictionary(dictionary)
}

/// A `$classname` marker record.
pub fn class(name: &str) -> Value {
    dict(vec![
        ("$classname", string(name)),
        ("$classes", Value::Array(vec![string(name), string("NSObject")])),
    ])
}

/// Binary keyed archive with a single `root` pointing at object 1.
pub fn archive(objects: Vec<Value>) -> Vec<u8> {
    archive_with_top(objects, vec![("root", uid(1))])
}

pub fn archive_with_top(objects: Vec<Value>, top: Vec<(&str, Value)>) -> Vec<u8> {
    to_binary(&dict(vec![
        ("$version", Value::Integer(100_000i64.into())),
        ("$archiver", string("NSKeyedArchiver")),
        ("$top", dict(top)),
        ("$objects", Value::Array(objects)),
    ]))
}

pub fn to_binary(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    value.to_writer_binary(&mut buf).unwrap();
    buf
}

pub fn deflate(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}

pub fn zlib(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}

/// `{"name": "demo", "count": 3}` as an `NSDictionary` at id 1.
pub fn demo_dictionary() -> Vec<u8> {
    archive(vec![
        string("$null"),
        dict(vec![
            ("$class", uid(6)),
            ("NS.keys", Value::Array(vec![uid(2), uid(3)])),
            ("NS.objects", Value::Array(vec![uid(4), uid(5)])),
        ]),
        string("name"),
        string("count"),
        string("demo"),
        Value::Integer(3i64.into()),
        class("NSDictionary"),
    ])
}

/// An `NSArray` at id 1 whose only element is itself.
pub fn self_referential_array() -> Vec<u8> {
    archive(vec![
        string("$null"),
        dict(vec![("$class", uid(2)), ("NS.objects", Value::Array(vec![uid(1)]))]),
        class("NSArray"),
    ])
}

/// Archive whose root is the string `hello`.
pub fn hello_archive() -> Vec<u8> {
    archive(vec![string("$null"), string("hello")])
}

/// Archive whose root is a bare data record.
pub fn data_archive(bytes: Vec<u8>) -> Vec<u8> {
    archive(vec![string("$null"), Value::Data(bytes)])
}

/// Archive whose root dictionary has one entry, keyed by a data record
/// holding `inner`.
pub fn archive_keyed_by(inner: Vec<u8>) -> Vec<u8> {
    archive(vec![
        string("$null"),
        dict(vec![
            ("$class", uid(3)),
            ("NS.keys", Value::Array(vec![uid(2)])),
            ("NS.objects", Value::Array(vec![uid(4)])),
        ]),
        Value::Data(inner),
        class("NSDictionary"),
        string("v"),
    ])
}

/// `levels` archives, each used as the dictionary key of the next.
pub fn key_nested_archives(levels: usize) -> Vec<u8> {
    (0..levels).fold(hello_archive(), |inner, _| archive_keyed_by(inner))
}
