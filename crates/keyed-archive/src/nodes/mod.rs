//! Object-graph nodes reconstructed from `$objects` records.
//!
//! # Node kinds
//!
//! | Body                         | Record shape                              | Renders as                    |
//! |------------------------------|-------------------------------------------|-------------------------------|
//! | `Null`                       | the string `$null`                        | `(null)`                      |
//! | `Instance(Date)`             | `$class` + `NS.time`                      | `2001-01-01 00:00:00`         |
//! | `Instance(MutableData)`      | `$class` + `NS.data`                      | `<NSMutableData length N>`    |
//! | `Instance(Uuid)`             | `$class` + `NS.uuidbytes`                 | `<NSUUID ...>`                |
//! | `Instance(MutableString)`    | `$class` + `NS.string`                    | the string                    |
//! | `Instance(Dictionary)`       | `$class` + `NS.keys` + `NS.objects`       | property tree                 |
//! | `Instance(Array)`            | `$class` + `NS.objects`                   | property tree, index keys     |
//! | `Instance(Object)`           | `$class`                                  | property tree                 |
//! | `Data`                       | bytes                                     | `<NSData length N>` + dump    |
//! | `Bool`, `Integer`, `Float`   | scalar                                    | the value                     |
//! | `Class`                      | `$classname`                              | the class name                |
//! | `String`                     | string                                    | the string                    |
//!
//! Nodes live in the [`Archive`](crate::Archive) arena and refer to each
//! other by [`NodeId`].

mod classify;
mod dump;
mod resolve;

use indexmap::IndexMap;

pub use classify::{classify, Classifier, CLASSIFIERS};
pub(crate) use resolve::Resolver;

use crate::value::PrimitiveValue;

/// Position of a record in `$objects`.
pub type NodeId = usize;

/// A property value: a resolved node or a raw primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Node(NodeId),
    Value(PrimitiveValue),
}

impl Slot {
    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            Self::Node(id) => Some(*id),
            Self::Value(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceKind {
    Object,
    Date,
    MutableData,
    Uuid,
    MutableString,
    Dictionary,
    Array,
}

// ── InstanceNode ──────────────────────────────────────────────────────────

/// A `$class`-tagged record and its properties.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceNode {
    pub kind: InstanceKind,
    pub class: Slot,
    pub properties: IndexMap<String, Slot>,
}

impl InstanceNode {
    /// Splits a record mapping into `$class` and raw property slots.
    pub fn from_record(kind: InstanceKind, record: &IndexMap<String, PrimitiveValue>) -> Self {
        let mut class = Slot::Value(PrimitiveValue::Null);
        let mut properties = IndexMap::with_capacity(record.len());
        for (key, value) in record {
            if key == "$class" {
                class = Slot::Value(value.clone());
            } else {
                properties.insert(key.clone(), Slot::Value(value.clone()));
            }
        }
        Self {
            kind,
            class,
            properties,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Slot> {
        self.properties.get(key)
    }
}

// ── ArchiveNode ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum NodeBody {
    Null,
    Instance(InstanceNode),
    Data(Vec<u8>),
    Bool(bool),
    Integer(i128),
    Float(f64),
    Class { name: String },
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveNode {
    id: NodeId,
    raw: PrimitiveValue,
    body: NodeBody,
}

impl ArchiveNode {
    pub(crate) fn new(id: NodeId, raw: PrimitiveValue, body: NodeBody) -> Self {
        Self { id, raw, body }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The record exactly as it appeared in `$objects`.
    pub fn serialized_representation(&self) -> &PrimitiveValue {
        &self.raw
    }

    pub fn body(&self) -> &NodeBody {
        &self.body
    }

    pub(crate) fn set_body(&mut self, body: NodeBody) {
        self.body = body;
    }

    pub fn as_instance(&self) -> Option<&InstanceNode> {
        match &self.body {
            NodeBody::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    /// Name of the node kind, as used in classification logs.
    pub fn kind_name(&self) -> &'static str {
        match &self.body {
            NodeBody::Null => "Null",
            NodeBody::Instance(instance) => match instance.kind {
                InstanceKind::Object => "Instance",
                InstanceKind::Date => "Date",
                InstanceKind::MutableData => "MutableData",
                InstanceKind::Uuid => "UUID",
                InstanceKind::MutableString => "MutableString",
                InstanceKind::Dictionary => "Dictionary",
                InstanceKind::Array => "Array",
            },
            NodeBody::Data(_) => "Data",
            NodeBody::Bool(_) => "Bool",
            NodeBody::Integer(_) => "Integer",
            NodeBody::Float(_) => "Float",
            NodeBody::Class { .. } => "ClassMarker",
            NodeBody::String(_) => "String",
        }
    }
}
