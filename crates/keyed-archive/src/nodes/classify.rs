//! Ordered, first-match-wins record classification.

use tracing::debug;

use super::{ArchiveNode, InstanceKind, InstanceNode, NodeBody, NodeId};
use crate::error::ArchiveError;
use crate::value::PrimitiveValue;

/// One entry of the classification table.
pub struct Classifier {
    pub name: &'static str,
    pub can_parse: fn(&PrimitiveValue) -> bool,
    pub parse: fn(&PrimitiveValue) -> NodeBody,
}

/// Specialised instance kinds precede the generic instance; scalars come
/// after every mapping shape.
pub const CLASSIFIERS: &[Classifier] = &[
    Classifier { name: "Null", can_parse: is_null, parse: parse_null },
    Classifier { name: "Date", can_parse: is_date, parse: parse_date },
    Classifier { name: "MutableData", can_parse: is_mutable_data, parse: parse_mutable_data },
    Classifier { name: "UUID", can_parse: is_uuid, parse: parse_uuid },
    Classifier { name: "MutableString", can_parse: is_mutable_string, parse: parse_mutable_string },
    Classifier { name: "Dictionary", can_parse: is_dictionary, parse: parse_dictionary },
    Classifier { name: "Array", can_parse: is_array, parse: parse_array },
    Classifier { name: "Instance", can_parse: is_instance, parse: parse_instance },
    Classifier { name: "Data", can_parse: is_data, parse: parse_data },
    Classifier { name: "Bool", can_parse: is_bool, parse: parse_bool },
    Classifier { name: "Integer", can_parse: is_integer, parse: parse_integer },
    Classifier { name: "Float", can_parse: is_float, parse: parse_float },
    Classifier { name: "ClassMarker", can_parse: is_class, parse: parse_class },
    Classifier { name: "String", can_parse: is_string, parse: parse_string },
];

/// Builds the node for record `id` with the first classifier that claims it.
pub fn classify(id: NodeId, raw: PrimitiveValue) -> Result<ArchiveNode, ArchiveError> {
    debug!(index = id, shape = raw.shape(), "finding classifier");
    for classifier in CLASSIFIERS {
        if (classifier.can_parse)(&raw) {
            debug!(index = id, classifier = classifier.name, "classified record");
            let body = (classifier.parse)(&raw);
            return Ok(ArchiveNode::new(id, raw, body));
        }
    }
    Err(ArchiveError::UnclassifiedRecord {
        index: id,
        shape: raw.shape(),
        value: raw.to_string(),
    })
}

// ── predicates ────────────────────────────────────────────────────────────

fn is_null(raw: &PrimitiveValue) -> bool {
    raw.as_str() == Some("$null")
}

fn is_instance(raw: &PrimitiveValue) -> bool {
    raw.contains_key("$class")
}

fn is_instance_with(raw: &PrimitiveValue, key: &str) -> bool {
    is_instance(raw) && raw.contains_key(key)
}

fn is_date(raw: &PrimitiveValue) -> bool {
    is_instance_with(raw, "NS.time")
}

fn is_mutable_data(raw: &PrimitiveValue) -> bool {
    is_instance_with(raw, "NS.data")
}

fn is_uuid(raw: &PrimitiveValue) -> bool {
    is_instance_with(raw, "NS.uuidbytes")
}

fn is_mutable_string(raw: &PrimitiveValue) -> bool {
    is_instance_with(raw, "NS.string")
}

fn is_dictionary(raw: &PrimitiveValue) -> bool {
    is_instance_with(raw, "NS.keys") && raw.contains_key("NS.objects")
}

fn is_array(raw: &PrimitiveValue) -> bool {
    is_instance_with(raw, "NS.objects") && !raw.contains_key("NS.keys")
}

fn is_data(raw: &PrimitiveValue) -> bool {
    matches!(raw, PrimitiveValue::Data(_))
}

fn is_bool(raw: &PrimitiveValue) -> bool {
    matches!(raw, PrimitiveValue::Bool(_))
}

fn is_integer(raw: &PrimitiveValue) -> bool {
    matches!(raw, PrimitiveValue::Integer(_))
}

fn is_float(raw: &PrimitiveValue) -> bool {
    matches!(raw, PrimitiveValue::Float(_))
}

fn is_class(raw: &PrimitiveValue) -> bool {
    raw.contains_key("$classname")
}

fn is_string(raw: &PrimitiveValue) -> bool {
    matches!(raw, PrimitiveValue::String(_))
}

// ── constructors ──────────────────────────────────────────────────────────

fn instance(raw: &PrimitiveValue, kind: InstanceKind) -> NodeBody {
    match raw.as_mapping() {
        Some(record) => NodeBody::Instance(InstanceNode::from_record(kind, record)),
        None => NodeBody::Null,
    }
}

fn parse_null(_: &PrimitiveValue) -> NodeBody {
    NodeBody::Null
}

fn parse_date(raw: &PrimitiveValue) -> NodeBody {
    instance(raw, InstanceKind::Date)
}

fn parse_mutable_data(raw: &PrimitiveValue) -> NodeBody {
    instance(raw, InstanceKind::MutableData)
}

fn parse_uuid(raw: &PrimitiveValue) -> NodeBody {
    instance(raw, InstanceKind::Uuid)
}

fn parse_mutable_string(raw: &PrimitiveValue) -> NodeBody {
    instance(raw, InstanceKind::MutableString)
}

fn parse_dictionary(raw: &PrimitiveValue) -> NodeBody {
    instance(raw, InstanceKind::Dictionary)
}

fn parse_array(raw: &PrimitiveValue) -> NodeBody {
    instance(raw, InstanceKind::Array)
}

fn parse_instance(raw: &PrimitiveValue) -> NodeBody {
    instance(raw, InstanceKind::Object)
}

fn parse_data(raw: &PrimitiveValue) -> NodeBody {
    NodeBody::Data(raw.as_bytes().unwrap_or_default().to_vec())
}

fn parse_bool(raw: &PrimitiveValue) -> NodeBody {
    NodeBody::Bool(matches!(raw, PrimitiveValue::Bool(true)))
}

fn parse_integer(raw: &PrimitiveValue) -> NodeBody {
    NodeBody::Integer(raw.as_integer().unwrap_or_default())
}

fn parse_float(raw: &PrimitiveValue) -> NodeBody {
    NodeBody::Float(raw.as_f64().unwrap_or_default())
}

fn parse_class(raw: &PrimitiveValue) -> NodeBody {
    let name = match raw.get("$classname") {
        Some(PrimitiveValue::String(name)) => name.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };
    NodeBody::Class { name }
}

fn parse_string(raw: &PrimitiveValue) -> NodeBody {
    NodeBody::String(raw.as_str().unwrap_or_default().to_string())
}
