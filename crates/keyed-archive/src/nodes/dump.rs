//! Text rendering of nodes.

use chrono::{NaiveDate, TimeDelta, Timelike};
use uuid::Uuid;

use super::{ArchiveNode, InstanceKind, InstanceNode, NodeBody, NodeId, Slot};
use crate::archive::Archive;
use crate::error::ArchiveError;
use crate::render::{indent_continuation, indent_item, RenderContext};
use crate::sniff::ascii_dump_for_data;
use crate::value::{format_float, PrimitiveValue};

impl ArchiveNode {
    /// Renders this node and everything reachable from it.
    pub fn dump_string(
        &self,
        archive: &Archive,
        ctx: &mut RenderContext,
    ) -> Result<String, ArchiveError> {
        match &self.body {
            NodeBody::Null => Ok("(null)".to_string()),
            NodeBody::Bool(true) => Ok("True".to_string()),
            NodeBody::Bool(false) => Ok("False".to_string()),
            NodeBody::Integer(i) => Ok(i.to_string()),
            NodeBody::Float(x) => Ok(format_float(*x)),
            NodeBody::String(s) => Ok(s.clone()),
            NodeBody::Class { name } => Ok(name.clone()),
            NodeBody::Data(bytes) => dump_data("NSData", bytes, archive, ctx),
            NodeBody::Instance(instance) => instance.dump_string(self.id, archive, ctx),
        }
    }
}

impl InstanceNode {
    fn dump_string(
        &self,
        id: NodeId,
        archive: &Archive,
        ctx: &mut RenderContext,
    ) -> Result<String, ArchiveError> {
        let special = match self.kind {
            InstanceKind::Date => self.date_string(archive),
            InstanceKind::Uuid => self.uuid_string(archive),
            InstanceKind::MutableString => self
                .property_value(archive, "NS.string")
                .and_then(PrimitiveValue::as_str)
                .map(str::to_string),
            InstanceKind::MutableData => match self
                .property_value(archive, "NS.data")
                .and_then(PrimitiveValue::as_bytes)
            {
                Some(bytes) => Some(dump_data("NSMutableData", bytes, archive, ctx)?),
                None => None,
            },
            InstanceKind::Object | InstanceKind::Dictionary | InstanceKind::Array => None,
        };
        match special {
            Some(text) => Ok(text),
            None => self.dump_properties(id, archive, ctx),
        }
    }

    /// Primitive behind a property, following a reference to a leaf record.
    fn property_value<'a>(&'a self, archive: &'a Archive, key: &str) -> Option<&'a PrimitiveValue> {
        archive.slot_value(self.properties.get(key)?)
    }

    fn date_string(&self, archive: &Archive) -> Option<String> {
        let seconds = self.property_value(archive, "NS.time")?.as_f64()?;
        reference_date_string(seconds)
    }

    fn uuid_string(&self, archive: &Archive) -> Option<String> {
        let bytes = self.property_value(archive, "NS.uuidbytes")?.as_bytes()?;
        let uuid = Uuid::from_slice(bytes).ok()?;
        Some(format!("<NSUUID {uuid}>"))
    }

    fn dump_properties(
        &self,
        id: NodeId,
        archive: &Archive,
        ctx: &mut RenderContext,
    ) -> Result<String, ArchiveError> {
        let class_name = archive.class_name(&self.class);
        if !ctx.enter(id) {
            return Ok(format!("<reference to {class_name} id {id}>"));
        }
        let header = format!("<{class_name} id {id}>");
        if self.properties.is_empty() {
            return Ok(format!("{header} (empty)"));
        }

        let mut entries: Vec<(&String, &Slot)> = self.properties.iter().collect();
        entries.sort_by_cached_key(|(key, _)| key.to_lowercase());
        let key_width = entries
            .iter()
            .map(|(key, _)| key.chars().count())
            .max()
            .unwrap_or(0);

        let last = entries.len() - 1;
        let mut lines = Vec::with_capacity(entries.len() + 1);
        lines.push(header);
        for (index, (key, slot)) in entries.into_iter().enumerate() {
            let description = match slot {
                Slot::Node(target) => match archive.object_at_index(*target) {
                    Some(node) => ctx.descend(|ctx| node.dump_string(archive, ctx))?,
                    None => format!("UID({target})"),
                },
                Slot::Value(value) => value.to_string(),
            };
            let padding = " ".repeat(key_width - key.chars().count());
            let entry = format!(
                "{key}:{padding} {}",
                indent_continuation(&description, key_width + 2)
            );
            lines.push(indent_item(&entry, index == last));
        }
        Ok(lines.join("\n"))
    }
}

fn dump_data(
    label: &str,
    bytes: &[u8],
    archive: &Archive,
    ctx: &RenderContext,
) -> Result<String, ArchiveError> {
    let (text, content_type) = ascii_dump_for_data(bytes, archive.configuration(), ctx)?;
    let remark = content_type
        .map(|content_type| format!(" ({content_type})"))
        .unwrap_or_default();
    Ok(format!("<{label} length {}>{remark}\n{text}", bytes.len()))
}

/// Formats seconds since 2001-01-01 00:00:00 UTC, with microseconds only
/// when non-zero.
pub(crate) fn reference_date_string(seconds: f64) -> Option<String> {
    if !seconds.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(2001, 1, 1)?.and_hms_opt(0, 0, 0)?;
    let micros = (seconds * 1_000_000.0).round() as i64;
    let date = epoch.checked_add_signed(TimeDelta::microseconds(micros))?;
    let mut text = date.format("%Y-%m-%d %H:%M:%S").to_string();
    let fraction = date.nanosecond() / 1_000;
    if fraction != 0 {
        text.push_str(&format!(".{fraction:06}"));
    }
    Some(text)
}
