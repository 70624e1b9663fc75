//! The decoded archive: node arena, `$top` roots and metadata.

use std::borrow::Cow;

use indexmap::IndexMap;
use keyed_archive_transport::guess_encoding;
use tracing::{debug, warn};

use crate::config::InputOutputConfiguration;
use crate::error::ArchiveError;
use crate::inflate::decompress_input;
use crate::nodes::{classify, ArchiveNode, NodeBody, NodeId, Resolver, Slot};
use crate::render::RenderContext;
use crate::value::{parse_property_list, PrimitiveValue};

/// A fully classified and resolved keyed archive.
///
/// Immutable after construction; every render uses its own
/// [`RenderContext`].
#[derive(Debug, Clone)]
pub struct Archive {
    nodes: Vec<ArchiveNode>,
    top: IndexMap<String, PrimitiveValue>,
    archiver: Option<String>,
    version: Option<i128>,
    configuration: InputOutputConfiguration,
    unresolved_references: usize,
}

impl Archive {
    // ── construction ──────────────────────────────────────────────────────

    /// Builds an archive from an already parsed property list.
    pub fn build(
        value: PrimitiveValue,
        configuration: InputOutputConfiguration,
    ) -> Result<Self, ArchiveError> {
        Self::build_with(value, configuration, &RenderContext::new())
    }

    /// Like [`Archive::build`], for an archive rendered inside `ctx`.
    ///
    /// Dictionary keys are rendered while resolving, so nested archives
    /// found in key data count against the depth of `ctx`.
    pub fn build_with(
        value: PrimitiveValue,
        configuration: InputOutputConfiguration,
        ctx: &RenderContext,
    ) -> Result<Self, ArchiveError> {
        let mut dictionary = match value {
            PrimitiveValue::Mapping(dictionary) => dictionary,
            other => {
                return Err(ArchiveError::MalformedArchive {
                    found: with_article(other.shape()),
                })
            }
        };
        let objects = match dictionary.shift_remove("$objects") {
            Some(PrimitiveValue::Array(objects)) => objects,
            Some(other) => {
                return Err(ArchiveError::MalformedArchive {
                    found: format!(
                        "a dictionary whose $objects is {}",
                        with_article(other.shape())
                    ),
                })
            }
            None => {
                return Err(ArchiveError::MalformedArchive {
                    found: "a dictionary without $objects".to_string(),
                })
            }
        };
        let top = match dictionary.shift_remove("$top") {
            Some(PrimitiveValue::Mapping(top)) => top,
            Some(other) => {
                warn!(shape = other.shape(), "$top is not a dictionary, archive has no roots");
                IndexMap::new()
            }
            None => {
                warn!("archive has no $top");
                IndexMap::new()
            }
        };
        let archiver = dictionary
            .get("$archiver")
            .and_then(PrimitiveValue::as_str)
            .map(str::to_string);
        let version = dictionary.get("$version").and_then(PrimitiveValue::as_integer);

        let nodes = objects
            .into_iter()
            .enumerate()
            .map(|(id, raw)| classify(id, raw))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(objects = nodes.len(), roots = top.len(), "classified archive records");

        let mut archive = Self {
            nodes,
            top,
            archiver,
            version,
            configuration,
            unresolved_references: 0,
        };
        archive.resolve_references(ctx)?;
        Ok(archive)
    }

    /// Sequential resolve pass. Each node is resolved against the table as
    /// left by the nodes before it.
    fn resolve_references(&mut self, ctx: &RenderContext) -> Result<(), ArchiveError> {
        for id in 0..self.nodes.len() {
            let mut resolver = Resolver::new(self, ctx);
            let node = &self.nodes[id];
            let resolved = match node.body() {
                NodeBody::Instance(instance) => {
                    Some(instance.resolved(node.serialized_representation(), &mut resolver)?)
                }
                _ => None,
            };
            let dangling = resolver.dangling();
            self.unresolved_references += dangling;
            if let Some(instance) = resolved {
                debug!(id, kind = self.nodes[id].kind_name(), "resolved references");
                self.nodes[id].set_body(NodeBody::Instance(instance));
            }
        }
        Ok(())
    }

    /// Parses binary archive bytes after applying the configured offset
    /// and decompression.
    pub fn from_bytes(
        bytes: &[u8],
        configuration: InputOutputConfiguration,
    ) -> Result<Self, ArchiveError> {
        if bytes.is_empty() {
            return Err(ArchiveError::MissingInput);
        }
        let mut data = Cow::Borrowed(
            bytes
                .get(configuration.input_data_offset..)
                .unwrap_or_default(),
        );
        if let Some(decompression) = &configuration.input_data_decompression {
            data = Cow::Owned(decompress_input(&data, decompression)?);
        }
        let value = parse_property_list(&data)?;
        Self::build(value, configuration)
    }

    /// Like [`Archive::from_bytes`], after undoing a hex/base64 transport
    /// encoding according to `configuration.input_encoding`.
    pub fn from_encoded_bytes(
        bytes: &[u8],
        configuration: InputOutputConfiguration,
    ) -> Result<Self, ArchiveError> {
        if bytes.is_empty() {
            return Err(ArchiveError::MissingInput);
        }
        let decoded = guess_encoding(bytes, configuration.input_encoding)?;
        debug!(
            encoding = %decoded.encoding,
            input = bytes.len(),
            decoded = decoded.data.len(),
            "decoded input text"
        );
        Self::from_bytes(decoded.data(), configuration)
    }

    // ── lookup ────────────────────────────────────────────────────────────

    pub fn nodes(&self) -> &[ArchiveNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn object_at_index(&self, id: NodeId) -> Option<&ArchiveNode> {
        self.nodes.get(id)
    }

    pub fn top_object_keys(&self) -> impl Iterator<Item = &str> {
        self.top.keys().map(String::as_str)
    }

    /// Raw `$top` entry for `key`.
    pub fn top_value(&self, key: &str) -> Option<&PrimitiveValue> {
        self.top.get(key)
    }

    /// Node referenced by the `$top` entry `key`.
    pub fn top_object(&self, key: &str) -> Option<&ArchiveNode> {
        self.reference_target(self.top.get(key)?)
    }

    pub fn archiver(&self) -> Option<&str> {
        self.archiver.as_deref()
    }

    pub fn version(&self) -> Option<i128> {
        self.version
    }

    pub fn configuration(&self) -> &InputOutputConfiguration {
        &self.configuration
    }

    /// References that pointed outside `$objects` during the build.
    pub fn unresolved_reference_count(&self) -> usize {
        self.unresolved_references
    }

    /// Renders property `key` of instance `id`, or `None` if there is no
    /// such instance property.
    pub fn property_string(&self, id: NodeId, key: &str) -> Result<Option<String>, ArchiveError> {
        let Some(slot) = self
            .object_at_index(id)
            .and_then(ArchiveNode::as_instance)
            .and_then(|instance| instance.get(key))
        else {
            return Ok(None);
        };
        match slot {
            Slot::Node(target) => self.render_detached(*target, &RenderContext::new()).map(Some),
            Slot::Value(value) => Ok(Some(value.to_string())),
        }
    }

    pub(crate) fn reference_target(&self, value: &PrimitiveValue) -> Option<&ArchiveNode> {
        let index = usize::try_from(value.as_reference()?).ok()?;
        self.object_at_index(index)
    }

    /// Primitive behind a slot. Node slots yield the record of leaf nodes
    /// (data and scalars); instances and markers yield nothing.
    pub(crate) fn slot_value<'a>(&'a self, slot: &'a Slot) -> Option<&'a PrimitiveValue> {
        match slot {
            Slot::Value(value) => Some(value),
            Slot::Node(id) => {
                let node = self.object_at_index(*id)?;
                match node.body() {
                    NodeBody::Instance(_) | NodeBody::Class { .. } | NodeBody::Null => None,
                    _ => Some(node.serialized_representation()),
                }
            }
        }
    }

    /// Class name shown in instance headers.
    pub(crate) fn class_name(&self, class: &Slot) -> String {
        match class {
            Slot::Node(id) => match self.object_at_index(*id).map(ArchiveNode::body) {
                Some(NodeBody::Class { name }) => name.clone(),
                Some(NodeBody::String(name)) => name.clone(),
                _ => "(unknown class)".to_string(),
            },
            Slot::Value(PrimitiveValue::String(name)) => name.clone(),
            Slot::Value(value) => value.to_string(),
        }
    }

    /// Renders node `id` with its own `seen` set, one level below `ctx`.
    pub(crate) fn render_detached(
        &self,
        id: NodeId,
        ctx: &RenderContext,
    ) -> Result<String, ArchiveError> {
        match self.object_at_index(id) {
            Some(node) => node.dump_string(self, &mut ctx.nested()?),
            None => Ok(format!("UID({id})")),
        }
    }

    // ── rendering ─────────────────────────────────────────────────────────

    /// Renders every `$top` entry as `key: value` lines.
    pub fn dump_string(&self) -> Result<String, ArchiveError> {
        self.dump_string_with(&mut RenderContext::new())
    }

    /// Renders with a caller-provided context; `seen` spans all roots.
    pub fn dump_string_with(&self, ctx: &mut RenderContext) -> Result<String, ArchiveError> {
        let mut result = String::new();
        for (key, value) in &self.top {
            debug!(key = %key, "rendering top-level object");
            let text = match self.reference_target(value) {
                Some(node) => ctx.descend(|ctx| node.dump_string(self, ctx))?,
                None => value.to_string(),
            };
            result.push_str(key);
            result.push_str(": ");
            result.push_str(&text);
            result.push('\n');
        }
        Ok(result)
    }
}

fn with_article(shape: &str) -> String {
    match shape.chars().next() {
        Some('a' | 'e' | 'i' | 'o' | 'u') => format!("an {shape}"),
        _ => format!("a {shape}"),
    }
}
