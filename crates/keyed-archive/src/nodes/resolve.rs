//! Reference resolution for instance nodes.

use tracing::{debug, warn};

use super::{InstanceKind, InstanceNode, NodeBody, NodeId, Slot};
use crate::archive::Archive;
use crate::error::ArchiveError;
use crate::render::RenderContext;
use crate::value::PrimitiveValue;

/// Read-only view of the archive during the resolve pass.
///
/// `ctx` is the render context the archive is built in; dictionary keys
/// render one level below it.
pub(crate) struct Resolver<'a> {
    archive: &'a Archive,
    ctx: &'a RenderContext,
    dangling: usize,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(archive: &'a Archive, ctx: &'a RenderContext) -> Self {
        Self {
            archive,
            ctx,
            dangling: 0,
        }
    }

    /// Number of out-of-range references met so far.
    pub(crate) fn dangling(&self) -> usize {
        self.dangling
    }

    /// Target node of `value` if it is an in-range reference.
    fn target(&mut self, value: &PrimitiveValue) -> Option<NodeId> {
        let index = value.as_reference()?;
        match usize::try_from(index).ok().filter(|&i| i < self.archive.len()) {
            Some(id) => Some(id),
            None => {
                warn!(
                    index,
                    objects = self.archive.len(),
                    "reference points outside $objects, leaving it unresolved"
                );
                self.dangling += 1;
                None
            }
        }
    }

    fn resolve_slot(&mut self, slot: &mut Slot) {
        if let Slot::Value(value) = slot {
            if let Some(id) = self.target(value) {
                *slot = Slot::Node(id);
            }
        }
    }

    fn slot_for(&mut self, value: &PrimitiveValue) -> Slot {
        match self.target(value) {
            Some(id) => Slot::Node(id),
            None => Slot::Value(value.clone()),
        }
    }
}

impl InstanceNode {
    /// Returns a copy of this node with references replaced by node slots.
    ///
    /// Already-resolved slots are kept, so resolving twice is a no-op.
    pub(crate) fn resolved(
        &self,
        raw: &PrimitiveValue,
        resolver: &mut Resolver<'_>,
    ) -> Result<InstanceNode, ArchiveError> {
        let mut resolved = self.clone();
        resolver.resolve_slot(&mut resolved.class);
        for slot in resolved.properties.values_mut() {
            resolver.resolve_slot(slot);
        }
        match self.kind {
            InstanceKind::Dictionary => resolved.flatten_dictionary(raw, resolver)?,
            InstanceKind::Array => resolved.flatten_array(raw, resolver),
            InstanceKind::MutableData => resolved.inline_data(resolver),
            _ => {}
        }
        Ok(resolved)
    }

    fn flatten_dictionary(
        &mut self,
        raw: &PrimitiveValue,
        resolver: &mut Resolver<'_>,
    ) -> Result<(), ArchiveError> {
        let (Some(keys), Some(objects)) = (
            raw.get("NS.keys").and_then(PrimitiveValue::as_array),
            raw.get("NS.objects").and_then(PrimitiveValue::as_array),
        ) else {
            return Ok(());
        };
        if keys.len() != objects.len() {
            warn!(
                keys = keys.len(),
                objects = objects.len(),
                "dictionary key and object counts differ"
            );
        }
        for (key, object) in keys.iter().zip(objects) {
            let key = match resolver.target(key) {
                Some(id) => resolver.archive.render_detached(id, resolver.ctx)?,
                None => key.to_string(),
            };
            let slot = resolver.slot_for(object);
            self.properties.insert(key, slot);
        }
        self.properties.shift_remove("NS.keys");
        self.properties.shift_remove("NS.objects");
        Ok(())
    }

    fn flatten_array(&mut self, raw: &PrimitiveValue, resolver: &mut Resolver<'_>) {
        let Some(objects) = raw.get("NS.objects").and_then(PrimitiveValue::as_array) else {
            return;
        };
        let width = objects.len().to_string().len();
        for (index, object) in objects.iter().enumerate() {
            let slot = resolver.slot_for(object);
            self.properties.insert(format!("{index:0width$}"), slot);
        }
        self.properties.shift_remove("NS.objects");
    }

    /// Replaces a referenced `NS.data` blob with its bytes. The target is
    /// either a bare data record or another record carrying `NS.data`.
    fn inline_data(&mut self, resolver: &Resolver<'_>) {
        let Some(Slot::Node(id)) = self.properties.get("NS.data") else {
            return;
        };
        let Some(target) = resolver.archive.object_at_index(*id) else {
            return;
        };
        let bytes = match target.body() {
            NodeBody::Data(bytes) => bytes.clone(),
            _ => match target
                .serialized_representation()
                .get("NS.data")
                .and_then(PrimitiveValue::as_bytes)
            {
                Some(bytes) => bytes.to_vec(),
                None => {
                    debug!(target_id = *id, "NS.data does not reference data");
                    return;
                }
            },
        };
        self.properties
            .insert("NS.data".to_string(), Slot::Value(PrimitiveValue::Data(bytes)));
    }
}
