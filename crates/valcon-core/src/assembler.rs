//! Accumulation of consolidation decisions into one output delta.
//!
//! The assembler owns the output [`ItemDelta`] and the optional metadata
//! computer. Values are always cloned before they enter the delta; the
//! inputs are never mutated.
use tracing::trace;

use crate::delta::ItemDelta;
use crate::error::ConsolidationError;
use crate::metadata::ValueMetadataComputer;
use crate::newtypes::ItemPath;
use crate::partition::EquivalenceClass;
use crate::triple::ValueWithOrigin;
use crate::value::{ItemValue, ValueMetadata};

pub(crate) struct DeltaAssembler<'a> {
    delta: ItemDelta,
    computer: Option<&'a dyn ValueMetadataComputer>,
    is_assignment: bool,
}

impl<'a> DeltaAssembler<'a> {
    pub(crate) fn new(path: ItemPath, computer: Option<&'a dyn ValueMetadataComputer>) -> Self {
        let is_assignment = path.is_assignment();
        Self {
            delta: ItemDelta::new(path),
            computer,
            is_assignment,
        }
    }

    /// Computes metadata from `inputs`, or `None` without a computer.
    pub(crate) fn compute_metadata(
        &self,
        inputs: &[&ItemValue],
    ) -> Result<Option<ValueMetadata>, ConsolidationError> {
        match self.computer {
            Some(computer) => {
                let metadata = computer.compute(inputs)?;
                trace!(inputs = inputs.len(), ?metadata, "computed value metadata");
                Ok(Some(metadata))
            }
            None => {
                trace!("skipping value metadata computation, no computer");
                Ok(None)
            }
        }
    }

    /// Adds a clone of `value` to the add set.
    pub(crate) fn add_value(
        &mut self,
        value: &ItemValue,
        metadata: Option<ValueMetadata>,
        origins: &[&ValueWithOrigin],
    ) -> Result<(), ConsolidationError> {
        let value = self.prepare(value, metadata, origins);
        self.delta.add_value_to_add(value)
    }

    /// Adds a clone of `value` to the replace set.
    pub(crate) fn replace_value(
        &mut self,
        value: &ItemValue,
        metadata: Option<ValueMetadata>,
        origins: &[&ValueWithOrigin],
    ) -> Result<(), ConsolidationError> {
        let value = self.prepare(value, metadata, origins);
        self.delta.add_value_to_replace(value)
    }

    /// Adds a clone of `value` to the delete set.
    pub(crate) fn delete_value(&mut self, value: &ItemValue) -> Result<(), ConsolidationError> {
        self.delta.add_value_to_delete(value.clone())
    }

    fn prepare(
        &self,
        value: &ItemValue,
        metadata: Option<ValueMetadata>,
        origins: &[&ValueWithOrigin],
    ) -> ItemValue {
        let mut value = value.clone();
        if let Some(metadata) = metadata {
            value.metadata = metadata;
        }
        if self.is_assignment {
            if let Some(name) = origins
                .iter()
                .map(|o| o.mapping.name.as_str())
                .find(|name| !name.is_empty())
            {
                value.origin_mapping_name = Some(name.to_owned());
            }
        }
        value
    }

    /// Recomputes metadata for the class's existing value from the existing
    /// value, `additional` values and the a-priori plus presence.
    ///
    /// Does nothing without a computer or when the class is absent from the
    /// existing item.
    pub(crate) fn compute_metadata_on_existing_value(
        &mut self,
        class: &EquivalenceClass<'_>,
        additional: &[&ItemValue],
    ) -> Result<(), ConsolidationError> {
        if self.computer.is_none() {
            trace!("skipping value metadata computation for existing value, no computer");
            return Ok(());
        }
        let Some(existing) = class.existing_value() else {
            trace!(%class, "skipping value metadata computation, value not in existing item");
            return Ok(());
        };
        let mut inputs = Vec::with_capacity(1 + additional.len() + class.presence_in_apriori_plus.len());
        inputs.push(existing);
        inputs.extend_from_slice(additional);
        inputs.extend(class.presence_in_apriori_plus.iter().copied());
        match self.compute_metadata(&inputs)? {
            Some(metadata) => self.apply_metadata_if_changed(existing, metadata),
            None => Ok(()),
        }
    }

    /// Replaces `existing` by a copy carrying `metadata`, unless the metadata
    /// is unchanged.
    fn apply_metadata_if_changed(
        &mut self,
        existing: &ItemValue,
        metadata: ValueMetadata,
    ) -> Result<(), ConsolidationError> {
        if existing.metadata == metadata {
            trace!(value = %existing, "value metadata unchanged");
            return Ok(());
        }
        trace!(value = %existing, "value metadata changed, replacing existing value");
        self.delta.add_value_to_delete(existing.clone())?;
        let updated = existing.clone().with_metadata(metadata);
        self.delta.add_value_to_add(updated)
    }

    pub(crate) fn init_replace(&mut self) {
        self.delta.init_replace();
    }

    /// Returns `true` if the item keeps at least one value once the delta is
    /// applied to `existing`.
    pub(crate) fn will_have_any_value(&self, existing: Option<&[ItemValue]>) -> bool {
        match existing {
            None | Some([]) => self.delta.adds_any_value(),
            Some(_) if self.delta.is_empty() => true,
            Some(values) => {
                let mut values = values.to_vec();
                self.delta.apply_to(&mut values);
                !values.is_empty()
            }
        }
    }

    /// Records a snapshot of the existing values, when the item exists.
    pub(crate) fn stamp_estimated_old_values(&mut self, existing: Option<&[ItemValue]>) {
        if let Some(values) = existing {
            self.delta.estimated_old_values = Some(values.to_vec());
        }
    }

    pub(crate) fn finish(self) -> ItemDelta {
        self.delta
    }
}
