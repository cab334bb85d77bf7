/// Value metadata computation.
///
/// The consolidator never interprets metadata itself. It collects the input
/// values that contributed to a delta value (or an existing value) and hands
/// them to a [`ValueMetadataComputer`]. Failures are propagated unchanged.
use std::collections::BTreeSet;

use crate::error::DelegatedError;
use crate::value::{ItemValue, ValueMetadata};

/// Computes the metadata of a consolidated value from its input values.
pub trait ValueMetadataComputer {
    /// Computes metadata from `inputs`, in contribution order.
    ///
    /// # Errors
    ///
    /// Any [`DelegatedError`]; it aborts the consolidation run.
    fn compute(&self, inputs: &[&ItemValue]) -> Result<ValueMetadata, DelegatedError>;
}

impl<F> ValueMetadataComputer for F
where
    F: Fn(&[&ItemValue]) -> Result<ValueMetadata, DelegatedError>,
{
    fn compute(&self, inputs: &[&ItemValue]) -> Result<ValueMetadata, DelegatedError> {
        self(inputs)
    }
}

/// Unions the provenance `sources` of all inputs. Extra fields are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProvenanceUnion;

impl ValueMetadataComputer for ProvenanceUnion {
    fn compute(&self, inputs: &[&ItemValue]) -> Result<ValueMetadata, DelegatedError> {
        let sources: BTreeSet<String> = inputs
            .iter()
            .flat_map(|v| v.metadata.sources.iter().cloned())
            .collect();
        Ok(ValueMetadata {
            sources,
            ..ValueMetadata::default()
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use serde_json::json;

    use super::*;
    use crate::error::DelegatedErrorKind;

    #[test]
    fn provenance_union_merges_sorted_sources() {
        let a = ItemValue::property(json!("x")).with_metadata(ValueMetadata::from_source("m2"));
        let b = ItemValue::property(json!("x")).with_metadata(ValueMetadata::from_source("m1"));
        let c = ItemValue::property(json!("x")).with_metadata(ValueMetadata::from_source("m2"));
        let md = ProvenanceUnion.compute(&[&a, &b, &c]).expect("computed");
        assert_eq!(md.sources.into_iter().collect::<Vec<_>>(), vec!["m1", "m2"]);
    }

    #[test]
    fn empty_inputs_give_empty_metadata() {
        let md = ProvenanceUnion.compute(&[]).expect("computed");
        assert!(md.is_empty());
    }

    #[test]
    fn closures_are_computers() {
        let failing = |_: &[&ItemValue]| -> Result<ValueMetadata, DelegatedError> {
            Err(DelegatedError::new(DelegatedErrorKind::Communication, "down"))
        };
        let err = failing.compute(&[]).expect_err("fails");
        assert_eq!(err.kind, DelegatedErrorKind::Communication);
    }
}
