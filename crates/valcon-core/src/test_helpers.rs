//! Shared test helper functions for constructing consolidation inputs.
//!
//! Compiled only in test builds. Integration tests under
//! `crates/valcon-core/tests/` define their own helpers because they link
//! against the non-test library build.
#![allow(clippy::expect_used)]

use serde_json::json;

use crate::mapping::{Mapping, MappingStrength};
use crate::newtypes::ItemPath;
use crate::triple::ValueWithOrigin;
use crate::value::{ItemValue, OriginType, ValueMetadata};

/// Parses an item path, panicking on invalid input.
pub fn path(s: &str) -> ItemPath {
    ItemPath::try_from(s).expect("valid ItemPath")
}

/// A string property value without metadata.
pub fn prop(s: &str) -> ItemValue {
    ItemValue::property(json!(s))
}

/// A string property value tagged with one provenance source.
pub fn tagged(s: &str, source: &str) -> ItemValue {
    prop(s).with_metadata(ValueMetadata::from_source(source))
}

/// A valid candidate whose value is tagged with the mapping name.
pub fn candidate(s: &str, mapping: &str, strength: MappingStrength) -> ValueWithOrigin {
    ValueWithOrigin::new(tagged(s, mapping), Mapping::new(mapping, strength))
}

/// An exclusive candidate.
pub fn exclusive(s: &str, mapping: &str, strength: MappingStrength) -> ValueWithOrigin {
    ValueWithOrigin::new(tagged(s, mapping), Mapping::new(mapping, strength).exclusive())
}

/// A weak candidate with the given origin type.
pub fn weak_from(s: &str, mapping: &str, origin: OriginType) -> ValueWithOrigin {
    ValueWithOrigin::new(
        tagged(s, mapping).with_origin_type(origin),
        Mapping::new(mapping, MappingStrength::Weak),
    )
}

/// Sorted provenance sources of `value`.
pub fn sources(value: &ItemValue) -> Vec<&str> {
    value.metadata.sources.iter().map(String::as_str).collect()
}
