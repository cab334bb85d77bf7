/// Item values, their content, and provenance metadata.
///
/// An [`ItemValue`] is either a scalar *property* value or a structured
/// *container* value. Container values may carry a numeric identifier which
/// takes part in equivalence checking (see [`crate::equivalence`]).
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::newtypes::ItemPath;

// ---------------------------------------------------------------------------
// OriginType
// ---------------------------------------------------------------------------

/// Where a value came from, as far as the weak-mapping fallback cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginType {
    /// Produced by an assignment-based construction.
    Assignments,
    /// Produced by a resource outbound mapping.
    Outbound,
    /// Produced by a resource inbound mapping.
    Inbound,
    /// Produced by the object template or user policy.
    UserPolicy,
    /// Any other origin.
    Other,
}

// ---------------------------------------------------------------------------
// ValueMetadata
// ---------------------------------------------------------------------------

/// Provenance metadata attached to a value.
///
/// `sources` lists the provenance tags (typically mapping names) the value
/// was derived from. `extra` carries any additional fields a metadata
/// computer wants to record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValueMetadata {
    /// Sorted provenance tags.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub sources: BTreeSet<String>,
    /// Additional computer-specific fields.
    #[serde(default, flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ValueMetadata {
    /// Metadata with a single provenance tag.
    pub fn from_source(source: impl Into<String>) -> Self {
        let mut sources = BTreeSet::new();
        sources.insert(source.into());
        Self {
            sources,
            extra: BTreeMap::new(),
        }
    }

    /// Returns `true` if no provenance and no extra fields are recorded.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.extra.is_empty()
    }
}

// ---------------------------------------------------------------------------
// ValueContent
// ---------------------------------------------------------------------------

/// The real content of an item value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueContent {
    /// A scalar value.
    Property {
        /// The real value.
        value: serde_json::Value,
    },
    /// A structured value.
    Container {
        /// Container identifier, unique within the item when present.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<u64>,
        /// Field values.
        #[serde(default)]
        fields: BTreeMap<String, serde_json::Value>,
    },
}

// ---------------------------------------------------------------------------
// ItemValue
// ---------------------------------------------------------------------------

/// One value of an item, together with its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemValue {
    /// The real content.
    #[serde(flatten)]
    pub content: ValueContent,
    /// Provenance metadata.
    #[serde(default, skip_serializing_if = "ValueMetadata::is_empty")]
    pub metadata: ValueMetadata,
    /// Origin of the value, used by the weak-mapping fallback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_type: Option<OriginType>,
    /// Name of the mapping that created an assignment value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_mapping_name: Option<String>,
}

impl ItemValue {
    /// Creates a property value.
    pub fn property(value: impl Into<serde_json::Value>) -> Self {
        Self::from_content(ValueContent::Property {
            value: value.into(),
        })
    }

    /// Creates a container value.
    pub fn container(id: Option<u64>, fields: BTreeMap<String, serde_json::Value>) -> Self {
        Self::from_content(ValueContent::Container { id, fields })
    }

    fn from_content(content: ValueContent) -> Self {
        Self {
            content,
            metadata: ValueMetadata::default(),
            origin_type: None,
            origin_mapping_name: None,
        }
    }

    /// Sets the origin type.
    #[must_use]
    pub fn with_origin_type(mut self, origin_type: OriginType) -> Self {
        self.origin_type = Some(origin_type);
        self
    }

    /// Sets the metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: ValueMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Returns the scalar value if this is a property value.
    pub fn real_property_value(&self) -> Option<&serde_json::Value> {
        match &self.content {
            ValueContent::Property { value } => Some(value),
            ValueContent::Container { .. } => None,
        }
    }

    /// Returns the container identifier, if this is a container value that
    /// has one.
    pub fn container_id(&self) -> Option<u64> {
        match &self.content {
            ValueContent::Container { id, .. } => *id,
            ValueContent::Property { .. } => None,
        }
    }

    /// Compares real content only: container identifiers, metadata and
    /// origin information are ignored.
    pub fn equals_real_value(&self, other: &ItemValue) -> bool {
        match (&self.content, &other.content) {
            (ValueContent::Property { value: a }, ValueContent::Property { value: b }) => a == b,
            (
                ValueContent::Container { fields: a, .. },
                ValueContent::Container { fields: b, .. },
            ) => a == b,
            (ValueContent::Property { .. }, ValueContent::Container { .. })
            | (ValueContent::Container { .. }, ValueContent::Property { .. }) => false,
        }
    }
}

impl fmt::Display for ItemValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.content {
            ValueContent::Property { value } => write!(f, "{value}"),
            ValueContent::Container { id, fields } => {
                let body = serde_json::to_string(fields).unwrap_or_default();
                match id {
                    Some(id) => write!(f, "[{id}]{body}"),
                    None => f.write_str(&body),
                }
            }
        }
    }
}

/// Returns `true` if `values` contains a value with the same real content.
pub fn contains_real_value(values: &[ItemValue], value: &ItemValue) -> bool {
    values.iter().any(|v| v.equals_real_value(value))
}

// ---------------------------------------------------------------------------
// ItemContainer
// ---------------------------------------------------------------------------

/// A flat view of an object's items, keyed by item path.
///
/// Used to look up the existing item when the caller does not supply it
/// directly.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemContainer {
    /// Values per item path.
    #[serde(default)]
    pub items: BTreeMap<ItemPath, Vec<ItemValue>>,
}

impl ItemContainer {
    /// Finds the item with a path equivalent to `path`.
    pub fn find_item(&self, path: &ItemPath) -> Option<&[ItemValue]> {
        if let Some(values) = self.items.get(path) {
            return Some(values);
        }
        self.items
            .iter()
            .find(|(p, _)| p.equivalent(path))
            .map(|(_, values)| values.as_slice())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use serde_json::json;

    use super::*;

    fn fields(v: serde_json::Value) -> BTreeMap<String, serde_json::Value> {
        serde_json::from_value(v).expect("object")
    }

    #[test]
    fn real_value_ignores_container_id_and_metadata() {
        let a = ItemValue::container(Some(1), fields(json!({"role": "admin"})));
        let b = ItemValue::container(Some(2), fields(json!({"role": "admin"})))
            .with_metadata(ValueMetadata::from_source("m1"));
        assert!(a.equals_real_value(&b));
    }

    #[test]
    fn property_never_equals_container() {
        let p = ItemValue::property(json!("admin"));
        let c = ItemValue::container(None, fields(json!({"value": "admin"})));
        assert!(!p.equals_real_value(&c));
        assert!(!c.equals_real_value(&p));
    }

    #[test]
    fn serde_shape_is_flat() {
        let v = ItemValue::property(json!("alice")).with_origin_type(OriginType::Outbound);
        let encoded = serde_json::to_value(&v).expect("serialize");
        assert_eq!(
            encoded,
            json!({"kind": "property", "value": "alice", "origin_type": "outbound"})
        );
        let decoded: ItemValue = serde_json::from_value(encoded).expect("deserialize");
        assert_eq!(decoded, v);
    }

    #[test]
    fn container_lookup_by_equivalent_path() {
        let mut container = ItemContainer::default();
        container.items.insert(
            ItemPath::try_from("attributes/ri:mail").expect("valid"),
            vec![ItemValue::property(json!("a@x"))],
        );
        let path = ItemPath::try_from("attributes/mail").expect("valid");
        let found = container.find_item(&path).expect("found");
        assert_eq!(found.len(), 1);
        let missing = ItemPath::try_from("attributes/cn").expect("valid");
        assert!(container.find_item(&missing).is_none());
    }
}
