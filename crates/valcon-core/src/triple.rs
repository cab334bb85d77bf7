/// Candidate values with origin, and the plus/zero/minus delta set triple.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::mapping::{Mapping, MappingStrength};
use crate::value::ItemValue;

// ---------------------------------------------------------------------------
// ValueWithOrigin
// ---------------------------------------------------------------------------

fn default_true() -> bool {
    true
}

/// A candidate value together with the mapping that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueWithOrigin {
    /// The proposed value.
    pub value: ItemValue,
    /// The producing mapping.
    pub mapping: Mapping,
    /// Whether the producing construction is currently valid.
    #[serde(default = "default_true")]
    pub valid: bool,
    /// Whether the producing construction was valid in the previous
    /// evaluation. Only consulted for minus-set candidates.
    #[serde(default = "default_true")]
    pub was_valid: bool,
}

impl ValueWithOrigin {
    /// A valid candidate.
    pub fn new(value: ItemValue, mapping: Mapping) -> Self {
        Self {
            value,
            mapping,
            valid: true,
            was_valid: true,
        }
    }

    /// Sets the validity flags.
    #[must_use]
    pub fn with_validity(mut self, valid: bool, was_valid: bool) -> Self {
        self.valid = valid;
        self.was_valid = was_valid;
        self
    }

    pub fn strength(&self) -> MappingStrength {
        self.mapping.strength
    }

    pub fn is_weak(&self) -> bool {
        self.mapping.is_weak()
    }
}

impl fmt::Display for ValueWithOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {}", self.value, self.mapping)?;
        if !self.valid {
            f.write_str(if self.was_valid {
                " [became invalid]"
            } else {
                " [invalid]"
            })?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// DeltaSetTriple
// ---------------------------------------------------------------------------

/// Three-way partition of candidates: definitely added, unchanged, and
/// definitely removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeltaSetTriple<T> {
    pub plus: Vec<T>,
    pub zero: Vec<T>,
    pub minus: Vec<T>,
}

impl<T> Default for DeltaSetTriple<T> {
    fn default() -> Self {
        Self {
            plus: Vec::new(),
            zero: Vec::new(),
            minus: Vec::new(),
        }
    }
}

impl<T> DeltaSetTriple<T> {
    /// Returns `true` if all three sets are empty.
    pub fn is_empty(&self) -> bool {
        self.plus.is_empty() && self.zero.is_empty() && self.minus.is_empty()
    }

    /// Total number of entries across all three sets.
    pub fn len(&self) -> usize {
        self.plus.len() + self.zero.len() + self.minus.len()
    }

    /// Iterates over plus then zero entries.
    pub fn non_negative_values(&self) -> impl Iterator<Item = &T> {
        self.plus.iter().chain(self.zero.iter())
    }

    /// Iterates over plus, zero, then minus entries.
    pub fn all_values(&self) -> impl Iterator<Item = &T> {
        self.plus
            .iter()
            .chain(self.zero.iter())
            .chain(self.minus.iter())
    }

    /// Applies `f` to every entry, keeping the set structure.
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> DeltaSetTriple<U> {
        DeltaSetTriple {
            plus: self.plus.iter().map(&mut f).collect(),
            zero: self.zero.iter().map(&mut f).collect(),
            minus: self.minus.iter().map(&mut f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use serde_json::json;

    use super::*;

    fn candidate(v: &str) -> ValueWithOrigin {
        ValueWithOrigin::new(
            ItemValue::property(json!(v)),
            Mapping::new("m", MappingStrength::Normal),
        )
    }

    #[test]
    fn iteration_order_is_plus_zero_minus() {
        let triple = DeltaSetTriple {
            plus: vec![candidate("p")],
            zero: vec![candidate("z")],
            minus: vec![candidate("m")],
        };
        let seen: Vec<String> = triple.all_values().map(|c| c.value.to_string()).collect();
        assert_eq!(seen, vec!["\"p\"", "\"z\"", "\"m\""]);
        assert_eq!(triple.non_negative_values().count(), 2);
        assert_eq!(triple.len(), 3);
    }

    #[test]
    fn map_keeps_structure() {
        let triple = DeltaSetTriple {
            plus: vec![candidate("a"), candidate("b")],
            zero: Vec::new(),
            minus: vec![candidate("c")],
        };
        let values = triple.map(|c| c.value.clone());
        assert_eq!(values.plus.len(), 2);
        assert!(values.zero.is_empty());
        assert_eq!(values.minus.len(), 1);
    }

    #[test]
    fn validity_defaults_to_true_in_json() {
        let c: ValueWithOrigin = serde_json::from_value(json!({
            "value": {"kind": "property", "value": "x"},
            "mapping": {"name": "m"}
        }))
        .expect("valid candidate");
        assert!(c.valid && c.was_valid);
        assert_eq!(c.value, ItemValue::property(json!("x")));
    }

    #[test]
    fn missing_sets_deserialize_as_empty() {
        let triple: DeltaSetTriple<ValueWithOrigin> = serde_json::from_value(json!({
            "plus": [{"value": {"kind": "property", "value": "x"}, "mapping": {"name": "m"}}]
        }))
        .expect("triple with plus only");
        assert_eq!(triple.plus.len(), 1);
        assert!(triple.zero.is_empty() && triple.minus.is_empty());

        let values: DeltaSetTriple<ItemValue> =
            serde_json::from_value(json!({})).expect("empty triple");
        assert!(values.is_empty());
    }
}
