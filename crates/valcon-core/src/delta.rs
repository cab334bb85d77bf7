/// Item delta: the add/delete/replace change of a single item.
///
/// A delta is either *replace-shaped* (`values_to_replace` is `Some`) or
/// *add/delete-shaped*. Mixing the two is rejected with a schema error.
/// Values are compared by real value (see [`ItemValue::equals_real_value`]);
/// adding a value already present in the same set is a no-op.
use serde::{Deserialize, Serialize};

use crate::error::ConsolidationError;
use crate::newtypes::ItemPath;
use crate::value::{ItemValue, contains_real_value};

/// A change of one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDelta {
    /// Path of the changed item.
    pub path: ItemPath,
    /// Values to add.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values_to_add: Vec<ItemValue>,
    /// Values to delete.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values_to_delete: Vec<ItemValue>,
    /// Full replacement set. `Some(vec![])` means "replace with nothing".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values_to_replace: Option<Vec<ItemValue>>,
    /// Snapshot of the item before the delta, kept for auditing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_old_values: Option<Vec<ItemValue>>,
}

impl ItemDelta {
    /// Creates an empty delta for `path`.
    pub fn new(path: ItemPath) -> Self {
        Self {
            path,
            values_to_add: Vec::new(),
            values_to_delete: Vec::new(),
            values_to_replace: None,
            estimated_old_values: None,
        }
    }

    /// Returns `true` if this is a replace-shaped delta.
    pub fn is_replace(&self) -> bool {
        self.values_to_replace.is_some()
    }

    /// Returns `true` if the delta changes nothing.
    ///
    /// Estimated old values do not count as a change.
    pub fn is_empty(&self) -> bool {
        self.values_to_add.is_empty()
            && self.values_to_delete.is_empty()
            && self.values_to_replace.is_none()
    }

    /// Returns `true` if applying the delta to an empty item yields a value.
    pub fn adds_any_value(&self) -> bool {
        self.values_to_add_or_replace().next().is_some()
    }

    /// Adds `value` to the add set.
    ///
    /// # Errors
    ///
    /// Returns [`ConsolidationError::Schema`] if the delta is replace-shaped.
    pub fn add_value_to_add(&mut self, value: ItemValue) -> Result<(), ConsolidationError> {
        self.ensure_not_replace("add")?;
        if !contains_real_value(&self.values_to_add, &value) {
            self.values_to_add.push(value);
        }
        Ok(())
    }

    /// Adds `value` to the delete set.
    ///
    /// # Errors
    ///
    /// Returns [`ConsolidationError::Schema`] if the delta is replace-shaped.
    pub fn add_value_to_delete(&mut self, value: ItemValue) -> Result<(), ConsolidationError> {
        self.ensure_not_replace("delete")?;
        if !contains_real_value(&self.values_to_delete, &value) {
            self.values_to_delete.push(value);
        }
        Ok(())
    }

    /// Adds `value` to the replace set, turning the delta replace-shaped.
    ///
    /// # Errors
    ///
    /// Returns [`ConsolidationError::Schema`] if the delta already has values
    /// to add or delete.
    pub fn add_value_to_replace(&mut self, value: ItemValue) -> Result<(), ConsolidationError> {
        if !self.values_to_add.is_empty() || !self.values_to_delete.is_empty() {
            return Err(ConsolidationError::schema(format!(
                "delta for {} already has values to add or delete, cannot add value {value} to replace",
                self.path
            )));
        }
        let replace = self.values_to_replace.get_or_insert_with(Vec::new);
        if !contains_real_value(replace, &value) {
            replace.push(value);
        }
        Ok(())
    }

    /// Turns the delta into an (initially empty) replace-shaped delta.
    pub fn init_replace(&mut self) {
        self.values_to_add.clear();
        self.values_to_delete.clear();
        self.values_to_replace = Some(Vec::new());
    }

    /// Iterates over the values this delta asserts: values to add followed by
    /// values to replace.
    pub fn values_to_add_or_replace(&self) -> impl Iterator<Item = &ItemValue> {
        self.values_to_add
            .iter()
            .chain(self.values_to_replace.iter().flatten())
    }

    /// Applies the delta to `values` in place.
    pub fn apply_to(&self, values: &mut Vec<ItemValue>) {
        if let Some(replace) = &self.values_to_replace {
            values.clone_from(replace);
            return;
        }
        values.retain(|v| !contains_real_value(&self.values_to_delete, v));
        for value in &self.values_to_add {
            if !contains_real_value(values, value) {
                values.push(value.clone());
            }
        }
    }

    fn ensure_not_replace(&self, operation: &str) -> Result<(), ConsolidationError> {
        match &self.values_to_replace {
            Some(replace) => Err(ConsolidationError::schema(format!(
                "delta for {} already has {} value(s) to replace, cannot {operation} values",
                self.path,
                replace.len()
            ))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use serde_json::json;

    use super::*;

    fn path() -> ItemPath {
        ItemPath::try_from("fullName").expect("valid")
    }

    fn v(s: &str) -> ItemValue {
        ItemValue::property(json!(s))
    }

    #[test]
    fn add_is_idempotent_by_real_value() {
        let mut d = ItemDelta::new(path());
        d.add_value_to_add(v("a")).expect("add");
        d.add_value_to_add(v("a")).expect("add again");
        assert_eq!(d.values_to_add.len(), 1);
    }

    #[test]
    fn replace_and_add_are_exclusive() {
        let mut d = ItemDelta::new(path());
        d.add_value_to_replace(v("a")).expect("replace");
        assert!(matches!(
            d.add_value_to_add(v("b")),
            Err(ConsolidationError::Schema(_))
        ));
        assert!(matches!(
            d.add_value_to_delete(v("b")),
            Err(ConsolidationError::Schema(_))
        ));

        let mut d = ItemDelta::new(path());
        d.add_value_to_delete(v("a")).expect("delete");
        assert!(d.add_value_to_replace(v("b")).is_err());
    }

    #[test]
    fn empty_replace_is_not_empty_delta() {
        let mut d = ItemDelta::new(path());
        assert!(d.is_empty());
        d.init_replace();
        assert!(!d.is_empty());
        assert!(!d.adds_any_value());

        d.add_value_to_replace(v("r")).expect("replace");
        assert!(d.adds_any_value());
        let asserted: Vec<&ItemValue> = d.values_to_add_or_replace().collect();
        assert_eq!(asserted, vec![&v("r")]);
    }

    #[test]
    fn add_set_is_asserted_without_replace() {
        let mut d = ItemDelta::new(path());
        d.add_value_to_delete(v("gone")).expect("delete");
        assert!(!d.adds_any_value());
        d.add_value_to_add(v("a")).expect("add");
        let asserted: Vec<&ItemValue> = d.values_to_add_or_replace().collect();
        assert_eq!(asserted, vec![&v("a")]);
        assert!(d.adds_any_value());
    }

    #[test]
    fn apply_add_delete() {
        let mut d = ItemDelta::new(path());
        d.add_value_to_delete(v("a")).expect("delete");
        d.add_value_to_add(v("b")).expect("add");
        d.add_value_to_add(v("c")).expect("add");
        let mut values = vec![v("a"), v("c")];
        d.apply_to(&mut values);
        assert_eq!(values, vec![v("c"), v("b")]);
    }

    #[test]
    fn apply_replace() {
        let mut d = ItemDelta::new(path());
        d.init_replace();
        let mut values = vec![v("a")];
        d.apply_to(&mut values);
        assert!(values.is_empty());
    }
}
