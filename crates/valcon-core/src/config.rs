/// Behavioural switches for one consolidation run.
use serde::{Deserialize, Serialize};

use crate::mapping::StrengthSelector;

/// Configuration for the consolidator.
///
/// Deserialises from partial JSON; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidationConfig {
    /// Which mapping strengths take part.
    ///
    /// Default: [`StrengthSelector::ALL`].
    pub strength_selector: StrengthSelector,

    /// Treat zero-set candidates as reasons to add (typically on object add).
    ///
    /// Default: `false`.
    pub add_unchanged_values: bool,

    /// Like `add_unchanged_values`, but only for zero-set candidates from
    /// strong, weak, or sourceless normal mappings. Ignored when
    /// `add_unchanged_values` is set.
    ///
    /// Default: `false`.
    pub add_unchanged_values_except_for_normal_mappings: bool,

    /// Whether the existing item value is actually known. When `false`, a
    /// non-weak zero-set candidate is taken as proof the value exists.
    ///
    /// Default: `true`.
    pub existing_item_known: bool,

    /// When set and any strong candidate exists, values proposed only by
    /// normal mappings are not added.
    ///
    /// Default: `false`.
    pub is_exclusive_strong: bool,

    /// Delete existing values no candidate mentions. Experimental.
    ///
    /// Default: `false`.
    pub delete_existing_values: bool,

    /// Skip the "non-strong mapping and the item already has a delta" rule.
    ///
    /// Default: `false`.
    pub skip_normal_mapping_apriori_delta_check: bool,

    /// Whether the item already has a delta. `None` derives it from the
    /// a-priori delta being present and non-empty.
    ///
    /// Default: `None`.
    pub item_delta_exists: Option<bool>,

    /// Free-form description of the calling context, used in logs and
    /// conflict messages.
    ///
    /// Default: `"<unknown context>"`.
    pub context_description: String,
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            strength_selector: StrengthSelector::ALL,
            add_unchanged_values: false,
            add_unchanged_values_except_for_normal_mappings: false,
            existing_item_known: true,
            is_exclusive_strong: false,
            delete_existing_values: false,
            skip_normal_mapping_apriori_delta_check: false,
            item_delta_exists: None,
            context_description: "<unknown context>".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn partial_json_uses_defaults() {
        let config: ConsolidationConfig =
            serde_json::from_str(r#"{"add_unchanged_values": true}"#).expect("valid config");
        assert!(config.add_unchanged_values);
        assert!(config.existing_item_known);
        assert_eq!(config.strength_selector, StrengthSelector::ALL);
        assert_eq!(config.item_delta_exists, None);
    }

    #[test]
    fn selector_is_configurable() {
        let config: ConsolidationConfig = serde_json::from_str(
            r#"{"strength_selector": {"weak": false, "normal": true, "strong": true}}"#,
        )
        .expect("valid config");
        assert_eq!(config.strength_selector, StrengthSelector::ALL_EXCEPT_WEAK);
    }
}
