/// The equality notion used to group values into equivalence classes.
///
/// Two values are equivalent if, in priority order:
///
/// 1. both are container values carrying the same (present) identifier;
/// 2. a [`ValueMatcher`] is configured, both are property values, and the
///    matcher reports them equal;
/// 3. a [`ValueComparator`] is configured and returns [`Ordering::Equal`];
/// 4. their real content is equal (container identifiers ignored).
///
/// The relation is not transitive. With container values
/// `V1 (id=42, content C)`, `V2 (id=42, content C')` and `V3 (no id, content C)`
/// we get `V1 ~ V2` and `V1 ~ V3` but not `V2 ~ V3`. Partitioning is therefore
/// order dependent; see [`crate::partition`].
use std::cmp::Ordering;

use serde_json::Value;

use crate::error::ConsolidationError;
use crate::value::ItemValue;

// ---------------------------------------------------------------------------
// ValueMatcher
// ---------------------------------------------------------------------------

/// Matching rule for scalar (property) values.
pub trait ValueMatcher {
    /// Returns `true` if the two real values match.
    ///
    /// # Errors
    ///
    /// Returns [`ConsolidationError::Schema`] when the values cannot be
    /// compared under this rule.
    fn matches(&self, a: &Value, b: &Value) -> Result<bool, ConsolidationError>;

    /// Short name used in logs.
    fn name(&self) -> &str;
}

/// Exact JSON equality.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatcher;

impl ValueMatcher for ExactMatcher {
    fn matches(&self, a: &Value, b: &Value) -> Result<bool, ConsolidationError> {
        Ok(a == b)
    }

    fn name(&self) -> &str {
        "exact"
    }
}

/// Case-insensitive string matching. Non-string values cannot be compared.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseIgnoreMatcher;

impl ValueMatcher for CaseIgnoreMatcher {
    fn matches(&self, a: &Value, b: &Value) -> Result<bool, ConsolidationError> {
        match (a.as_str(), b.as_str()) {
            (Some(a), Some(b)) => Ok(a.to_lowercase() == b.to_lowercase()),
            (Some(_), None) | (None, Some(_)) | (None, None) => {
                Err(ConsolidationError::schema(format!(
                    "case-ignore matching rule requires string values, got {a} and {b}"
                )))
            }
        }
    }

    fn name(&self) -> &str {
        "case_ignore"
    }
}

// ---------------------------------------------------------------------------
// ValueComparator
// ---------------------------------------------------------------------------

/// Ordering-based equality over whole values.
///
/// Implemented for any `Fn(&ItemValue, &ItemValue) -> Ordering`.
pub trait ValueComparator {
    fn compare(&self, a: &ItemValue, b: &ItemValue) -> Ordering;
}

impl<F> ValueComparator for F
where
    F: Fn(&ItemValue, &ItemValue) -> Ordering,
{
    fn compare(&self, a: &ItemValue, b: &ItemValue) -> Ordering {
        self(a, b)
    }
}

// ---------------------------------------------------------------------------
// EquivalenceNotion
// ---------------------------------------------------------------------------

/// The active equality strategies for one consolidation run.
#[derive(Clone, Copy, Default)]
pub struct EquivalenceNotion<'a> {
    matcher: Option<&'a dyn ValueMatcher>,
    comparator: Option<&'a dyn ValueComparator>,
}

impl<'a> EquivalenceNotion<'a> {
    pub fn new(
        matcher: Option<&'a dyn ValueMatcher>,
        comparator: Option<&'a dyn ValueComparator>,
    ) -> Self {
        Self {
            matcher,
            comparator,
        }
    }

    /// Structural equality only.
    pub fn structural() -> Self {
        Self::default()
    }

    /// Name of the configured matcher, for logging.
    pub fn matcher_name(&self) -> &str {
        self.matcher.map_or("none", |m| m.name())
    }

    pub fn has_comparator(&self) -> bool {
        self.comparator.is_some()
    }

    /// Decides whether `a` and `b` are equivalent.
    ///
    /// # Errors
    ///
    /// Propagates matcher failures as [`ConsolidationError::Schema`].
    pub fn are_equivalent(&self, a: &ItemValue, b: &ItemValue) -> Result<bool, ConsolidationError> {
        if container_identifiers_present_and_equal(a, b) {
            return Ok(true);
        }
        if let Some(matcher) = self.matcher {
            if let (Some(ra), Some(rb)) = (a.real_property_value(), b.real_property_value()) {
                return matcher.matches(ra, rb);
            }
        }
        if let Some(comparator) = self.comparator {
            return Ok(comparator.compare(a, b) == Ordering::Equal);
        }
        Ok(a.equals_real_value(b))
    }
}

impl std::fmt::Debug for EquivalenceNotion<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EquivalenceNotion")
            .field("matcher", &self.matcher_name())
            .field("comparator", &self.has_comparator())
            .finish()
    }
}

fn container_identifiers_present_and_equal(a: &ItemValue, b: &ItemValue) -> bool {
    match (a.container_id(), b.container_id()) {
        (Some(ia), Some(ib)) => ia == ib,
        (Some(_), None) | (None, Some(_)) | (None, None) => false,
    }
}
