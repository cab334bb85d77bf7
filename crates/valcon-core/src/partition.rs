//! Equivalence partitioning of candidate, existing and a-priori values.
//!
//! Every observed value is assigned to exactly one [`EquivalenceClass`]. Values
//! are visited in a fixed order (plus, zero, minus candidates; existing values;
//! a-priori values to add, to replace, to delete) and compared against the
//! representative of each known class in discovery order. The first match
//! wins; otherwise a new class is appended to the arena.
//!
//! Because the equality notion is not transitive (see
//! [`crate::equivalence`]), comparing against the representative only, and in
//! discovery order, is what makes the outcome deterministic.
use std::fmt;

use tracing::trace;

use crate::delta::ItemDelta;
use crate::equivalence::EquivalenceNotion;
use crate::error::ConsolidationError;
use crate::mapping::{MappingStrength, StrengthSelector};
use crate::triple::{DeltaSetTriple, ValueWithOrigin};
use crate::value::ItemValue;

// ---------------------------------------------------------------------------
// EquivalenceClass
// ---------------------------------------------------------------------------

/// A set of values considered identical, with their provenance.
#[derive(Debug, Clone)]
pub struct EquivalenceClass<'a> {
    /// 1-based discovery index, for diagnostics only.
    pub id: usize,
    representative: &'a ItemValue,
    /// Candidates with this value in the plus set (strength- and
    /// validity-filtered).
    pub plus_origins: Vec<&'a ValueWithOrigin>,
    /// Candidates with this value in the zero set (strength- and
    /// validity-filtered).
    pub zero_origins: Vec<&'a ValueWithOrigin>,
    /// Candidates with this value in the minus set. Candidates that were valid
    /// and became invalid are kept here.
    pub minus_origins: Vec<&'a ValueWithOrigin>,
    pub presence_in_existing_item: Vec<&'a ItemValue>,
    pub presence_in_apriori_plus: Vec<&'a ItemValue>,
    pub presence_in_apriori_minus: Vec<&'a ItemValue>,
}

impl<'a> EquivalenceClass<'a> {
    fn new(id: usize, representative: &'a ItemValue) -> Self {
        Self {
            id,
            representative,
            plus_origins: Vec::new(),
            zero_origins: Vec::new(),
            minus_origins: Vec::new(),
            presence_in_existing_item: Vec::new(),
            presence_in_apriori_plus: Vec::new(),
            presence_in_apriori_minus: Vec::new(),
        }
    }

    /// The first value that created this class.
    pub fn representative(&self) -> &'a ItemValue {
        self.representative
    }

    pub fn present_in_existing_item(&self) -> bool {
        !self.presence_in_existing_item.is_empty()
    }

    /// The first existing-item value in this class, if any.
    pub fn existing_value(&self) -> Option<&'a ItemValue> {
        self.presence_in_existing_item.first().copied()
    }

    /// Returns `true` if no candidate asserts or retracts this value.
    pub fn has_no_origins(&self) -> bool {
        self.plus_origins.is_empty() && self.zero_origins.is_empty() && self.minus_origins.is_empty()
    }

    /// Total number of values recorded in this class.
    pub fn member_count(&self) -> usize {
        self.plus_origins.len()
            + self.zero_origins.len()
            + self.minus_origins.len()
            + self.presence_in_existing_item.len()
            + self.presence_in_apriori_plus.len()
            + self.presence_in_apriori_minus.len()
    }

    fn origins_mut(&mut self, slot: OriginSlot) -> &mut Vec<&'a ValueWithOrigin> {
        match slot {
            OriginSlot::Plus => &mut self.plus_origins,
            OriginSlot::Zero => &mut self.zero_origins,
            OriginSlot::Minus => &mut self.minus_origins,
        }
    }

    fn presence_mut(&mut self, slot: PresenceSlot) -> &mut Vec<&'a ItemValue> {
        match slot {
            PresenceSlot::Existing => &mut self.presence_in_existing_item,
            PresenceSlot::AprioriPlus => &mut self.presence_in_apriori_plus,
            PresenceSlot::AprioriMinus => &mut self.presence_in_apriori_minus,
        }
    }
}

impl fmt::Display for EquivalenceClass<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} (triple: {}+/{}z/{}-, existing: {}, apriori: {}/{})",
            self.id,
            self.representative,
            self.plus_origins.len(),
            self.zero_origins.len(),
            self.minus_origins.len(),
            self.presence_in_existing_item.len(),
            self.presence_in_apriori_plus.len(),
            self.presence_in_apriori_minus.len()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OriginSlot {
    Plus,
    Zero,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PresenceSlot {
    Existing,
    AprioriPlus,
    AprioriMinus,
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Returns `true` if candidates of `strength` are excluded by `selector`.
pub fn should_skip_mapping(selector: StrengthSelector, strength: MappingStrength) -> bool {
    !selector.admits(strength)
}

/// Returns `true` if `origin` takes part in partitioning.
///
/// Valid candidates always qualify. Candidates that became invalid qualify
/// only when `take_valid_invalid` is set (the minus set).
pub fn should_categorize(
    origin: &ValueWithOrigin,
    selector: StrengthSelector,
    take_valid_invalid: bool,
) -> bool {
    !should_skip_mapping(selector, origin.strength())
        && (origin.valid || take_valid_invalid && origin.was_valid)
}

// ---------------------------------------------------------------------------
// Partition
// ---------------------------------------------------------------------------

/// Inputs to a partitioning pass.
#[derive(Debug, Clone, Copy)]
pub struct PartitionInputs<'a> {
    pub triple: &'a DeltaSetTriple<ValueWithOrigin>,
    pub existing: Option<&'a [ItemValue]>,
    pub apriori: Option<&'a ItemDelta>,
    pub selector: StrengthSelector,
}

/// Arena of equivalence classes in discovery order.
#[derive(Debug, Clone, Default)]
pub struct Partition<'a> {
    classes: Vec<EquivalenceClass<'a>>,
}

impl<'a> Partition<'a> {
    /// Partitions all inputs.
    ///
    /// # Errors
    ///
    /// Propagates equality failures (see
    /// [`EquivalenceNotion::are_equivalent`]).
    pub fn build(
        inputs: PartitionInputs<'a>,
        notion: &EquivalenceNotion<'_>,
    ) -> Result<Self, ConsolidationError> {
        let mut partition = Self::default();
        let triple = inputs.triple;
        partition.add_origins(&triple.plus, OriginSlot::Plus, false, inputs.selector, notion)?;
        partition.add_origins(&triple.zero, OriginSlot::Zero, false, inputs.selector, notion)?;
        partition.add_origins(&triple.minus, OriginSlot::Minus, true, inputs.selector, notion)?;
        if let Some(existing) = inputs.existing {
            partition.add_values(existing, PresenceSlot::Existing, notion)?;
        }
        if let Some(apriori) = inputs.apriori {
            partition.add_values(&apriori.values_to_add, PresenceSlot::AprioriPlus, notion)?;
            if let Some(replace) = &apriori.values_to_replace {
                partition.add_values(replace, PresenceSlot::AprioriPlus, notion)?;
            }
            partition.add_values(&apriori.values_to_delete, PresenceSlot::AprioriMinus, notion)?;
        }
        Ok(partition)
    }

    fn add_origins(
        &mut self,
        origins: &'a [ValueWithOrigin],
        slot: OriginSlot,
        take_valid_invalid: bool,
        selector: StrengthSelector,
        notion: &EquivalenceNotion<'_>,
    ) -> Result<(), ConsolidationError> {
        for origin in origins {
            if should_categorize(origin, selector, take_valid_invalid) {
                let idx = self.find_or_create(&origin.value, notion)?;
                self.classes[idx].origins_mut(slot).push(origin);
            } else {
                trace!(candidate = %origin, ?slot, "not categorizing candidate");
            }
        }
        Ok(())
    }

    fn add_values(
        &mut self,
        values: &'a [ItemValue],
        slot: PresenceSlot,
        notion: &EquivalenceNotion<'_>,
    ) -> Result<(), ConsolidationError> {
        for value in values {
            let idx = self.find_or_create(value, notion)?;
            self.classes[idx].presence_mut(slot).push(value);
        }
        Ok(())
    }

    fn find_or_create(
        &mut self,
        value: &'a ItemValue,
        notion: &EquivalenceNotion<'_>,
    ) -> Result<usize, ConsolidationError> {
        for (idx, class) in self.classes.iter().enumerate() {
            if notion.are_equivalent(class.representative, value)? {
                return Ok(idx);
            }
        }
        self.classes
            .push(EquivalenceClass::new(self.classes.len() + 1, value));
        Ok(self.classes.len() - 1)
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Iterates over classes in discovery order.
    pub fn iter(&self) -> std::slice::Iter<'_, EquivalenceClass<'a>> {
        self.classes.iter()
    }

    pub fn classes(&self) -> &[EquivalenceClass<'a>] {
        &self.classes
    }
}

// ---------------------------------------------------------------------------
// First-match grouping
// ---------------------------------------------------------------------------

/// Groups candidates by first match against each group's head.
///
/// The first remaining candidate becomes the head of a new group and pulls in
/// every later candidate equivalent to it. Repeats until all candidates are
/// grouped. Used by the weak-mapping fallback.
///
/// # Errors
///
/// Propagates equality failures.
pub fn group_first_match<'a>(
    candidates: Vec<&'a ValueWithOrigin>,
    notion: &EquivalenceNotion<'_>,
) -> Result<Vec<Vec<&'a ValueWithOrigin>>, ConsolidationError> {
    let mut remaining = candidates;
    let mut groups = Vec::new();
    while !remaining.is_empty() {
        let head = remaining.remove(0);
        let mut group = vec![head];
        let mut rest = Vec::with_capacity(remaining.len());
        for candidate in remaining {
            if notion.are_equivalent(&head.value, &candidate.value)? {
                group.push(candidate);
            } else {
                rest.push(candidate);
            }
        }
        remaining = rest;
        groups.push(group);
    }
    Ok(groups)
}
