//! Per-class decisions: add, delete, or leave the value untouched.
//!
//! The add and delete rules are pure functions ([`decide_add`],
//! [`decide_delete`]) of the class, the mapping classification and the
//! [`DecisionContext`]. The `consolidate*` functions act on their outcome
//! through the [`DeltaAssembler`].
use tracing::{error, trace};

use crate::assembler::DeltaAssembler;
use crate::config::ConsolidationConfig;
use crate::delta::ItemDelta;
use crate::error::ConsolidationError;
use crate::mapping::Mapping;
use crate::newtypes::ItemPath;
use crate::partition::EquivalenceClass;
use crate::triple::ValueWithOrigin;
use crate::value::ItemValue;

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Run-wide facts the per-class rules depend on.
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext<'a> {
    pub item_path: &'a ItemPath,
    pub config: &'a ConsolidationConfig,
    /// No existing item, or one without values.
    pub existing_item_is_empty: bool,
    pub item_delta_exists: bool,
    /// Exclusive-strong item with at least one strong candidate (or nothing
    /// selected at all).
    pub ignore_normal_mappings: bool,
}

impl DecisionContext<'_> {
    fn apriori_delta_blocks_non_strong(&self) -> bool {
        self.item_delta_exists && !self.config.skip_normal_mapping_apriori_delta_check
    }
}

// ---------------------------------------------------------------------------
// Mapping classification
// ---------------------------------------------------------------------------

/// Strength summary of a set of origins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingClassification {
    /// Every origin is weak (vacuously true for no origins).
    pub only_weak: bool,
    pub at_least_one_strong: bool,
}

/// Classifies `origins` by strength.
///
/// With `check_exclusiveness`, two different exclusive mappings among
/// `origins` are an exclusion conflict. Mappings are compared as a whole;
/// a shared name does not make them the same mapping.
///
/// # Errors
///
/// [`ConsolidationError::Conflict`] naming both exclusive mappings.
pub fn classify_mappings(
    origins: &[&ValueWithOrigin],
    check_exclusiveness: bool,
    ctx: &DecisionContext<'_>,
) -> Result<MappingClassification, ConsolidationError> {
    let mut classification = MappingClassification {
        only_weak: true,
        at_least_one_strong: false,
    };
    let mut exclusive: Option<&Mapping> = None;
    for origin in origins {
        let mapping = &origin.mapping;
        if !mapping.is_weak() {
            classification.only_weak = false;
        }
        if mapping.is_strong() {
            classification.at_least_one_strong = true;
        }
        if check_exclusiveness && mapping.exclusive {
            match exclusive {
                None => exclusive = Some(mapping),
                Some(first) if first == mapping => {}
                Some(first) => {
                    let err = ConsolidationError::Conflict {
                        context: ctx.config.context_description.clone(),
                        item_path: ctx.item_path.to_string(),
                        first: first.to_string(),
                        second: mapping.to_string(),
                    };
                    error!("{err}");
                    return Err(err);
                }
            }
        }
    }
    Ok(classification)
}

// ---------------------------------------------------------------------------
// Adding origins
// ---------------------------------------------------------------------------

/// Origins that are a reason to add the class's value: plus origins, plus
/// (all or selected) zero origins depending on the configuration.
pub fn adding_origins<'a>(
    class: &EquivalenceClass<'a>,
    config: &ConsolidationConfig,
) -> Vec<&'a ValueWithOrigin> {
    let mut origins = class.plus_origins.clone();
    if config.add_unchanged_values {
        origins.extend(class.zero_origins.iter().copied());
    } else if config.add_unchanged_values_except_for_normal_mappings {
        origins.extend(class.zero_origins.iter().copied().filter(|o| {
            let m = &o.mapping;
            m.is_strong() || m.is_weak() || m.is_normal() && m.sourceless
        }));
    }
    origins
}

fn non_weak_values<'a>(origins: &[&'a ValueWithOrigin]) -> Vec<&'a ItemValue> {
    origins
        .iter()
        .filter(|o| !o.is_weak())
        .map(|o| &o.value)
        .collect()
}

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

/// Outcome of the add rules, in rule order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddDecision {
    /// Only weak mappings; left to the weak fallback.
    Postpone,
    /// The existing item already has the value.
    AlreadyPresent,
    /// Existing item unknown but a non-weak zero origin implies presence.
    AssumedPresent,
    /// No strong mapping and normal mappings are ignored.
    NormalIgnored,
    /// No strong mapping and the item already has a delta.
    AprioriDeltaExists,
    Add,
}

/// Decides whether a class with adding origins is added.
pub fn decide_add(
    class: &EquivalenceClass<'_>,
    classification: MappingClassification,
    ctx: &DecisionContext<'_>,
) -> AddDecision {
    if classification.only_weak {
        return AddDecision::Postpone;
    }
    if ctx.config.existing_item_known {
        if class.present_in_existing_item() {
            return AddDecision::AlreadyPresent;
        }
    } else if class.zero_origins.iter().any(|o| !o.is_weak()) {
        return AddDecision::AssumedPresent;
    }
    if !classification.at_least_one_strong {
        if ctx.ignore_normal_mappings {
            return AddDecision::NormalIgnored;
        }
        if ctx.apriori_delta_blocks_non_strong() {
            return AddDecision::AprioriDeltaExists;
        }
    }
    AddDecision::Add
}

/// Outcome of the delete rules for a class with minus origins only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteDecision {
    /// Only weak mappings and the item still has values.
    KeepWeak,
    /// Existing item known and the value is not in it.
    NotPresent,
    /// No strong mapping and the item already has a delta.
    AprioriDeltaExists,
    Delete,
}

/// Decides whether a class with only minus origins is deleted.
pub fn decide_delete(
    class: &EquivalenceClass<'_>,
    classification: MappingClassification,
    ctx: &DecisionContext<'_>,
) -> DeleteDecision {
    if classification.only_weak && !ctx.existing_item_is_empty {
        return DeleteDecision::KeepWeak;
    }
    if ctx.config.existing_item_known && !class.present_in_existing_item() {
        return DeleteDecision::NotPresent;
    }
    if !classification.at_least_one_strong && ctx.apriori_delta_blocks_non_strong() {
        return DeleteDecision::AprioriDeltaExists;
    }
    DeleteDecision::Delete
}

// ---------------------------------------------------------------------------
// Standard mode
// ---------------------------------------------------------------------------

/// Consolidates one class in standard mode.
///
/// # Errors
///
/// Exclusion conflicts, metadata computer failures and delta misuse.
pub(crate) fn consolidate(
    class: &EquivalenceClass<'_>,
    ctx: &DecisionContext<'_>,
    assembler: &mut DeltaAssembler<'_>,
) -> Result<(), ConsolidationError> {
    let adding = adding_origins(class, ctx.config);
    if !adding.is_empty() {
        trace!(%class, adding = adding.len(), "value has adding origins");
        let classification = classify_mappings(&adding, true, ctx)?;
        consolidate_to_add_set(class, &adding, classification, ctx, assembler)
    } else if !class.zero_origins.is_empty() {
        let non_weak = non_weak_values(&class.zero_origins);
        assembler.compute_metadata_on_existing_value(class, &non_weak)
    } else if !class.minus_origins.is_empty() {
        let classification = classify_mappings(&class.minus_origins, false, ctx)?;
        match decide_delete(class, classification, ctx) {
            DeleteDecision::Delete => {
                trace!(%class, item = %ctx.item_path, "value added to delta as DELETE");
                assembler.delete_value(class.representative())
            }
            decision @ (DeleteDecision::KeepWeak
            | DeleteDecision::NotPresent
            | DeleteDecision::AprioriDeltaExists) => {
                trace!(%class, ?decision, "keeping value, nothing to compute its metadata from");
                Ok(())
            }
        }
    } else {
        trace!(
            %class,
            item = %ctx.item_path,
            "value has no visible origins, probably filtered out; leaving it untouched"
        );
        Ok(())
    }
}

fn consolidate_to_add_set(
    class: &EquivalenceClass<'_>,
    adding: &[&ValueWithOrigin],
    classification: MappingClassification,
    ctx: &DecisionContext<'_>,
    assembler: &mut DeltaAssembler<'_>,
) -> Result<(), ConsolidationError> {
    match decide_add(class, classification, ctx) {
        AddDecision::AlreadyPresent => {
            trace!(%class, "value already present, recomputing metadata of existing value");
            assembler.compute_metadata_on_existing_value(class, &non_weak_values(adding))
        }
        AddDecision::Add => {
            trace!(%class, item = %ctx.item_path, "decided to ADD value");
            let mut inputs: Vec<&ItemValue> = Vec::new();
            inputs.extend(class.existing_value());
            inputs.extend(non_weak_values(adding));
            inputs.extend(class.presence_in_apriori_plus.iter().copied());
            inputs.extend(class.presence_in_existing_item.iter().copied());
            let metadata = assembler.compute_metadata(&inputs)?;
            assembler.add_value(class.representative(), metadata, adding)
        }
        decision @ (AddDecision::Postpone
        | AddDecision::AssumedPresent
        | AddDecision::NormalIgnored
        | AddDecision::AprioriDeltaExists) => {
            trace!(%class, ?decision, item = %ctx.item_path, "value not added");
            Ok(())
        }
    }
}

/// Deletes an existing value that no candidate mentions.
pub(crate) fn consolidate_existing_value(
    class: &EquivalenceClass<'_>,
    assembler: &mut DeltaAssembler<'_>,
) -> Result<(), ConsolidationError> {
    if class.present_in_existing_item() && class.has_no_origins() {
        trace!(%class, "existing value has no origins, removing it");
        assembler.delete_value(class.representative())?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// A-priori mode
// ---------------------------------------------------------------------------

/// Consolidates one class against an a-priori delta.
///
/// # Errors
///
/// Metadata computer failures and delta misuse.
pub(crate) fn consolidate_apriori(
    class: &EquivalenceClass<'_>,
    apriori: &ItemDelta,
    ctx: &DecisionContext<'_>,
    assembler: &mut DeltaAssembler<'_>,
) -> Result<(), ConsolidationError> {
    let adding = adding_origins(class, ctx.config);
    let in_apriori_plus = !class.presence_in_apriori_plus.is_empty();
    let in_apriori_minus = !class.presence_in_apriori_minus.is_empty();
    let in_existing = class.present_in_existing_item();

    if apriori.is_replace() {
        if !in_apriori_plus {
            trace!(%class, "skipping existing value not part of REPLACE delta");
            return Ok(());
        }
        trace!(%class, "adding value to REPLACE set");
        let metadata = assembler.compute_metadata(&apriori_inputs(class))?;
        return assembler.replace_value(class.representative(), metadata, &adding);
    }

    if in_apriori_plus {
        trace!(%class, phantom = in_existing, "adding value from a-priori delta");
        let metadata = assembler.compute_metadata(&apriori_inputs(class))?;
        assembler.add_value(class.representative(), metadata, &adding)
    } else if in_apriori_minus {
        if in_existing {
            trace!(%class, "real deletion, adding to delta without metadata");
            assembler.delete_value(class.representative())
        } else {
            trace!(%class, "phantom deletion, skipping value");
            Ok(())
        }
    } else {
        trace!(%class, "value in neither a-priori add nor delete set, keeping untouched");
        Ok(())
    }
}

fn apriori_inputs<'a>(class: &EquivalenceClass<'a>) -> Vec<&'a ItemValue> {
    let mut inputs = Vec::new();
    inputs.extend(class.existing_value());
    inputs.extend(class.presence_in_apriori_plus.iter().copied());
    inputs.extend(class.presence_in_existing_item.iter().copied());
    inputs
}
