//! The item-value consolidator.
//!
//! A [`Consolidator`] reduces the candidate triple of one item, together with
//! the item's existing values and an optional a-priori delta, to a single
//! [`ItemDelta`]. It is built with [`ConsolidatorBuilder`] and consumed by one
//! of its `consolidate*` methods.
//!
//! Each run opens a minor child record named [`OP_CONSOLIDATE_TO_DELTA`] on
//! the parent [`OperationResult`]. Errors are recorded on it as fatal; a run
//! that ends without an explicit outcome is marked successful when the
//! consolidator is dropped.
use tracing::{debug, debug_span, trace};

use crate::assembler::DeltaAssembler;
use crate::config::ConsolidationConfig;
use crate::decision::{self, DecisionContext};
use crate::delta::ItemDelta;
use crate::equivalence::{EquivalenceNotion, ValueComparator, ValueMatcher};
use crate::error::ConsolidationError;
use crate::metadata::ValueMetadataComputer;
use crate::newtypes::ItemPath;
use crate::operation::{ItemConsolidationTrace, OperationResult, OperationScope};
use crate::partition::{Partition, PartitionInputs, group_first_match};
use crate::triple::{DeltaSetTriple, ValueWithOrigin};
use crate::value::{ItemContainer, ItemValue, OriginType};

/// Name of the child operation record opened per consolidation run.
pub const OP_CONSOLIDATE_TO_DELTA: &str = "valcon.consolidate_to_delta";

// ---------------------------------------------------------------------------
// ConsolidatorBuilder
// ---------------------------------------------------------------------------

/// Collects the inputs of one consolidation run.
pub struct ConsolidatorBuilder<'a> {
    item_path: ItemPath,
    triple: &'a DeltaSetTriple<ValueWithOrigin>,
    existing_item: Option<&'a [ItemValue]>,
    item_container: Option<&'a ItemContainer>,
    apriori_delta: Option<&'a ItemDelta>,
    config: ConsolidationConfig,
    value_matcher: Option<&'a dyn ValueMatcher>,
    comparator: Option<&'a dyn ValueComparator>,
    metadata_computer: Option<&'a dyn ValueMetadataComputer>,
}

impl<'a> ConsolidatorBuilder<'a> {
    pub fn new(item_path: ItemPath, triple: &'a DeltaSetTriple<ValueWithOrigin>) -> Self {
        Self {
            item_path,
            triple,
            existing_item: None,
            item_container: None,
            apriori_delta: None,
            config: ConsolidationConfig::default(),
            value_matcher: None,
            comparator: None,
            metadata_computer: None,
        }
    }

    /// The existing values of the item. Takes precedence over
    /// [`item_container`](Self::item_container).
    #[must_use]
    pub fn existing_item(mut self, values: &'a [ItemValue]) -> Self {
        self.existing_item = Some(values);
        self
    }

    /// A container to look the existing item up in, by path.
    #[must_use]
    pub fn item_container(mut self, container: &'a ItemContainer) -> Self {
        self.item_container = Some(container);
        self
    }

    #[must_use]
    pub fn apriori_delta(mut self, delta: Option<&'a ItemDelta>) -> Self {
        self.apriori_delta = delta;
        self
    }

    #[must_use]
    pub fn config(mut self, config: ConsolidationConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn value_matcher(mut self, matcher: &'a dyn ValueMatcher) -> Self {
        self.value_matcher = Some(matcher);
        self
    }

    #[must_use]
    pub fn comparator(mut self, comparator: &'a dyn ValueComparator) -> Self {
        self.comparator = Some(comparator);
        self
    }

    #[must_use]
    pub fn metadata_computer(mut self, computer: &'a dyn ValueMetadataComputer) -> Self {
        self.metadata_computer = Some(computer);
        self
    }

    /// Builds the consolidator and opens its record under `parent`.
    pub fn build(self, parent: &'a mut OperationResult) -> Consolidator<'a> {
        let existing_item = match (self.existing_item, self.item_container) {
            (Some(values), _) => Some(values),
            (None, Some(container)) => container.find_item(&self.item_path),
            (None, None) => None,
        };
        let item_delta_exists = self
            .config
            .item_delta_exists
            .unwrap_or_else(|| self.apriori_delta.is_some_and(|d| !d.is_empty()));
        let ignore_normal_mappings = compute_ignore_normal_mappings(&self.config, self.triple);

        let mut scope = OperationScope::open(parent, OP_CONSOLIDATE_TO_DELTA);
        scope.add_param("item_path", &self.item_path);

        Consolidator {
            item_path: self.item_path,
            triple: self.triple,
            existing_item,
            apriori_delta: self.apriori_delta,
            config: self.config,
            notion: EquivalenceNotion::new(self.value_matcher, self.comparator),
            metadata_computer: self.metadata_computer,
            item_delta_exists,
            ignore_normal_mappings,
            scope,
        }
    }
}

fn compute_ignore_normal_mappings(
    config: &ConsolidationConfig,
    triple: &DeltaSetTriple<ValueWithOrigin>,
) -> bool {
    if !config.is_exclusive_strong {
        false
    } else if config.strength_selector.is_none() {
        true
    } else {
        triple.all_values().any(|o| o.mapping.is_strong())
    }
}

// ---------------------------------------------------------------------------
// Consolidator
// ---------------------------------------------------------------------------

/// Consolidates one item. Single use.
pub struct Consolidator<'a> {
    item_path: ItemPath,
    triple: &'a DeltaSetTriple<ValueWithOrigin>,
    existing_item: Option<&'a [ItemValue]>,
    apriori_delta: Option<&'a ItemDelta>,
    config: ConsolidationConfig,
    notion: EquivalenceNotion<'a>,
    metadata_computer: Option<&'a dyn ValueMetadataComputer>,
    item_delta_exists: bool,
    ignore_normal_mappings: bool,
    scope: OperationScope<'a>,
}

impl<'a> Consolidator<'a> {
    /// Standard consolidation without metadata computation. A configured
    /// metadata computer is ignored.
    ///
    /// # Errors
    ///
    /// As [`consolidate_triples`](Self::consolidate_triples).
    pub fn consolidate_to_delta_no_metadata(mut self) -> Result<ItemDelta, ConsolidationError> {
        self.metadata_computer = None;
        self.consolidate_triples()
    }

    /// Standard consolidation of the candidate triple.
    ///
    /// # Errors
    ///
    /// - [`ConsolidationError::Conflict`] on an exclusion conflict.
    /// - [`ConsolidationError::Schema`] when values cannot be compared.
    /// - [`ConsolidationError::Delegated`] when metadata computation fails.
    pub fn consolidate_triples(mut self) -> Result<ItemDelta, ConsolidationError> {
        let span = debug_span!("consolidate", item_path = %self.item_path, mode = "triples");
        let _guard = span.enter();
        let outcome = self.run_triples();
        self.finish(outcome)
    }

    /// Consolidates against the a-priori delta: values it adds, replaces or
    /// deletes are carried into the output with freshly computed metadata.
    ///
    /// # Errors
    ///
    /// - [`ConsolidationError::Schema`] when there is no a-priori delta or
    ///   values cannot be compared.
    /// - [`ConsolidationError::Delegated`] when metadata computation fails.
    pub fn consolidate_apriori_delta(mut self) -> Result<ItemDelta, ConsolidationError> {
        let span = debug_span!("consolidate", item_path = %self.item_path, mode = "apriori");
        let _guard = span.enter();
        let outcome = self.run_apriori();
        self.finish(outcome)
    }

    fn finish(
        &mut self,
        outcome: Result<ItemDelta, ConsolidationError>,
    ) -> Result<ItemDelta, ConsolidationError> {
        if let Err(e) = &outcome {
            debug!(error = %e, "consolidation failed");
            self.scope.record_fatal_error(e);
        }
        outcome
    }

    fn run_triples(&mut self) -> Result<ItemDelta, ConsolidationError> {
        self.log_start();
        let mut assembler = DeltaAssembler::new(self.item_path.clone(), self.metadata_computer);
        let mut class_count = 0;

        if self.config.strength_selector.is_none() {
            trace!("consolidation skipped, strength selector is 'none'");
        } else {
            let partition = Partition::build(self.partition_inputs(), &self.notion)?;
            class_count = partition.len();
            let ctx = self.decision_context();
            for class in partition.iter() {
                trace!(%class, of = class_count, "consolidating equivalence class");
                decision::consolidate(class, &ctx, &mut assembler)?;
            }

            if self.config.delete_existing_values && self.existing_item.is_some() {
                for class in partition.iter() {
                    decision::consolidate_existing_value(class, &mut assembler)?;
                }
            }

            if assembler.will_have_any_value(self.existing_item) {
                trace!("item will have some values, weak mapping processing skipped");
            } else {
                self.apply_weak_mappings(&mut assembler)?;
            }
        }

        assembler.stamp_estimated_old_values(self.existing_item);
        let delta = assembler.finish();
        self.log_end(&delta, class_count);
        Ok(delta)
    }

    fn run_apriori(&mut self) -> Result<ItemDelta, ConsolidationError> {
        self.log_start();
        let Some(apriori) = self.apriori_delta else {
            return Err(ConsolidationError::schema(format!(
                "a-priori consolidation of {} requires an a-priori delta",
                self.item_path
            )));
        };
        let mut assembler = DeltaAssembler::new(self.item_path.clone(), self.metadata_computer);
        if apriori.is_replace() {
            assembler.init_replace();
        }

        let partition = Partition::build(self.partition_inputs(), &self.notion)?;
        let ctx = self.decision_context();
        for class in partition.iter() {
            decision::consolidate_apriori(class, apriori, &ctx, &mut assembler)?;
        }
        let class_count = partition.len();

        assembler.stamp_estimated_old_values(self.existing_item);
        let delta = assembler.finish();
        self.log_end(&delta, class_count);
        Ok(delta)
    }

    /// Adds weak values when the item would otherwise end up empty.
    fn apply_weak_mappings(
        &self,
        assembler: &mut DeltaAssembler<'_>,
    ) -> Result<(), ConsolidationError> {
        let candidates = self.select_weak_non_negative_values();
        trace!(
            candidates = candidates.len(),
            "item would have no value, applying weak mappings"
        );
        for group in group_first_match(candidates, &self.notion)? {
            let Some(head) = group.first() else {
                continue;
            };
            let members: Vec<&ItemValue> = group.iter().map(|o| &o.value).collect();
            let metadata = assembler.compute_metadata(&members)?;
            assembler.add_value(&head.value, metadata, &group)?;
        }
        Ok(())
    }

    /// Weak plus and zero candidates, preferring assignment origins, then
    /// outbound origins, then any.
    fn select_weak_non_negative_values(&self) -> Vec<&ValueWithOrigin> {
        if !self.config.strength_selector.weak {
            return Vec::new();
        }
        let weak: Vec<&ValueWithOrigin> = self
            .triple
            .non_negative_values()
            .filter(|o| o.is_weak())
            .collect();
        for origin_type in [OriginType::Assignments, OriginType::Outbound] {
            let preferred: Vec<&ValueWithOrigin> = weak
                .iter()
                .copied()
                .filter(|o| o.value.origin_type == Some(origin_type))
                .collect();
            if !preferred.is_empty() {
                return preferred;
            }
        }
        weak
    }

    fn partition_inputs(&self) -> PartitionInputs<'a> {
        PartitionInputs {
            triple: self.triple,
            existing: self.existing_item,
            apriori: self.apriori_delta,
            selector: self.config.strength_selector,
        }
    }

    fn decision_context(&self) -> DecisionContext<'_> {
        DecisionContext {
            item_path: &self.item_path,
            config: &self.config,
            existing_item_is_empty: self.existing_item.is_none_or(<[ItemValue]>::is_empty),
            item_delta_exists: self.item_delta_exists,
            ignore_normal_mappings: self.ignore_normal_mappings,
        }
    }

    fn log_start(&self) {
        trace!(
            candidates = self.triple.len(),
            existing = ?self.existing_item.map(<[ItemValue]>::len),
            apriori = self.apriori_delta.is_some(),
            add_unchanged_values = self.config.add_unchanged_values,
            existing_item_known = self.config.existing_item_known,
            is_exclusive_strong = self.config.is_exclusive_strong,
            strength_selector = %self.config.strength_selector,
            matcher = self.notion.matcher_name(),
            comparator = self.notion.has_comparator(),
            delete_existing_values = self.config.delete_existing_values,
            skip_normal_mapping_apriori_delta_check =
                self.config.skip_normal_mapping_apriori_delta_check,
            metadata_computer = self.metadata_computer.is_some(),
            context = %self.config.context_description,
            "consolidating item"
        );
    }

    fn log_end(&mut self, delta: &ItemDelta, equivalence_class_count: usize) {
        debug!(
            classes = equivalence_class_count,
            add = delta.values_to_add.len(),
            delete = delta.values_to_delete.len(),
            replace = ?delta.values_to_replace.as_ref().map(Vec::len),
            "consolidated item"
        );
        if self.scope.is_traced() {
            let trace = ItemConsolidationTrace {
                item_path: self.item_path.clone(),
                delta_set_triple: Some(self.triple.map(|o| o.value.clone())),
                existing_item: self.existing_item.map(<[ItemValue]>::to_vec),
                apriori_delta: self.apriori_delta.cloned(),
                equivalence_class_count,
                resulting_delta: delta.clone(),
            };
            self.scope.add_trace(trace);
        }
    }
}
