//! Self-contained, serialisable consolidation requests.
//!
//! A [`ConsolidationRequest`] bundles every input of one consolidation run
//! in plain data, so runs can be stored, replayed, or fed to the `valcon`
//! binary as JSON.
use serde::{Deserialize, Serialize};

use crate::config::ConsolidationConfig;
use crate::consolidator::ConsolidatorBuilder;
use crate::delta::ItemDelta;
use crate::equivalence::{CaseIgnoreMatcher, ExactMatcher, ValueMatcher};
use crate::error::ConsolidationError;
use crate::metadata::{ProvenanceUnion, ValueMetadataComputer};
use crate::newtypes::ItemPath;
use crate::operation::OperationResult;
use crate::triple::{DeltaSetTriple, ValueWithOrigin};
use crate::value::{ItemContainer, ItemValue};

/// Built-in scalar matching rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatcherName {
    /// Structural equality only.
    #[default]
    None,
    Exact,
    CaseIgnore,
}

impl MatcherName {
    fn matcher(self) -> Option<&'static dyn ValueMatcher> {
        match self {
            Self::None => None,
            Self::Exact => Some(&ExactMatcher),
            Self::CaseIgnore => Some(&CaseIgnoreMatcher),
        }
    }
}

/// Built-in metadata computers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataMode {
    /// No metadata computation.
    #[default]
    None,
    /// [`ProvenanceUnion`].
    Provenance,
}

impl MetadataMode {
    fn computer(self) -> Option<&'static dyn ValueMetadataComputer> {
        match self {
            Self::None => None,
            Self::Provenance => Some(&ProvenanceUnion),
        }
    }
}

/// Which consolidation entry point to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Standard consolidation of the candidate triple.
    #[default]
    Triples,
    /// Consolidation against the a-priori delta.
    Apriori,
}

/// All inputs of one consolidation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidationRequest {
    pub item_path: ItemPath,
    #[serde(default)]
    pub triple: DeltaSetTriple<ValueWithOrigin>,
    /// Existing values. Takes precedence over `container`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing: Option<Vec<ItemValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<ItemContainer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apriori_delta: Option<ItemDelta>,
    #[serde(default)]
    pub config: ConsolidationConfig,
    #[serde(default)]
    pub matcher: MatcherName,
    #[serde(default)]
    pub metadata: MetadataMode,
    #[serde(default)]
    pub mode: Mode,
}

impl ConsolidationRequest {
    /// A standard-mode request with default configuration.
    pub fn new(item_path: ItemPath, triple: DeltaSetTriple<ValueWithOrigin>) -> Self {
        Self {
            item_path,
            triple,
            existing: None,
            container: None,
            apriori_delta: None,
            config: ConsolidationConfig::default(),
            matcher: MatcherName::None,
            metadata: MetadataMode::None,
            mode: Mode::Triples,
        }
    }

    /// Runs the request, recording under `parent`.
    ///
    /// # Errors
    ///
    /// Whatever the selected consolidation entry point returns.
    pub fn execute(&self, parent: &mut OperationResult) -> Result<ItemDelta, ConsolidationError> {
        let mut builder = ConsolidatorBuilder::new(self.item_path.clone(), &self.triple)
            .apriori_delta(self.apriori_delta.as_ref())
            .config(self.config.clone());
        if let Some(existing) = &self.existing {
            builder = builder.existing_item(existing);
        }
        if let Some(container) = &self.container {
            builder = builder.item_container(container);
        }
        if let Some(matcher) = self.matcher.matcher() {
            builder = builder.value_matcher(matcher);
        }
        if let Some(computer) = self.metadata.computer() {
            builder = builder.metadata_computer(computer);
        }
        let consolidator = builder.build(parent);
        match self.mode {
            Mode::Triples => consolidator.consolidate_triples(),
            Mode::Apriori => consolidator.consolidate_apriori_delta(),
        }
    }
}
