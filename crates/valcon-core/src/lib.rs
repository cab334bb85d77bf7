#![deny(clippy::print_stdout, clippy::print_stderr)]

mod assembler;
pub mod config;
pub mod consolidator;
pub mod decision;
pub mod delta;
pub mod equivalence;
pub mod error;
pub mod mapping;
pub mod metadata;
pub mod newtypes;
pub mod operation;
pub mod partition;
pub mod request;
pub mod triple;
pub mod value;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use config::ConsolidationConfig;
pub use consolidator::{Consolidator, ConsolidatorBuilder, OP_CONSOLIDATE_TO_DELTA};
pub use decision::{AddDecision, DecisionContext, DeleteDecision, MappingClassification};
pub use delta::ItemDelta;
pub use equivalence::{
    CaseIgnoreMatcher, EquivalenceNotion, ExactMatcher, ValueComparator, ValueMatcher,
};
pub use error::{ConsolidationError, DelegatedError, DelegatedErrorKind, ErrorKind};
pub use mapping::{Mapping, MappingStrength, StrengthSelector};
pub use metadata::{ProvenanceUnion, ValueMetadataComputer};
pub use newtypes::{ItemPath, NewtypeError};
pub use operation::{ItemConsolidationTrace, OperationResult, OperationStatus};
pub use partition::{
    EquivalenceClass, Partition, PartitionInputs, group_first_match, should_categorize,
    should_skip_mapping,
};
pub use request::{ConsolidationRequest, MatcherName, MetadataMode, Mode};
pub use triple::{DeltaSetTriple, ValueWithOrigin};
pub use value::{ItemContainer, ItemValue, OriginType, ValueContent, ValueMetadata};

/// Returns the version of the valcon-core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
