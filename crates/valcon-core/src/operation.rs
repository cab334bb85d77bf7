/// Hierarchical operation records and consolidation traces.
///
/// An [`OperationResult`] is a lightweight diagnostic record: a name, a few
/// parameters, a status, optional trace payloads, and child records. The
/// consolidator opens one minor child per run and closes it when dropped.
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::delta::ItemDelta;
use crate::newtypes::ItemPath;
use crate::triple::DeltaSetTriple;
use crate::value::ItemValue;

// ---------------------------------------------------------------------------
// OperationStatus
// ---------------------------------------------------------------------------

/// Outcome of a recorded operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    /// Still running, or closed without an explicit outcome.
    #[default]
    Unknown,
    Success,
    FatalError,
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unknown => "unknown",
            Self::Success => "success",
            Self::FatalError => "fatal_error",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// ItemConsolidationTrace
// ---------------------------------------------------------------------------

/// Snapshot of one consolidation run, recorded when the parent is traced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemConsolidationTrace {
    pub item_path: ItemPath,
    /// Candidate values of the triple, without origins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_set_triple: Option<DeltaSetTriple<ItemValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_item: Option<Vec<ItemValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apriori_delta: Option<ItemDelta>,
    pub equivalence_class_count: usize,
    pub resulting_delta: ItemDelta,
}

// ---------------------------------------------------------------------------
// OperationResult
// ---------------------------------------------------------------------------

/// A diagnostic record of one operation and its children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    pub operation: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
    #[serde(default)]
    pub status: OperationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Minor records are housekeeping children, not user-facing steps.
    #[serde(default)]
    pub minor: bool,
    #[serde(default)]
    pub traced: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub traces: Vec<ItemConsolidationTrace>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subresults: Vec<OperationResult>,
}

impl OperationResult {
    /// A new, untraced root record.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            params: BTreeMap::new(),
            status: OperationStatus::Unknown,
            message: None,
            minor: false,
            traced: false,
            traces: Vec::new(),
            subresults: Vec::new(),
        }
    }

    /// Enables tracing on this record; children inherit it.
    #[must_use]
    pub fn traced(mut self) -> Self {
        self.traced = true;
        self
    }

    pub fn is_traced(&self) -> bool {
        self.traced
    }

    /// Appends a minor child record and returns it.
    pub fn create_minor_subresult(&mut self, operation: impl Into<String>) -> &mut OperationResult {
        let mut child = OperationResult::new(operation);
        child.minor = true;
        child.traced = self.traced;
        let idx = self.subresults.len();
        self.subresults.push(child);
        &mut self.subresults[idx]
    }

    /// Records a parameter.
    pub fn add_param(&mut self, name: impl Into<String>, value: impl fmt::Display) -> &mut Self {
        self.params.insert(name.into(), value.to_string());
        self
    }

    /// Marks the operation as failed with `error`'s message.
    pub fn record_fatal_error(&mut self, error: &dyn std::error::Error) {
        self.status = OperationStatus::FatalError;
        self.message = Some(error.to_string());
    }

    /// Sets the status from the children if it is still unknown.
    ///
    /// A fatal child makes the parent fatal; otherwise the parent succeeds.
    pub fn compute_status_if_unknown(&mut self) {
        if self.status != OperationStatus::Unknown {
            return;
        }
        self.status = if self
            .subresults
            .iter()
            .any(|r| r.status == OperationStatus::FatalError)
        {
            OperationStatus::FatalError
        } else {
            OperationStatus::Success
        };
    }

    pub fn add_trace(&mut self, trace: ItemConsolidationTrace) {
        self.traces.push(trace);
    }

    pub fn last_subresult(&self) -> Option<&OperationResult> {
        self.subresults.last()
    }

    /// Depth-first search for the first record named `operation`.
    pub fn find_subresult(&self, operation: &str) -> Option<&OperationResult> {
        self.subresults.iter().find_map(|r| {
            if r.operation == operation {
                Some(r)
            } else {
                r.find_subresult(operation)
            }
        })
    }
}

// ---------------------------------------------------------------------------
// OperationScope
// ---------------------------------------------------------------------------

/// A child record whose status is computed when dropped.
pub(crate) struct OperationScope<'a> {
    record: &'a mut OperationResult,
}

impl<'a> OperationScope<'a> {
    /// Opens a minor child of `parent`.
    pub(crate) fn open(parent: &'a mut OperationResult, operation: &str) -> Self {
        Self {
            record: parent.create_minor_subresult(operation),
        }
    }
}

impl Deref for OperationScope<'_> {
    type Target = OperationResult;

    fn deref(&self) -> &OperationResult {
        self.record
    }
}

impl DerefMut for OperationScope<'_> {
    fn deref_mut(&mut self) -> &mut OperationResult {
        self.record
    }
}

impl Drop for OperationScope<'_> {
    fn drop(&mut self) {
        self.record.compute_status_if_unknown();
    }
}
