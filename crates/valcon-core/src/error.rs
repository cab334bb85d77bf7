/// Error taxonomy for item-value consolidation.
///
/// Only two situations are exceptional during consolidation: an exclusion
/// conflict between mappings, and a failure of a collaborator (the value
/// matcher or the metadata computer). Every "do not add" or "do not delete"
/// outcome is a decision and never surfaces here.
use std::fmt;

// ---------------------------------------------------------------------------
// DelegatedError
// ---------------------------------------------------------------------------

/// The kind of failure reported by an injected collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DelegatedErrorKind {
    /// The collaborator could not reach a remote system.
    Communication,
    /// An object the collaborator needed does not exist.
    ObjectNotFound,
    /// The collaborator was not authorised to perform its work.
    SecurityViolation,
    /// The collaborator is misconfigured.
    Configuration,
    /// An expression evaluated by the collaborator failed.
    ExpressionEvaluation,
}

impl fmt::Display for DelegatedErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Communication => "communication error",
            Self::ObjectNotFound => "object not found",
            Self::SecurityViolation => "security violation",
            Self::Configuration => "configuration error",
            Self::ExpressionEvaluation => "expression evaluation error",
        };
        f.write_str(s)
    }
}

/// A failure raised by a collaborator such as a
/// [`ValueMetadataComputer`](crate::metadata::ValueMetadataComputer).
///
/// Consolidation passes these through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct DelegatedError {
    /// What went wrong, in coarse terms.
    pub kind: DelegatedErrorKind,
    /// Collaborator-supplied description.
    pub message: String,
}

impl DelegatedError {
    /// Creates a delegated error of the given kind.
    pub fn new(kind: DelegatedErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// ConsolidationError
// ---------------------------------------------------------------------------

/// Errors that abort the consolidation of one item.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsolidationError {
    /// Two distinct exclusive mappings both produced a value that ends up in
    /// the same equivalence class on the add path.
    #[error(
        "exclusion conflict in {context}, item {item_path}, conflicting mappings: {first} and {second}"
    )]
    Conflict {
        /// Description of the consolidation context.
        context: String,
        /// Path of the item being consolidated.
        item_path: String,
        /// The exclusive mapping seen first.
        first: String,
        /// The exclusive mapping that collided with it.
        second: String,
    },

    /// Values could not be compared, or the delta was structurally misused.
    #[error("schema error: {0}")]
    Schema(String),

    /// A collaborator failed; the inner error is passed through verbatim.
    #[error(transparent)]
    Delegated(#[from] DelegatedError),
}

/// Coarse classification of a [`ConsolidationError`].
///
/// Exclusion conflicts are reported as expression-evaluation failures, the
/// same kind a caller gets from a failing mapping expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Exclusion conflict or a collaborator's expression failure.
    ExpressionEvaluation,
    /// Incomparable or malformed values.
    Schema,
    /// Collaborator could not reach a remote system.
    Communication,
    /// Collaborator could not find an object.
    ObjectNotFound,
    /// Collaborator was not authorised.
    SecurityViolation,
    /// Collaborator is misconfigured.
    Configuration,
}

impl ConsolidationError {
    /// Returns the coarse kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Conflict { .. } => ErrorKind::ExpressionEvaluation,
            Self::Schema(_) => ErrorKind::Schema,
            Self::Delegated(e) => match e.kind {
                DelegatedErrorKind::Communication => ErrorKind::Communication,
                DelegatedErrorKind::ObjectNotFound => ErrorKind::ObjectNotFound,
                DelegatedErrorKind::SecurityViolation => ErrorKind::SecurityViolation,
                DelegatedErrorKind::Configuration => ErrorKind::Configuration,
                DelegatedErrorKind::ExpressionEvaluation => ErrorKind::ExpressionEvaluation,
            },
        }
    }

    pub(crate) fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }
}
