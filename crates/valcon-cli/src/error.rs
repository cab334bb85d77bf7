/// CLI error types with associated exit codes.
///
/// [`CliError`] is the top-level error type for the `valcon` binary:
///
/// - Exit code **2**: input failure. The request could not be read or
///   parsed, so no consolidation ran.
/// - Exit code **1**: the consolidation itself failed (exclusion conflict,
///   incomparable values, metadata computer failure).
use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// CliError
// ---------------------------------------------------------------------------

/// All error conditions that the `valcon` CLI can produce.
#[derive(Debug)]
pub enum CliError {
    // --- Exit code 2: input failures ---
    /// A file argument could not be found on the filesystem.
    FileNotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// The process lacks permission to read a file.
    PermissionDenied {
        /// The path that could not be read.
        path: PathBuf,
    },

    /// The input exceeds the configured `--max-file-size` limit.
    FileTooLarge {
        /// `"-"` for stdin, or the filesystem path.
        source: String,
        /// The configured size limit in bytes.
        limit: u64,
        /// The actual size in bytes; `None` for stdin.
        actual: Option<u64>,
    },

    /// The input bytes are not valid UTF-8.
    InvalidUtf8 {
        source: String,
        /// The byte offset of the first invalid byte sequence.
        byte_offset: usize,
    },

    /// An I/O error occurred while reading from stdin.
    StdinReadError { detail: String },

    /// A generic I/O error not covered by the more specific variants above.
    IoError { source: String, detail: String },

    /// The input is not a well-formed consolidation request.
    InvalidRequest {
        source: String,
        /// The deserialisation error, including line and column.
        detail: String,
    },

    // --- Exit code 1: consolidation failures ---
    /// The consolidation of the item failed.
    ConsolidationFailed {
        /// Coarse error kind, e.g. `ExpressionEvaluation`.
        kind: String,
        detail: String,
    },
}

impl CliError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::FileTooLarge { .. }
            | Self::InvalidUtf8 { .. }
            | Self::StdinReadError { .. }
            | Self::IoError { .. }
            | Self::InvalidRequest { .. } => 2,

            Self::ConsolidationFailed { .. } => 1,
        }
    }

    /// Returns a human-readable error message suitable for printing to stderr.
    pub fn message(&self) -> String {
        match self {
            Self::FileNotFound { path } => {
                format!("error: file not found: {}", path.display())
            }
            Self::PermissionDenied { path } => {
                format!("error: permission denied: {}", path.display())
            }
            Self::FileTooLarge {
                source,
                limit,
                actual: Some(actual),
            } => {
                format!("error: file too large: {source} is {actual} bytes, limit is {limit} bytes")
            }
            Self::FileTooLarge {
                source,
                limit,
                actual: None,
            } => {
                format!("error: file too large: {source} exceeded limit of {limit} bytes")
            }
            Self::InvalidUtf8 {
                source,
                byte_offset,
            } => {
                format!(
                    "error: invalid UTF-8 in {source}: first invalid byte at offset {byte_offset}"
                )
            }
            Self::StdinReadError { detail } => {
                format!("error: failed to read stdin: {detail}")
            }
            Self::IoError { source, detail } => {
                format!("error: I/O error on {source}: {detail}")
            }
            Self::InvalidRequest { source, detail } => {
                format!("error: invalid consolidation request in {source}: {detail}")
            }
            Self::ConsolidationFailed { kind, detail } => {
                format!("error: consolidation failed ({kind}): {detail}")
            }
        }
    }
}

impl From<valcon_core::ConsolidationError> for CliError {
    fn from(e: valcon_core::ConsolidationError) -> Self {
        Self::ConsolidationFailed {
            kind: format!("{:?}", e.kind()),
            detail: e.to_string(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for CliError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
