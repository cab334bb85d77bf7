//! Implementation of `valcon consolidate <file>`.
//!
//! Reads a JSON consolidation request, runs it, and writes the resulting
//! item delta to stdout. With `--trace` the operation record (including the
//! per-item consolidation trace) is emitted as well: alongside the delta in
//! JSON mode, on stderr in human mode.
//!
//! Exit codes:
//! - 0 = success
//! - 1 = consolidation failed (exclusion conflict, incomparable values, ...)
//! - 2 = the request could not be read or parsed
use serde_json::json;
use tracing::info;
use valcon_core::{ItemDelta, OperationResult};

use crate::OutputFormat;
use crate::PathOrStdin;
use crate::cmd::write_to;
use crate::error::CliError;
use crate::format::{render_delta, render_operation};
use crate::io::read_request;

/// Operation name of the root record the CLI opens for each run.
pub const OP_CLI_CONSOLIDATE: &str = "valcon.cli.consolidate";

/// Runs the `consolidate` command.
///
/// # Errors
///
/// - Input failures from [`read_request`] (exit 2).
/// - [`CliError::ConsolidationFailed`] when consolidation fails (exit 1).
///   With `--trace` the operation record is still printed to stderr first.
pub fn run(
    file: &PathOrStdin,
    trace: bool,
    format: &OutputFormat,
    max_file_size: u64,
) -> Result<(), CliError> {
    let request = read_request(file, max_file_size)?;
    info!(item_path = %request.item_path, mode = ?request.mode, "consolidating request from {file}");

    let mut root = OperationResult::new(OP_CLI_CONSOLIDATE);
    if trace {
        root = root.traced();
    }
    root.add_param("source", file);
    let outcome = request.execute(&mut root);
    root.compute_status_if_unknown();

    match outcome {
        Ok(delta) => emit(&delta, trace.then_some(&root), format),
        Err(e) => {
            if trace {
                let stderr = std::io::stderr();
                write_to(&mut stderr.lock(), "stderr", &render_operation(&root))?;
            }
            Err(e.into())
        }
    }
}

fn emit(
    delta: &ItemDelta,
    record: Option<&OperationResult>,
    format: &OutputFormat,
) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Json => {
            let mut body = json!({ "delta": delta });
            if let Some(record) = record {
                body["operation"] = json!(record);
            }
            let text = serde_json::to_string_pretty(&body).map_err(|e| CliError::IoError {
                source: "stdout".to_owned(),
                detail: e.to_string(),
            })?;
            write_to(&mut out, "stdout", &text)?;
            write_to(&mut out, "stdout", "\n")
        }
        OutputFormat::Human => {
            write_to(&mut out, "stdout", &render_delta(delta))?;
            if let Some(record) = record {
                let stderr = std::io::stderr();
                write_to(&mut stderr.lock(), "stderr", &render_operation(record))?;
            }
            Ok(())
        }
    }
}
