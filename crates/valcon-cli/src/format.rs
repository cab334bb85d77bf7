/// Human-readable rendering of item deltas and operation records.
///
/// Deltas render as one header line followed by one line per value:
/// `+` for additions, `-` for deletions, `=` for replacement values. The
/// operation tree renders indented, one record per line, with any recorded
/// consolidation traces beneath their record.
use std::fmt::Write as _;

use valcon_core::{ItemDelta, ItemValue, OperationResult};

const INDENT: &str = "  ";

/// Renders `delta` as human-readable text, terminated by a newline.
pub fn render_delta(delta: &ItemDelta) -> String {
    let mut out = String::new();
    let changes = delta.values_to_add.len()
        + delta.values_to_delete.len()
        + delta.values_to_replace.as_ref().map_or(0, Vec::len);

    if delta.is_empty() {
        writeln!(out, "{}: no changes", delta.path).ok();
        return out;
    }
    if let Some(replace) = &delta.values_to_replace {
        writeln!(out, "{}: replace with {} value(s)", delta.path, replace.len()).ok();
        push_values(&mut out, '=', replace);
    } else {
        writeln!(out, "{}: {changes} change(s)", delta.path).ok();
    }
    push_values(&mut out, '+', &delta.values_to_add);
    push_values(&mut out, '-', &delta.values_to_delete);
    out
}

fn push_values(out: &mut String, marker: char, values: &[ItemValue]) {
    for value in values {
        write!(out, "{INDENT}{marker} {value}").ok();
        if !value.metadata.sources.is_empty() {
            let sources: Vec<&str> = value.metadata.sources.iter().map(String::as_str).collect();
            write!(out, "  (sources: {})", sources.join(", ")).ok();
        }
        out.push('\n');
    }
}

/// Renders the operation tree rooted at `result`.
pub fn render_operation(result: &OperationResult) -> String {
    let mut out = String::new();
    push_operation(&mut out, result, 0);
    out
}

fn push_operation(out: &mut String, result: &OperationResult, depth: usize) {
    let pad = INDENT.repeat(depth);
    write!(out, "{pad}{} [{}]", result.operation, result.status).ok();
    for (name, value) in &result.params {
        write!(out, " {name}={value}").ok();
    }
    out.push('\n');
    if let Some(message) = &result.message {
        writeln!(out, "{pad}{INDENT}message: {message}").ok();
    }
    for trace in &result.traces {
        writeln!(
            out,
            "{pad}{INDENT}trace: {} equivalence class(es), {} value(s) in, resulting delta {}",
            trace.equivalence_class_count,
            trace.delta_set_triple.as_ref().map_or(0, |t| t.len()),
            if trace.resulting_delta.is_empty() {
                "empty"
            } else {
                "non-empty"
            }
        ).ok();
    }
    for child in &result.subresults {
        push_operation(out, child, depth + 1);
    }
}
