/// Command module for the `valcon` CLI.
///
/// Each submodule implements one subcommand and returns `Ok(())` on success
/// or a [`crate::error::CliError`] on failure.
pub mod consolidate;
pub mod version;

use std::io::Write;

use crate::error::CliError;

/// Writes `text` to `out`, mapping failures to [`CliError::IoError`].
pub(crate) fn write_to(out: &mut impl Write, label: &str, text: &str) -> Result<(), CliError> {
    out.write_all(text.as_bytes())
        .map_err(|e| CliError::IoError {
            source: label.to_owned(),
            detail: e.to_string(),
        })
}
