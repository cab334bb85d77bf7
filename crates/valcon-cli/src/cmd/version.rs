//! Implementation of `valcon version`.
use crate::cmd::write_to;
use crate::error::CliError;

/// Prints the valcon-core library version to stdout.
///
/// # Errors
///
/// [`CliError::IoError`] if stdout cannot be written.
pub fn run() -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_to(&mut out, "stdout", &format!("{}\n", valcon_core::version()))
}
