//! Clap CLI definition: root struct, subcommands, and shared argument types.
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// A CLI argument that is either a filesystem path or the stdin sentinel `"-"`.
#[derive(Clone, Debug)]
pub enum PathOrStdin {
    /// Read from standard input.
    Stdin,
    /// Read from the given filesystem path.
    Path(PathBuf),
}

impl std::str::FromStr for PathOrStdin {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            Ok(PathOrStdin::Stdin)
        } else {
            Ok(PathOrStdin::Path(PathBuf::from(s)))
        }
    }
}

impl std::fmt::Display for PathOrStdin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdin => f.write_str("-"),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Output format for CLI commands.
#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    /// One line per delta entry (default).
    Human,
    /// A single JSON object on stdout.
    Json,
}

/// All top-level subcommands exposed by the `valcon` binary.
#[derive(Subcommand)]
pub enum Command {
    /// Consolidate one item from a JSON consolidation request.
    Consolidate {
        /// Path to a request file, or `-` for stdin.
        #[arg(value_name = "FILE")]
        file: PathOrStdin,
        /// Record and print the consolidation trace.
        #[arg(long)]
        trace: bool,
    },

    /// Print the valcon-core library version.
    Version,
}

#[derive(Parser)]
#[command(
    name = "valcon",
    version,
    about = "Item-value consolidation CLI",
    long_about = "Computes the minimal item delta that brings an existing item in line\n\
                  with the values produced by its mappings."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long, short = 'f', default_value = "human", global = true)]
    pub format: OutputFormat,

    /// Log consolidation decisions to stderr (overridden by `RUST_LOG`).
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[arg(
        long,
        global = true,
        env = "VALCON_MAX_FILE_SIZE",
        default_value = "16777216"
    )]
    pub max_file_size: u64,
}

#[cfg(test)]
mod tests;
