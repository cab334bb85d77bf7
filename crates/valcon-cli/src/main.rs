use clap::Parser;

mod cli;
mod cmd;
mod error;
mod format;
mod io;
mod logging;

pub use cli::{Cli, Command, OutputFormat, PathOrStdin};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match &cli.command {
        Command::Consolidate { file, trace } => {
            cmd::consolidate::run(file, *trace, &cli.format, cli.max_file_size)
        }
        Command::Version => cmd::version::run(),
    };

    if let Err(e) = result {
        eprintln!("{}", e.message());
        std::process::exit(e.exit_code());
    }
}
