#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(clippy::wildcard_enum_match_arm)]

use clap::{CommandFactory, Parser};

use super::*;

#[test]
fn test_root_help_lists_all_subcommands() {
    let mut cmd = Cli::command();
    let help = format!("{}", cmd.render_help());
    for name in ["consolidate", "version"] {
        assert!(
            help.contains(name),
            "root help should mention subcommand '{name}'"
        );
    }
}

#[test]
fn test_root_help_lists_global_flags() {
    let mut cmd = Cli::command();
    let help = format!("{}", cmd.render_help());
    for flag in ["--format", "--verbose", "--max-file-size", "--help", "--version"] {
        assert!(
            help.contains(flag),
            "root help should mention flag '{flag}'"
        );
    }
}

#[test]
fn test_cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn test_consolidate_parses_dash_as_stdin() {
    let cli = Cli::try_parse_from(["valcon", "consolidate", "-"]).expect("parses");
    match cli.command {
        Command::Consolidate { file, trace } => {
            assert!(matches!(file, PathOrStdin::Stdin));
            assert!(!trace);
        }
        other => panic!("expected consolidate, got {}", other_name(&other)),
    }
}

#[test]
fn test_consolidate_accepts_trace_and_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "valcon",
        "consolidate",
        "request.json",
        "--trace",
        "--format",
        "json",
    ])
    .expect("parses");
    assert!(matches!(cli.format, OutputFormat::Json));
    match cli.command {
        Command::Consolidate { file, trace } => {
            assert!(trace);
            assert_eq!(file.to_string(), "request.json");
        }
        other => panic!("expected consolidate, got {}", other_name(&other)),
    }
}

#[test]
fn test_consolidate_requires_file() {
    assert!(Cli::try_parse_from(["valcon", "consolidate"]).is_err());
}

#[test]
fn test_unknown_format_is_rejected() {
    assert!(Cli::try_parse_from(["valcon", "--format", "yaml", "version"]).is_err());
}

fn other_name(cmd: &Command) -> &'static str {
    match cmd {
        Command::Consolidate { .. } => "consolidate",
        Command::Version => "version",
    }
}
