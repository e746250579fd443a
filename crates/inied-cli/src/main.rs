//! inied CLI - Edit INI files from the command line
//!
//! Provides `inied get`, `inied set`, `inied remove`, and `inied recover`.
//! The exit status is a bitmask; see `inied_core::ExitStatus`.

mod commands;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use inied_core::{EditError, ExitStatus};

use commands::get::GetArgs;
use commands::recover::RecoverArgs;
use commands::remove::RemoveArgs;
use commands::set::SetArgs;

#[derive(Parser)]
#[command(name = "inied")]
#[command(about = "inied - read, set, and remove entries in INI files")]
#[command(after_help = EXAMPLES)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

const EXAMPLES: &str = "\
Examples:
  inied get --file trac.ini
  inied get --file trac.ini --get-sections
  inied get --file trac.ini --section trac --item database
  inied get --file trac.ini --separator ' >> '
  inied set --file trac.ini --section trac --item database --value sqlite:db/trac.db
  inied remove --file trac.ini --section logging

Exit status bits:
  0x01 item not found, 0x02 section not found, 0x04 file not found,
  0x08 invalid parameters, 0x10 I/O failure, 0x20 unexpected failure";

#[derive(Subcommand)]
enum Commands {
    /// Get INI options from file
    Get(GetArgs),
    /// Set INI options to file
    Set(SetArgs),
    /// Remove INI section or item from file
    Remove(RemoveArgs),
    /// Restore the backup left by an interrupted commit
    Recover(RecoverArgs),
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Self::Get(args) => args.common.verbose,
            Self::Set(args) => args.common.verbose,
            Self::Remove(args) => args.common.verbose,
            Self::Recover(args) => args.verbose,
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let status = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitStatus::SUCCESS,
                _ => ExitStatus::INVALID_PARAMS,
            };
            let _ = err.print();
            return exit_code(status);
        }
    };

    let Some(command) = cli.command else {
        let _ = Cli::command().print_help();
        println!();
        return exit_code(ExitStatus::INVALID_PARAMS);
    };

    init_logging(command.verbose());
    debug!(version = env!("CARGO_PKG_VERSION"), "inied starting");

    let result = match &command {
        Commands::Get(args) => commands::get::execute(args),
        Commands::Set(args) => commands::set::execute(args),
        Commands::Remove(args) => commands::remove::execute(args),
        Commands::Recover(args) => commands::recover::execute(args),
    };

    match result {
        Ok(()) => exit_code(ExitStatus::SUCCESS),
        Err(e) => {
            eprintln!("Error: {e}");
            if let EditError::RecoveryNeeded { path, .. } = &e {
                eprintln!("Run 'inied recover --file {}' to restore it.", path.display());
            }
            exit_code(ExitStatus::from(&e))
        }
    }
}

/// Log to stderr; `RUST_LOG` overrides the level picked by `--verbose`
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn exit_code(status: ExitStatus) -> ExitCode {
    ExitCode::from(status.code())
}
