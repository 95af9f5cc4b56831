// SPDX-License-Identifier: MPL-2.0

//! Command line front end: compute the closure of a few packages
//! over a RON snapshot of a package database.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, CommandFactory, Parser};
use thiserror::Error;

use apt_closure::error::ClosureError;
use apt_closure::metadata::OfflineMetadataProvider;
use apt_closure::report::{DefaultStringReporter, Reporter};
use apt_closure::solver::{resolve, Request};
use apt_closure::version::SemanticVersion;

type Database = OfflineMetadataProvider<String, SemanticVersion>;

/// Compute the set of packages needed to install the given ones.
#[derive(Parser, Debug)]
#[command(name = "apt-closure", version, about, long_about = None)]
struct Cli {
    /// Package database, a RON snapshot.
    #[arg(long, value_name = "FILE")]
    index: PathBuf,

    /// Packages to install.
    #[arg(short, long, value_name = "PKG", num_args = 1.., action = ArgAction::Append)]
    input: Vec<String>,

    /// Never choose these names as an alternative of a dependency.
    #[arg(short, long, value_name = "PKG", num_args = 1.., action = ArgAction::Append)]
    banned: Vec<String>,

    /// Add bootstrap packages to the output list.
    #[arg(short = 'd', long)]
    add_bootstrap: bool,

    /// Compute the closure of the bootstrap packages, ignoring -d and inputs.
    #[arg(short = 'c', long)]
    compute_bootstrap: bool,

    /// Dump the provide index.
    #[arg(short = 'p', long)]
    dump_provides: bool,

    /// Write the package list to a file instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Exit with an error when some names could not be resolved.
    #[arg(long)]
    strict: bool,

    /// Log every decision.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Error, Debug)]
enum CliError {
    #[error("cannot read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid package database: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("resolution failed: {0}")]
    Closure(#[from] ClosureError<String, SemanticVersion>),
}

fn main() -> ExitCode {
    if std::env::args_os().len() <= 1 {
        return match Cli::command().print_help() {
            Ok(()) => ExitCode::SUCCESS,
            Err(_) => ExitCode::FAILURE,
        };
    }

    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            log::error!("{}", err);
            ExitCode::from(2)
        }
    }
}

/// Returns whether the run is acceptable for the requested strictness.
fn run(cli: &Cli) -> Result<bool, CliError> {
    let text = fs::read_to_string(&cli.index).map_err(|source| CliError::Read {
        path: cli.index.clone(),
        source,
    })?;
    let db: Database = ron::de::from_str(&text)?;
    log::info!("Loaded {} package names", db.len());

    let request = Request::new(cli.input.iter().cloned())
        .ban(cli.banned.iter().cloned())
        .include_baseline(cli.add_bootstrap)
        .compute_baseline(cli.compute_bootstrap);
    let closure = resolve(&db, &request)?;

    eprintln!("{}", DefaultStringReporter::report(&closure));
    if cli.dump_provides && !closure.provides().is_empty() {
        eprintln!("{}", DefaultStringReporter::report_provides(&closure));
    }

    let line = closure
        .names()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");
    match &cli.output {
        Some(path) => fs::write(path, format!("{}\n", line))?,
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", line)?;
        }
    }

    Ok(!cli.strict || closure.is_complete())
}
