mod args;
mod printer;

use anyhow::{Context, Result};
use args::{split_unrecognized, wants_usage, Cli};
use clap::{CommandFactory, Parser};
use colored::Colorize;
use grip::{search, SearchConfig};
use printer::Printer;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit code for a malformed invocation
const USAGE_EXIT: u8 = 2;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let raw_args: Vec<String> = std::env::args().collect();
    if wants_usage(&raw_args) {
        print_usage()?;
        return Ok(ExitCode::SUCCESS);
    }

    let (args, unrecognized) = split_unrecognized(raw_args);
    let cli = Cli::parse_from(args);
    cli.color.apply();

    for arg in &unrecognized {
        eprintln!("{}", format!("Unrecognized argument {}", arg).red());
    }

    if !cli.has_request() {
        print_usage()?;
        return Ok(ExitCode::from(USAGE_EXIT));
    }

    let config = SearchConfig::load_from(cli.config.as_deref())
        .context("failed to load configuration")?
        .merge_with_cli(cli.overrides());
    init_tracing(&config);

    let printer = Printer::stdout();
    let stats = search(&config, &printer)?;
    if config.verbose {
        printer.print_summary(&stats)?;
    }

    Ok(ExitCode::SUCCESS)
}

fn print_usage() -> Result<()> {
    Cli::command()
        .print_help()
        .context("failed to print usage")?;
    println!();
    Ok(())
}

/// Logs go to stderr. `RUST_LOG` wins over the configured level; verbose mode raises
/// the default `warn` to `info`.
fn init_tracing(config: &SearchConfig) {
    let level = if config.verbose && config.log_level == "warn" {
        "info"
    } else {
        config.log_level.as_str()
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("grip={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
