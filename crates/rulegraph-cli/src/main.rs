//! # rulegraph CLI entry point
//!
//! Parses command-line arguments, installs logging, and dispatches to the
//! subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rulegraph_cli::describe::{run_describe, DescribeArgs};
use rulegraph_cli::validate::{run_validate, ValidateArgs};

/// rulegraph: validate documents against descriptor catalogs.
///
/// Catalogs are JSON or YAML documents of type descriptors, layered over the
/// built-in types and validators.
#[derive(Parser, Debug)]
#[command(name = "rulegraph", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    /// `RUST_LOG` takes precedence when set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate JSON/YAML documents against a catalog type.
    Validate(ValidateArgs),

    /// Print the HTML input type and validation rules of a property.
    Describe(DescribeArgs),
}

fn init_tracing(verbose: u8, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.with_target(false).init();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    tracing::debug!("rulegraph CLI starting");

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args),
        Commands::Describe(args) => run_describe(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
