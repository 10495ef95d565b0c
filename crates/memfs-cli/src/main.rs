#![deny(unsafe_code)]

mod commands;
mod output;
mod script;
mod session;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use memfs_mount::{ConfigError, MountConfig};

use crate::commands::{info, run, shell};

/// Exit codes reported by the binary.
mod exit_code {
    pub const SUCCESS: u8 = 0;
    pub const FAILURE: u8 = 1;
    /// A script line could not be parsed.
    pub const USAGE: u8 = 2;
    /// The configuration file is missing or invalid (EX_CONFIG).
    pub const CONFIG: u8 = 78;
}

/// Drive an in-memory volume from the command line
#[derive(Parser)]
#[command(name = "memfs")]
#[command(author, version)]
#[command(propagate_version = true)]
#[command(after_help = "EXAMPLES:
    # Run a script against a fresh volume
    memfs run setup.memfs

    # Interactive session
    memfs shell

    # Show the effective configuration
    memfs --config volume.toml info --json
")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress log output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Volume configuration file (TOML)
    #[arg(long, env = "MEMFS_CONFIG", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Reject every modification, overriding the config file
    #[arg(long, global = true)]
    read_only: bool,

    /// Reported capacity in bytes, overriding the config file
    #[arg(long, value_name = "BYTES", global = true)]
    capacity: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a script of volume commands
    Run(run::Args),

    /// Read volume commands interactively from stdin
    Shell(shell::Args),

    /// Show the effective volume configuration
    Info(info::Args),
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::from(exit_code::SUCCESS),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(categorize_error(&e))
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if !cli.quiet {
        setup_tracing(cli.verbose);
    }

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Run(args) => run::execute(config, &args),
        Commands::Shell(args) => shell::execute(config, &args),
        Commands::Info(args) => info::execute(&config, &args),
    }
}

/// Reads the config file (if any) and applies command-line overrides.
fn load_config(cli: &Cli) -> Result<MountConfig> {
    let mut config = match &cli.config {
        Some(path) => MountConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => MountConfig::default(),
    };
    if cli.read_only {
        config = config.read_only(true);
    }
    if let Some(bytes) = cli.capacity {
        config = config.total_bytes(bytes);
    }
    tracing::debug!(?config, "Effective configuration");
    Ok(config)
}

/// Set up tracing/logging based on verbosity level
fn setup_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(io::stderr)
        .init();
}

/// Maps an error to an exit code by walking its source chain.
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if cause.downcast_ref::<ConfigError>().is_some() {
            return exit_code::CONFIG;
        }
        if cause.downcast_ref::<clap::Error>().is_some() {
            return exit_code::USAGE;
        }
    }
    exit_code::FAILURE
}
