mod cli;
mod commands;
mod engine;
mod progress;
mod ui;

use anyhow::{Context as AnyhowContext, Result};
use clap::Parser;
use cli::{Cli, Command};
use esxkit::Esxcli;
use netplan::NetworkConfig;
use std::path::Path;
use std::process::ExitCode;

/// `EX_CONFIG` from sysexits(3)
const EXIT_CONFIG: u8 = 78;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = cli.config_path() {
        err.exit();
    }

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    // Loaded for every command so a bad document aborts before anything changes
    let config = load_config(cli.config_path()?)?;
    let host = Esxcli::new(cli.esxcli).dry_run(cli.dry_run);

    match cli.command {
        Command::Apply(args) => commands::apply::run(&ctx, &host, &config, args),
        Command::Wipe => commands::wipe::run(&ctx, &host),
        Command::Status => commands::status::run(&ctx, &host, &config),
    }
}

fn load_config(path: &str) -> Result<NetworkConfig> {
    let expanded = shellexpand::tilde(path);
    let config = netplan::load(Path::new(expanded.as_ref()))
        .with_context(|| format!("Failed to load network config {path}"))?;
    log::debug!("loaded {} devices from {path}", config.config.len());
    Ok(config)
}

fn exit_code(err: &anyhow::Error) -> u8 {
    if err.chain().any(|e| e.is::<netplan::Error>()) {
        EXIT_CONFIG
    } else {
        1
    }
}

fn report_error(err: &anyhow::Error) {
    ui::error(&format!("{err:#}"));

    if let Some(esx) = err.chain().find_map(|e| e.downcast_ref::<esxkit::Error>()) {
        let category = esx.category();
        eprintln!("  {}", category.description());
        eprintln!("  {}", category.advice());
    }
}
