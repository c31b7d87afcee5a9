// ABOUTME: Entry point for the reimage CLI application.
// ABOUTME: Parses arguments, loads configuration, and dispatches to command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use reimage::config::Config;
use reimage::error::Result;
use reimage::output::{Output, OutputMode};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode: OutputMode = cli.output.into();
    let result = run(cli).await;

    if let Err(e) = result {
        Output::new(mode).error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(&cli)?;
    let output = Output::new(cli.output.into());

    match cli.command {
        Commands::Check { names, no_pull } => {
            apply_selection(&mut config, names, no_pull);
            commands::check(config, output).await
        }
        Commands::Update {
            names,
            no_pull,
            cleanup,
            stop_timeout,
        } => {
            apply_selection(&mut config, names, no_pull);
            if cleanup {
                config.cleanup = true;
            }
            if let Some(timeout) = stop_timeout {
                config.stop.timeout = timeout;
            }
            commands::update(config, output).await
        }
        Commands::Exec {
            container,
            command,
            timeout,
        } => commands::exec_command(config, &container, &command, timeout, output).await,
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => Config::load(path),
        None => Config::discover_or_default(&env::current_dir()?),
    }
}

/// CLI flags override file values.
fn apply_selection(config: &mut Config, names: Vec<String>, no_pull: bool) {
    if !names.is_empty() {
        config.containers = names;
    }
    if no_pull {
        config.pull = false;
    }
}
