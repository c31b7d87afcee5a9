// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand, ValueEnum};
use reimage::output::OutputMode;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "reimage")]
#[command(about = "Replace running containers with fresh instances of their updated images")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to reimage.yml in the current directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Normal)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report which containers have a newer image, without changing anything
    Check {
        /// Only consider these containers
        names: Vec<String>,

        /// Compare against local images without pulling
        #[arg(long)]
        no_pull: bool,
    },

    /// Replace containers whose image has changed
    Update {
        /// Only consider these containers
        names: Vec<String>,

        /// Compare against local images without pulling
        #[arg(long)]
        no_pull: bool,

        /// Remove old images after their containers are replaced
        #[arg(long)]
        cleanup: bool,

        /// How long to wait for each container to stop, and then to disappear
        #[arg(long, value_parser = humantime_serde::re::humantime::parse_duration)]
        stop_timeout: Option<Duration>,
    },

    /// Run a shell command inside a container
    Exec {
        /// Container name or ID
        container: String,

        /// Command passed to `sh -c`
        command: String,

        /// How long to wait for the command to finish
        #[arg(long, value_parser = humantime_serde::re::humantime::parse_duration, default_value = "60s")]
        timeout: Duration,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Normal,
    Quiet,
    Json,
}

impl From<OutputFormat> for OutputMode {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Normal => OutputMode::Normal,
            OutputFormat::Quiet => OutputMode::Quiet,
            OutputFormat::Json => OutputMode::Json,
        }
    }
}
