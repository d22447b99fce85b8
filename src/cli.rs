use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "health-cost", version, about = "Annual health cost estimator")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "health-cost.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Estimate annual health cost for one person
    Estimate(crate::commands::estimate::EstimateArgs),

    /// Reference data management
    Data {
        #[command(subcommand)]
        action: DataCommands,
    },

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand, Debug, Clone)]
pub enum DataCommands {
    /// Write the built-in reference tables to the configured paths
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,
    },

    /// Print the loaded reference tables
    Show,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Display current configuration (with secrets masked)
    Show,

    /// Validate configuration file
    Validate,
}
