//! CLI interface and argument parsing
//!
//! This module provides the command-line interface using clap.
//!
//! Exit codes: 0 success, 1 import finished with row failures,
//! 2 configuration or input error, 4 connection error, 5 fatal error.

pub mod commands;

use clap::{Parser, Subcommand};

/// clinic-admin - Clinic database administration backend
#[derive(Parser, Debug)]
#[command(name = "clinic-admin")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "clinic-admin.toml", env = "CLINIC_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CLINIC_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API and static front-end
    Serve(commands::serve::ServeArgs),

    /// Import patients from a JSON file
    Import(commands::import::ImportArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Create a sample configuration and key file
    Init(commands::init::InitArgs),
}
