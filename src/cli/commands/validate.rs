//! Validate config command implementation
//!
//! Loads the configuration file and prints a summary of the effective
//! settings, including environment overrides.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        match config.validate() {
            Ok(()) => {
                println!("✅ Configuration is valid");
                println!();
                println!("Configuration Summary:");
                println!("  Environment: {:?}", config.environment);
                println!("  Log Level: {}", config.application.log_level);
                println!("  Listen Address: {}", config.server.bind_address());
                println!("  Static Files: {}", config.server.static_dir.display());
                println!("  Key File: {}", config.auth.keys_file.display());
                println!(
                    "  SQL Timeouts: connect {}s, request {}s",
                    config.sqlserver.connect_timeout_seconds,
                    config.sqlserver.request_timeout_seconds
                );
                println!(
                    "  Raw SQL: {}",
                    if config.sqlserver.allow_raw_sql {
                        "enabled"
                    } else {
                        "disabled"
                    }
                );
                println!("  Patient Table: {}", config.import.patient_table);
                println!("  Max Rows Per Import: {}", config.import.max_rows);

                if !config.auth.keys_file.exists() {
                    println!();
                    println!(
                        "⚠️  Key file {} does not exist; every key will be rejected",
                        config.auth.keys_file.display()
                    );
                }
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                Ok(2)
            }
        }
    }
}
