//! Import command implementation
//!
//! Runs the patient importer against a JSON file holding an array of patient
//! records, with the same normalization and numbering as the HTTP endpoint.

use crate::adapters::sqlserver::SqlServerConnector;
use crate::config::{load_config, secret_string_opt};
use crate::core::import::PatientImporter;
use crate::domain::connection::ConnectionDescriptor;
use crate::domain::AdminError;
use chrono::NaiveDate;
use clap::Args;
use serde_json::Value;
use std::path::PathBuf;

/// Arguments for the import command
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// JSON file containing an array of patient records
    #[arg(short, long)]
    pub file: PathBuf,

    /// SQL Server name (`host`, `host\INSTANCE` or `host,port`)
    #[arg(long, env = "CLINIC_SQL_SERVER")]
    pub server: String,

    /// Database name
    #[arg(long, env = "CLINIC_SQL_DATABASE")]
    pub database: String,

    /// SQL login
    #[arg(short, long, env = "CLINIC_SQL_USERNAME")]
    pub username: Option<String>,

    /// SQL password (read from the environment only)
    #[arg(skip = std::env::var("CLINIC_SQL_PASSWORD").ok())]
    pub password: Option<String>,

    /// Use Windows authentication instead of a SQL login
    #[arg(long)]
    pub windows_auth: bool,

    /// Date used for id prefixes and missing arrival dates (YYYY-MM-DD)
    #[arg(long)]
    pub run_date: Option<NaiveDate>,
}

impl ImportArgs {
    fn descriptor(&self) -> ConnectionDescriptor {
        ConnectionDescriptor {
            server: self.server.clone(),
            database: self.database.clone(),
            username: self.username.clone(),
            password: secret_string_opt(self.password.clone()),
            use_windows_auth: self.windows_auth,
        }
    }

    fn read_records(&self) -> anyhow::Result<Vec<Value>> {
        let data = std::fs::read_to_string(&self.file)?;
        match serde_json::from_str::<Value>(&data)? {
            Value::Array(records) => Ok(records),
            _ => anyhow::bail!("{} must contain a JSON array", self.file.display()),
        }
    }

    /// Execute the import command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(file = %self.file.display(), "Starting import command");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };
        if let Err(e) = config.validate() {
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let records = match self.read_records() {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(error = %e, "Cannot read import file");
                eprintln!("Cannot read {}: {e}", self.file.display());
                return Ok(2);
            }
        };

        let mut importer = PatientImporter::new(&config.import);
        if let Some(date) = self.run_date {
            importer = importer.with_run_date(date);
        }
        let connector = SqlServerConnector::new(&config.sqlserver, &config.import);

        println!("Importing {} records into {}", records.len(), self.database);
        let summary = match importer.import(&connector, &self.descriptor(), records).await {
            Ok(s) => s,
            Err(AdminError::Validation(msg)) => {
                eprintln!("Invalid input: {msg}");
                return Ok(2);
            }
            Err(AdminError::Connection(failure)) => {
                tracing::error!(detail = %failure.detail, "Connection failed");
                eprintln!("{}", failure.kind.user_message());
                eprintln!("   Error: {}", failure.detail);
                return Ok(4);
            }
            Err(e) => {
                crate::log_error_with_context!(&e, "Patient import failed");
                eprintln!("Import failed: {e}");
                return Ok(5);
            }
        };

        println!();
        println!("Import Summary:");
        println!("  Batch: {}", summary.batch_id);
        println!("  Total: {}", summary.total);
        println!("  Successful: {}", summary.success);
        println!("  Failed: {}", summary.failed());
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());

        if let Some(lines) = summary.error_lines() {
            println!();
            for line in lines {
                println!("  - {line}");
            }
        }
        println!();

        Ok(if summary.is_successful() { 0 } else { 1 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn args(file: PathBuf) -> ImportArgs {
        ImportArgs {
            file,
            server: "localhost".to_string(),
            database: "PhongKham".to_string(),
            username: Some("sa".to_string()),
            password: Some("pw".to_string()),
            windows_auth: false,
            run_date: None,
        }
    }

    #[test]
    fn test_read_records_requires_array() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"tenbenhnhan": "A"}}"#).unwrap();
        assert!(args(file.path().to_path_buf()).read_records().is_err());

        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"[{{"tenbenhnhan": "A"}}, {{}}]"#).unwrap();
        assert_eq!(args(file.path().to_path_buf()).read_records().unwrap().len(), 2);
    }

    #[test]
    fn test_descriptor_carries_password() {
        let descriptor = args(PathBuf::from("x.json")).descriptor();
        assert!(descriptor.validate().is_ok());
    }
}
