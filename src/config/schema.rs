//! Configuration schema types
//!
//! This module defines the configuration structure for the clinic admin
//! service. Every section has defaults so an empty file is a valid config.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Runtime environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    #[default]
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    Production,
}

/// Root configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: Environment,

    /// HTTP listener and static assets
    #[serde(default)]
    pub server: ServerConfig,

    /// Access-key file
    #[serde(default)]
    pub auth: AuthConfig,

    /// SQL Server session settings
    #[serde(default)]
    pub sqlserver: SqlServerConfig,

    /// Patient import settings
    #[serde(default)]
    pub import: ImportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.server.validate()?;
        self.auth.validate()?;
        self.sqlserver.validate(&self.environment)?;
        self.import.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the front-end (`index.html`, scripts, styles)
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// Seconds to wait for in-flight requests on shutdown
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

impl ServerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("server.host cannot be empty".to_string());
        }
        if self.port == 0 {
            return Err("server.port must be > 0".to_string());
        }
        if self.shutdown_timeout_secs == 0 || self.shutdown_timeout_secs > 300 {
            return Err(format!(
                "server.shutdown_timeout_secs must be between 1 and 300, got {}",
                self.shutdown_timeout_secs
            ));
        }
        Ok(())
    }

    /// `host:port` string for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Access-key configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// JSON file of the form `{ "validKeys": [...] }`
    #[serde(default = "default_keys_file")]
    pub keys_file: PathBuf,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            keys_file: default_keys_file(),
        }
    }
}

impl AuthConfig {
    fn validate(&self) -> Result<(), String> {
        if self.keys_file.as_os_str().is_empty() {
            return Err("auth.keys_file cannot be empty".to_string());
        }
        Ok(())
    }
}

/// SQL Server session configuration
///
/// The server, database and credentials come with each request; this
/// section only holds the session options shared by all of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqlServerConfig {
    /// Connect and login timeout in seconds
    #[serde(default = "default_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,

    /// Per-statement timeout in seconds
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,

    /// Encrypt the TDS stream
    #[serde(default)]
    pub encrypt: bool,

    /// Accept self-signed server certificates
    #[serde(default = "default_true")]
    pub trust_server_certificate: bool,

    /// Enable `POST /api/execute-sql`
    #[serde(default)]
    pub allow_raw_sql: bool,

    /// Application name reported to the server
    #[serde(default = "default_application_name")]
    pub application_name: String,
}

impl Default for SqlServerConfig {
    fn default() -> Self {
        Self {
            connect_timeout_seconds: default_connect_timeout_seconds(),
            request_timeout_seconds: default_request_timeout_seconds(),
            encrypt: false,
            trust_server_certificate: true,
            allow_raw_sql: false,
            application_name: default_application_name(),
        }
    }
}

impl SqlServerConfig {
    fn validate(&self, environment: &Environment) -> Result<(), String> {
        if self.connect_timeout_seconds == 0 || self.connect_timeout_seconds > 300 {
            return Err(format!(
                "sqlserver.connect_timeout_seconds must be between 1 and 300, got {}",
                self.connect_timeout_seconds
            ));
        }
        if self.request_timeout_seconds == 0 || self.request_timeout_seconds > 3600 {
            return Err(format!(
                "sqlserver.request_timeout_seconds must be between 1 and 3600, got {}",
                self.request_timeout_seconds
            ));
        }
        if self.application_name.trim().is_empty() {
            return Err("sqlserver.application_name cannot be empty".to_string());
        }
        if *environment == Environment::Production && self.allow_raw_sql {
            return Err(
                "sqlserver.allow_raw_sql cannot be enabled in production environment".to_string(),
            );
        }
        Ok(())
    }
}

/// Patient import configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Target table for patient rows
    #[serde(default = "default_patient_table")]
    pub patient_table: String,

    /// Name stored when a row has no usable name
    #[serde(default = "default_placeholder_name")]
    pub placeholder_name: String,

    /// Largest batch accepted in one request
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            patient_table: default_patient_table(),
            placeholder_name: default_placeholder_name(),
            max_rows: default_max_rows(),
        }
    }
}

impl ImportConfig {
    fn validate(&self) -> Result<(), String> {
        if !is_sql_identifier(&self.patient_table) {
            return Err(format!(
                "import.patient_table '{}' must be a plain identifier (letters, digits, underscore)",
                self.patient_table
            ));
        }
        if self.placeholder_name.trim().is_empty() {
            return Err("import.placeholder_name cannot be empty".to_string());
        }
        if self.max_rows == 0 || self.max_rows > 100_000 {
            return Err(format!(
                "import.max_rows must be between 1 and 100000, got {}",
                self.max_rows
            ));
        }
        Ok(())
    }
}

/// Returns true for names that can be bracketed into SQL text verbatim
pub fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    name.len() <= 128 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default = "default_true")]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,

    /// Rotated files to keep before the oldest is deleted
    #[serde(default = "default_local_max_files")]
    pub local_max_files: usize,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_max_files == 0 {
            return Err("logging.local_max_files must be > 0".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: true,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
            local_max_files: default_local_max_files(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_shutdown_timeout_secs() -> u64 {
    30
}

fn default_keys_file() -> PathBuf {
    PathBuf::from("keys.json")
}

fn default_connect_timeout_seconds() -> u64 {
    10
}

fn default_request_timeout_seconds() -> u64 {
    10
}

fn default_application_name() -> String {
    "clinic-admin".to_string()
}

fn default_patient_table() -> String {
    "tblBenhNhan".to_string()
}

fn default_placeholder_name() -> String {
    "Không tên".to_string()
}

fn default_max_rows() -> usize {
    5000
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

fn default_local_max_files() -> usize {
    14
}
