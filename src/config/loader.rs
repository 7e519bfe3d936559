//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{AppConfig, Environment};
use crate::domain::errors::AdminError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix for environment overrides (`CLINIC_<SECTION>_<KEY>`)
pub const ENV_PREFIX: &str = "CLINIC_";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into AppConfig
/// 4. Applies environment variable overrides (CLINIC_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use clinic_admin::config::loader::load_config;
///
/// let config = load_config("clinic-admin.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(AdminError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        AdminError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_str(&contents)
}

/// Loads configuration from TOML text
///
/// Same pipeline as [`load_config`] minus the file read.
pub fn load_config_str(contents: &str) -> Result<AppConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: AppConfig = toml::from_str(&contents)
        .map_err(|e| AdminError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        AdminError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| AdminError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let processed = re.replace_all(line, |cap: &regex::Captures<'_>| {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    String::new()
                }
            }
        });
        lines.push(processed.into_owned());
    }

    if !missing_vars.is_empty() {
        return Err(AdminError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn env(key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}{key}")).ok()
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match env(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
            AdminError::Configuration(format!("Invalid value for {ENV_PREFIX}{key}: '{raw}'"))
        }),
    }
}

/// Applies environment variable overrides using the CLINIC_* prefix
///
/// Environment variables follow the pattern: CLINIC_<SECTION>_<KEY>
/// For example: CLINIC_SERVER_PORT, CLINIC_SQLSERVER_ALLOW_RAW_SQL
fn apply_env_overrides(config: &mut AppConfig) -> Result<()> {
    // Application
    if let Some(val) = env("APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = env("ENVIRONMENT") {
        config.environment = match val.to_ascii_lowercase().as_str() {
            "development" => Environment::Development,
            "staging" => Environment::Staging,
            "production" => Environment::Production,
            other => {
                return Err(AdminError::Configuration(format!(
                    "Invalid value for {ENV_PREFIX}ENVIRONMENT: '{other}'"
                )))
            }
        };
    }

    // Server
    if let Some(val) = env("SERVER_HOST") {
        config.server.host = val;
    }
    if let Some(port) = parse_env("SERVER_PORT")? {
        config.server.port = port;
    }
    if let Some(val) = env("SERVER_STATIC_DIR") {
        config.server.static_dir = PathBuf::from(val);
    }
    if let Some(secs) = parse_env("SERVER_SHUTDOWN_TIMEOUT_SECS")? {
        config.server.shutdown_timeout_secs = secs;
    }

    // Auth
    if let Some(val) = env("AUTH_KEYS_FILE") {
        config.auth.keys_file = PathBuf::from(val);
    }

    // SQL Server
    if let Some(secs) = parse_env("SQLSERVER_CONNECT_TIMEOUT_SECONDS")? {
        config.sqlserver.connect_timeout_seconds = secs;
    }
    if let Some(secs) = parse_env("SQLSERVER_REQUEST_TIMEOUT_SECONDS")? {
        config.sqlserver.request_timeout_seconds = secs;
    }
    if let Some(flag) = parse_env("SQLSERVER_ENCRYPT")? {
        config.sqlserver.encrypt = flag;
    }
    if let Some(flag) = parse_env("SQLSERVER_TRUST_SERVER_CERTIFICATE")? {
        config.sqlserver.trust_server_certificate = flag;
    }
    if let Some(flag) = parse_env("SQLSERVER_ALLOW_RAW_SQL")? {
        config.sqlserver.allow_raw_sql = flag;
    }
    if let Some(val) = env("SQLSERVER_APPLICATION_NAME") {
        config.sqlserver.application_name = val;
    }

    // Import
    if let Some(val) = env("IMPORT_PATIENT_TABLE") {
        config.import.patient_table = val;
    }
    if let Some(val) = env("IMPORT_PLACEHOLDER_NAME") {
        config.import.placeholder_name = val;
    }
    if let Some(rows) = parse_env("IMPORT_MAX_ROWS")? {
        config.import.max_rows = rows;
    }

    // Logging
    if let Some(flag) = parse_env("LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = flag;
    }
    if let Some(val) = env("LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = env("LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
