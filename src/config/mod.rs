//! Configuration management for the clinic admin service.
//!
//! # Overview
//!
//! Configuration lives in a TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - Default values for every setting
//! - `CLINIC_<SECTION>_<KEY>` environment overrides
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use clinic_admin::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("clinic-admin.toml")?;
//!
//! println!("Listening on {}", config.server.bind_address());
//! println!("Patients go to {}", config.import.patient_table);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`ServerConfig`] - Bind address, static assets, shutdown grace period
//! - [`AuthConfig`] - Access-key file
//! - [`SqlServerConfig`] - Session timeouts, TLS options, raw SQL switch
//! - [`ImportConfig`] - Patient table, placeholder name, batch cap
//! - [`LoggingConfig`] - Local log files
//!
//! # Example Configuration
//!
//! ```toml
//! environment = "production"
//!
//! [application]
//! log_level = "info"
//!
//! [server]
//! host = "0.0.0.0"
//! port = 3000
//! static_dir = "public"
//!
//! [auth]
//! keys_file = "${CLINIC_KEYS_PATH}"
//!
//! [sqlserver]
//! connect_timeout_seconds = 10
//! request_timeout_seconds = 10
//! allow_raw_sql = false
//!
//! [import]
//! patient_table = "tblBenhNhan"
//! max_rows = 5000
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_config_str};
pub use schema::{
    AppConfig, ApplicationConfig, AuthConfig, Environment, ImportConfig, LoggingConfig,
    ServerConfig, SqlServerConfig,
};
pub use secret::{expose, secret_string, secret_string_opt, SecretString, SecretValue};
