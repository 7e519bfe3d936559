//! Logging and observability
//!
//! Structured logging through `tracing`, plus a few macros that keep the
//! field names of recurring import events consistent across the crate.
//!
//! # Example
//!
//! ```no_run
//! use clinic_admin::logging::init_logging;
//! use clinic_admin::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a patient import batch
///
/// # Example
///
/// ```no_run
/// use clinic_admin::log_import_start;
///
/// log_import_start!("0b9c1d3e", 120, "100125");
/// ```
#[macro_export]
macro_rules! log_import_start {
    ($batch_id:expr, $rows:expr, $prefix:expr) => {
        tracing::info!(
            batch_id = %$batch_id,
            rows = $rows,
            id_prefix = %$prefix,
            "Starting patient import"
        );
    };
}

/// Log the completion of a patient import batch
///
/// # Example
///
/// ```no_run
/// use clinic_admin::log_import_complete;
/// use std::time::Duration;
///
/// log_import_complete!("0b9c1d3e", 120, 118, 2, Duration::from_millis(850));
/// ```
#[macro_export]
macro_rules! log_import_complete {
    ($batch_id:expr, $total:expr, $success:expr, $failed:expr, $duration:expr) => {
        tracing::info!(
            batch_id = %$batch_id,
            total = $total,
            success = $success,
            failed = $failed,
            duration_ms = $duration.as_millis() as u64,
            "Patient import completed"
        );
    };
}

/// Log a single row that could not be imported
///
/// # Example
///
/// ```no_run
/// use clinic_admin::log_row_failure;
///
/// log_row_failure!("0b9c1d3e", 2, "Violation of PRIMARY KEY constraint");
/// ```
#[macro_export]
macro_rules! log_row_failure {
    ($batch_id:expr, $row_index:expr, $reason:expr) => {
        tracing::warn!(
            batch_id = %$batch_id,
            row_index = $row_index,
            reason = %$reason,
            "Patient row failed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use clinic_admin::log_error_with_context;
/// use clinic_admin::domain::AdminError;
///
/// let error = AdminError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
