//! Domain error types
//!
//! This module defines the error hierarchy for the clinic admin backend.
//! Store errors are captured as messages so no `tiberius` type leaks out of
//! the adapter layer.

use thiserror::Error;

/// Main error type
///
/// This is the primary error type used throughout the library. The HTTP layer
/// maps each variant to a status code and a user-facing message.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Request validation errors (rejected before any store access)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Authentication errors (access key, disabled features)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The store could not be opened or authenticated against
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionFailure),

    /// A statement failed after the connection was established
    #[error("Database error: {0}")]
    Database(String),

    /// A store operation exceeded its time budget
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl AdminError {
    /// Returns the underlying store message for database-level errors
    pub fn store_detail(&self) -> Option<&str> {
        match self {
            AdminError::Connection(failure) => Some(&failure.detail),
            AdminError::Database(msg) | AdminError::Timeout(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Failure to open a session against the store
///
/// Carries the raw store message (`detail`) together with the classified kind
/// so callers can show a friendly message without losing the original text.
#[derive(Debug, Clone, Error)]
#[error("{kind:?}: {detail}")]
pub struct ConnectionFailure {
    /// Classified failure kind
    pub kind: ConnectionFailureKind,

    /// Message reported by the driver or server
    pub detail: String,
}

impl ConnectionFailure {
    /// Creates a failure, classifying the message
    pub fn from_message(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self {
            kind: ConnectionFailureKind::classify(&detail),
            detail,
        }
    }

    /// Creates a failure with an explicit kind
    pub fn new(kind: ConnectionFailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

/// Known reasons a connection attempt fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionFailureKind {
    /// DNS lookup failed
    HostNotFound,
    /// Socket-level failure (wrong port, firewall)
    Network,
    /// Credentials rejected
    LoginFailed,
    /// Database missing or not accessible to the login
    DatabaseUnavailable,
    /// Connect or login did not finish in time
    Timeout,
    /// Server actively refused the connection
    Refused,
    /// Anything else
    Other,
}

impl ConnectionFailureKind {
    /// Classifies a driver/server message by substring
    ///
    /// Checks run in a fixed order; the first match wins.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();

        if lower.contains("enotfound")
            || lower.contains("no such host")
            || lower.contains("failed to lookup address")
            || lower.contains("name or service not known")
        {
            ConnectionFailureKind::HostNotFound
        } else if lower.contains("esocket") || lower.contains("network is unreachable") {
            ConnectionFailureKind::Network
        } else if lower.contains("login failed") || lower.contains("authentication") {
            ConnectionFailureKind::LoginFailed
        } else if lower.contains("cannot open database") || lower.contains("does not exist") {
            ConnectionFailureKind::DatabaseUnavailable
        } else if lower.contains("timeout")
            || lower.contains("timed out")
            || lower.contains("etimedout")
        {
            ConnectionFailureKind::Timeout
        } else if lower.contains("connection refused") || lower.contains("actively refused") {
            ConnectionFailureKind::Refused
        } else {
            ConnectionFailureKind::Other
        }
    }

    /// User-facing message for this failure kind
    pub fn user_message(&self) -> &'static str {
        match self {
            ConnectionFailureKind::HostNotFound => {
                "Không tìm thấy server. Kiểm tra tên server hoặc địa chỉ IP."
            }
            ConnectionFailureKind::Network => {
                "Lỗi kết nối mạng. Kiểm tra cổng SQL Server (mặc định 1433)."
            }
            ConnectionFailureKind::LoginFailed => "Tên đăng nhập hoặc mật khẩu không đúng.",
            ConnectionFailureKind::DatabaseUnavailable => {
                "Cơ sở dữ liệu không tồn tại hoặc không có quyền truy cập."
            }
            ConnectionFailureKind::Timeout => {
                "Kết nối hết thời gian chờ. Server có thể không phản hồi hoặc quá tải."
            }
            ConnectionFailureKind::Refused => {
                "Kết nối bị từ chối. SQL Server có thể không đang chạy."
            }
            ConnectionFailureKind::Other => "Không thể kết nối đến SQL Server",
        }
    }
}

/// Known reasons an insert fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteFailureKind {
    /// Login lacks INSERT permission on the table
    PermissionDenied,
    /// Primary key or unique constraint violated
    Duplicate,
    /// Statement did not finish in time
    Timeout,
    /// Anything else
    Other,
}

impl WriteFailureKind {
    /// Classifies an insert error message by substring
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();

        if lower.contains("permission") || lower.contains("denied") {
            WriteFailureKind::PermissionDenied
        } else if lower.contains("duplicate")
            || lower.contains("primary key")
            || lower.contains("unique key")
        {
            WriteFailureKind::Duplicate
        } else if lower.contains("timeout") || lower.contains("timed out") {
            WriteFailureKind::Timeout
        } else {
            WriteFailureKind::Other
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for AdminError {
    fn from(err: std::io::Error) -> Self {
        AdminError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for AdminError {
    fn from(err: serde_json::Error) -> Self {
        AdminError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for AdminError {
    fn from(err: toml::de::Error) -> Self {
        AdminError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_error_display() {
        let err = AdminError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_connection_failure_conversion() {
        let failure = ConnectionFailure::from_message("Login failed for user 'sa'.");
        let err: AdminError = failure.into();
        assert!(matches!(
            err,
            AdminError::Connection(ConnectionFailure {
                kind: ConnectionFailureKind::LoginFailed,
                ..
            })
        ));
        assert_eq!(err.store_detail(), Some("Login failed for user 'sa'."));
    }

    #[test]
    fn test_classify_connection_messages() {
        assert_eq!(
            ConnectionFailureKind::classify("getaddrinfo ENOTFOUND sqlhost"),
            ConnectionFailureKind::HostNotFound
        );
        assert_eq!(
            ConnectionFailureKind::classify("Failed to connect: ESOCKET"),
            ConnectionFailureKind::Network
        );
        assert_eq!(
            ConnectionFailureKind::classify("Cannot open database \"clinic\" requested by the login"),
            ConnectionFailureKind::DatabaseUnavailable
        );
        assert_eq!(
            ConnectionFailureKind::classify("connect timed out after 10s"),
            ConnectionFailureKind::Timeout
        );
        assert_eq!(
            ConnectionFailureKind::classify("Connection refused (os error 111)"),
            ConnectionFailureKind::Refused
        );
        assert_eq!(
            ConnectionFailureKind::classify("something odd"),
            ConnectionFailureKind::Other
        );
    }

    #[test]
    fn test_classify_write_messages() {
        assert_eq!(
            WriteFailureKind::classify(
                "Violation of PRIMARY KEY constraint 'PK_tblBenhNhan'. Cannot insert duplicate key"
            ),
            WriteFailureKind::Duplicate
        );
        assert_eq!(
            WriteFailureKind::classify("The INSERT permission was denied on the object"),
            WriteFailureKind::PermissionDenied
        );
        assert_eq!(
            WriteFailureKind::classify("request timeout"),
            WriteFailureKind::Timeout
        );
        assert_eq!(WriteFailureKind::classify("boom"), WriteFailureKind::Other);
    }

    #[test]
    fn test_store_detail_absent_for_validation() {
        let err = AdminError::Validation("empty".to_string());
        assert!(err.store_detail().is_none());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: AdminError = io_err.into();
        assert!(matches!(err, AdminError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: AdminError = json_err.into();
        assert!(matches!(err, AdminError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: AdminError = toml_err.into();
        assert!(matches!(err, AdminError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }
}
