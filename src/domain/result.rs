//! Result type alias
//!
//! Convenience alias that uses [`AdminError`] as the error type.

use super::errors::AdminError;

/// Result type alias for library operations
///
/// # Examples
///
/// ```
/// use clinic_admin::domain::{AdminError, PatientId, Result};
///
/// fn parse_id(raw: &str) -> Result<PatientId> {
///     PatientId::new(raw).map_err(AdminError::Validation)
/// }
///
/// assert!(parse_id("100125000001").is_ok());
/// assert!(parse_id("abc").is_err());
/// ```
pub type Result<T> = std::result::Result<T, AdminError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn read_keys(json: &str) -> Result<Vec<String>> {
        Ok(serde_json::from_str(json)?)
    }

    #[test]
    fn test_foreign_errors_convert_through_question_mark() {
        assert_eq!(read_keys(r#"["a"]"#).unwrap(), vec!["a".to_string()]);
        assert!(matches!(read_keys("{"), Err(AdminError::Serialization(_))));
    }
}
