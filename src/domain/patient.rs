//! Patient records: untrusted import input and the normalized row
//!
//! Spreadsheet exports deliver cells as strings, numbers or booleans
//! depending on the tool, so every raw field is read through
//! [`loose_string`], which stringifies scalars and drops anything else.

use crate::domain::ids::{FileNumber, PatientId};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One row of patient input as sent by the client
///
/// No attribute is guaranteed to be present or well-formed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawPatientRecord {
    /// Existing 12-digit patient id, if the sheet carries one
    #[serde(rename = "idbenhnhan", alias = "id", default, deserialize_with = "loose_string")]
    pub id: Option<String>,

    /// Full name
    #[serde(rename = "tenbenhnhan", alias = "name", default, deserialize_with = "loose_string")]
    pub name: Option<String>,

    /// Sex as free text ("Nam", "Nữ", ...)
    #[serde(rename = "gioitinh", alias = "sex", default, deserialize_with = "loose_string")]
    pub sex: Option<String>,

    /// Birth year
    #[serde(rename = "namsinh", alias = "birthYear", default, deserialize_with = "loose_string")]
    pub birth_year: Option<String>,

    /// Arrival date (`D/M/YYYY`, `YYYY-MM-DD` or `#`)
    #[serde(rename = "ngayden", alias = "arrivalDate", default, deserialize_with = "loose_string")]
    pub arrival_date: Option<String>,

    /// Phone number
    #[serde(rename = "dienthoai", alias = "phone", default, deserialize_with = "loose_string")]
    pub phone: Option<String>,

    /// Postal address
    #[serde(rename = "diachi", alias = "address", default, deserialize_with = "loose_string")]
    pub address: Option<String>,
}

impl RawPatientRecord {
    /// Reads a record from an arbitrary JSON value
    ///
    /// # Errors
    ///
    /// Returns a one-line reason when the value is not a JSON object.
    pub fn from_value(value: &Value) -> Result<Self, String> {
        if !value.is_object() {
            return Err(format!(
                "Dữ liệu dòng không hợp lệ (cần một đối tượng, nhận được {})",
                json_kind(value)
            ));
        }
        serde_json::from_value(value.clone()).map_err(|e| format!("Dữ liệu dòng không hợp lệ: {e}"))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Deserializes any JSON scalar into an optional string
///
/// Integral floats such as `1990.0` are rendered without the fraction.
pub fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                Some(n.to_string())
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{}", f as i64)),
                    _ => Some(n.to_string()),
                }
            }
        }
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    })
}

/// A patient row ready for persistence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedPatient {
    /// 12-digit patient id
    pub id: PatientId,

    /// Trimmed name, or the configured placeholder
    pub name: String,

    /// 1 for male, 0 otherwise
    pub sex: u8,

    /// Four-digit birth year
    pub birth_year: String,

    /// Arrival date
    pub arrival_date: NaiveDate,

    /// File number reserved for this row
    pub file_number: FileNumber,

    /// Trimmed phone number
    pub phone: Option<String>,

    /// Trimmed address
    pub address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reads_vietnamese_keys() {
        let record = RawPatientRecord::from_value(&json!({
            "idbenhnhan": "abc",
            "tenbenhnhan": "Nguyễn Văn A",
            "gioitinh": "Nam",
            "namsinh": "1980",
            "ngayden": "05/03/2024",
            "dienthoai": "0901234567",
            "diachi": "Hà Nội"
        }))
        .unwrap();

        assert_eq!(record.id.as_deref(), Some("abc"));
        assert_eq!(record.name.as_deref(), Some("Nguyễn Văn A"));
        assert_eq!(record.sex.as_deref(), Some("Nam"));
        assert_eq!(record.arrival_date.as_deref(), Some("05/03/2024"));
        assert_eq!(record.address.as_deref(), Some("Hà Nội"));
    }

    #[test]
    fn test_numbers_are_stringified() {
        let record = RawPatientRecord::from_value(&json!({
            "idbenhnhan": 100125000001u64,
            "namsinh": 1990.0,
            "dienthoai": 901234567
        }))
        .unwrap();

        assert_eq!(record.id.as_deref(), Some("100125000001"));
        assert_eq!(record.birth_year.as_deref(), Some("1990"));
        assert_eq!(record.phone.as_deref(), Some("901234567"));
    }

    #[test]
    fn test_missing_and_nested_fields_are_absent() {
        let record = RawPatientRecord::from_value(&json!({
            "tenbenhnhan": null,
            "diachi": {"street": "x"}
        }))
        .unwrap();

        assert_eq!(record, RawPatientRecord::default());
    }

    #[test]
    fn test_non_object_is_rejected() {
        let err = RawPatientRecord::from_value(&json!("just text")).unwrap_err();
        assert!(err.contains("string"));
        assert!(RawPatientRecord::from_value(&json!([1, 2])).is_err());
    }
}
