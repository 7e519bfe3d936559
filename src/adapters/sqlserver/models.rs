//! Statement text and result conversion for SQL Server
//!
//! Table names come from configuration and are validated as plain
//! identifiers before they reach any statement; all row values are bound
//! parameters (`@P1`..`@Pn`).

use crate::domain::ids::FileNumber;
use crate::domain::{AdminError, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{Map, Number, Value};
use tiberius::{ColumnData, FromSql, Row};

/// Liveness probe plus server identity
pub const SERVER_INFO: &str =
    "SELECT 1 AS connection_test, @@VERSION AS version, @@SERVERNAME AS server_name, DB_NAME() AS database_name";

/// Employee table
pub const EMPLOYEE_TABLE: &str = "tblNhanVien";

/// Login table
pub const ACCOUNT_TABLE: &str = "tblUser";

/// Highest sequence among today's ids
///
/// `prefix` is the server-derived `DDMMYY` string and is the only value
/// interpolated into statement text. The server may evaluate the cast
/// before the filters, so it must not fail on odd ids.
pub fn max_sequence_query(table: &str, prefix: &str) -> String {
    format!(
        "SELECT MAX(TRY_CAST(SUBSTRING([idbenhnhan], 7, 6) AS INT)) FROM [{table}] \
         WHERE LEFT([idbenhnhan], 6) = '{prefix}' AND LEN([idbenhnhan]) = 12 \
         AND [idbenhnhan] NOT LIKE '%[^0-9]%'"
    )
}

pub fn max_file_number_query(table: &str) -> String {
    format!("SELECT MAX([sohoso]) FROM [{table}]")
}

/// Reads the `MAX([sohoso])` result
///
/// A value outside `i32` is an error rather than "no rows", so the
/// counter is never silently restarted.
pub fn file_number_from_max(max: Option<i64>) -> Result<Option<FileNumber>> {
    max.map(|v| {
        i32::try_from(v).map(FileNumber::new).map_err(|_| {
            AdminError::Database(format!("File number {v} is outside the supported range"))
        })
    })
    .transpose()
}

pub fn insert_patient_statement(table: &str) -> String {
    format!(
        "INSERT INTO [{table}] ([idbenhnhan], [tenbenhnhan], [gioitinh], [namsinh], [dienthoai], [diachi], [ngayden], [sohoso]) \
         VALUES (@P1, @P2, @P3, @P4, @P5, @P6, @P7, @P8)"
    )
}

pub fn insert_employee_statement() -> String {
    format!(
        "INSERT INTO [{EMPLOYEE_TABLE}] ([idnhanvien], [tennhanvien], [namsinh], [gioitinh], [cmnd], [diachi], \
         [dienthoai], [vitri], [congviec], [mucluong], [ghichu], [idvaitro]) \
         VALUES (@P1, @P2, @P3, @P4, @P5, @P6, @P7, @P8, @P9, @P10, @P11, @P12)"
    )
}

pub fn insert_account_statement() -> String {
    format!(
        "INSERT INTO [{ACCOUNT_TABLE}] ([MaTaiKhoan], [MaNguoiDung], [Account], [Password], [isadmin]) \
         VALUES (@P1, @P2, @P3, @P4, @P5)"
    )
}

/// Converts a result row into a JSON object keyed by column name
pub fn row_to_json(row: Row) -> Map<String, Value> {
    let names: Vec<String> = row.columns().iter().map(|c| c.name().to_string()).collect();
    names
        .into_iter()
        .zip(row)
        .map(|(name, data)| (name, column_to_json(&data)))
        .collect()
}

/// Reads an integer cell of any width, including numeric and text columns
pub fn cell_to_i64(data: &ColumnData<'static>) -> Option<i64> {
    match data {
        ColumnData::U8(Some(v)) => Some(i64::from(*v)),
        ColumnData::I16(Some(v)) => Some(i64::from(*v)),
        ColumnData::I32(Some(v)) => Some(i64::from(*v)),
        ColumnData::I64(Some(v)) => Some(*v),
        ColumnData::Numeric(Some(v)) if v.scale() == 0 => i64::try_from(v.value()).ok(),
        ColumnData::String(Some(v)) => v.trim().parse().ok(),
        _ => None,
    }
}

fn float(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Converts one cell; NULLs and unsupported types become `null`
pub fn column_to_json(data: &ColumnData<'static>) -> Value {
    match data {
        ColumnData::U8(Some(v)) => Value::from(*v),
        ColumnData::I16(Some(v)) => Value::from(*v),
        ColumnData::I32(Some(v)) => Value::from(*v),
        ColumnData::I64(Some(v)) => Value::from(*v),
        ColumnData::F32(Some(v)) => float(f64::from(*v)),
        ColumnData::F64(Some(v)) => float(*v),
        ColumnData::Bit(Some(v)) => Value::Bool(*v),
        ColumnData::String(Some(v)) => Value::String(v.to_string()),
        ColumnData::Guid(Some(v)) => Value::String(v.to_string()),
        ColumnData::Binary(Some(v)) => Value::String(hex(v)),
        ColumnData::Numeric(Some(v)) => {
            let text = v.to_string();
            text.parse::<f64>().map_or(Value::String(text), float)
        }
        ColumnData::Xml(Some(v)) => Value::String(v.clone().into_owned().into_string()),
        ColumnData::DateTime(Some(_))
        | ColumnData::SmallDateTime(Some(_))
        | ColumnData::DateTime2(Some(_)) => temporal::<NaiveDateTime>(data, |v| {
            v.format("%Y-%m-%dT%H:%M:%S%.3f").to_string()
        }),
        ColumnData::Date(Some(_)) => {
            temporal::<NaiveDate>(data, |v| v.format("%Y-%m-%d").to_string())
        }
        ColumnData::Time(Some(_)) => {
            temporal::<NaiveTime>(data, |v| v.format("%H:%M:%S%.3f").to_string())
        }
        ColumnData::DateTimeOffset(Some(_)) => {
            temporal::<DateTime<FixedOffset>>(data, |v| v.to_rfc3339())
        }
        _ => Value::Null,
    }
}

fn temporal<'a, T>(data: &'a ColumnData<'static>, render: impl FnOnce(T) -> String) -> Value
where
    T: FromSql<'a>,
{
    match T::from_sql(data) {
        Ok(Some(value)) => Value::String(render(value)),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    #[test]
    fn test_sequence_query_filters_prefix_and_shape() {
        let sql = max_sequence_query("tblBenhNhan", "100125");
        assert!(sql.contains("FROM [tblBenhNhan]"));
        assert!(sql.contains("LEFT([idbenhnhan], 6) = '100125'"));
        assert!(sql.contains("LEN([idbenhnhan]) = 12"));
        assert!(sql.contains("MAX(TRY_CAST(SUBSTRING([idbenhnhan], 7, 6) AS INT))"));
        assert!(!sql.contains("(CAST("));
    }

    #[test]
    fn test_file_number_out_of_range_is_an_error() {
        assert_eq!(file_number_from_max(None).unwrap(), None);
        assert_eq!(
            file_number_from_max(Some(4_117)).unwrap(),
            Some(FileNumber::new(4_117))
        );
        let err = file_number_from_max(Some(i64::from(i32::MAX) + 1)).unwrap_err();
        assert!(matches!(err, AdminError::Database(_)));
    }

    #[test]
    fn test_insert_statements_bind_every_column() {
        assert!(insert_patient_statement("tblBenhNhan").contains("@P8)"));
        assert!(insert_employee_statement().contains("@P12)"));
        assert!(insert_account_statement().contains("[isadmin]"));
    }

    #[test]
    fn test_scalar_cells() {
        assert_eq!(column_to_json(&ColumnData::I32(Some(7))), Value::from(7));
        assert_eq!(column_to_json(&ColumnData::I32(None)), Value::Null);
        assert_eq!(column_to_json(&ColumnData::Bit(Some(true))), Value::Bool(true));
        assert_eq!(
            column_to_json(&ColumnData::String(Some(Cow::Borrowed("Hà Nội")))),
            Value::String("Hà Nội".to_string())
        );
        assert_eq!(
            column_to_json(&ColumnData::Binary(Some(Cow::Borrowed(&[0x0a, 0xff][..])))),
            Value::String("0aff".to_string())
        );
        assert_eq!(column_to_json(&ColumnData::F64(Some(f64::NAN))), Value::Null);
    }

    #[test]
    fn test_integer_cells() {
        assert_eq!(cell_to_i64(&ColumnData::I32(Some(41))), Some(41));
        assert_eq!(cell_to_i64(&ColumnData::String(Some(Cow::Borrowed(" 12 ")))), Some(12));
        assert_eq!(cell_to_i64(&ColumnData::I64(None)), None);
        assert_eq!(cell_to_i64(&ColumnData::Bit(Some(true))), None);
    }
}
