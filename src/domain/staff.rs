//! Staff provisioning inputs
//!
//! [`NewEmployee`] is read straight from the request body and
//! [`NewAccount`] is assembled from the account request;
//! [`EmployeeRow`] and [`AccountRow`] are the validated shapes that get
//! written to `tblNhanVien` and `tblUser`.

use crate::config::SecretString;
use crate::domain::errors::AdminError;
use crate::domain::ids::EmployeeId;
use crate::domain::patient::loose_string;
use crate::domain::Result;
use secrecy::ExposeSecret;
use serde::Deserialize;

/// Role assigned to new employees when the request does not name one
pub const DEFAULT_ROLE_ID: &str = "160120160000";

/// Longest login name `tblUser.Account` holds
pub const MAX_ACCOUNT_LEN: usize = 50;

/// Employee fields as submitted by the front-end
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewEmployee {
    #[serde(rename = "tennhanvien", default, deserialize_with = "loose_string")]
    pub name: Option<String>,

    #[serde(rename = "namsinh", default, deserialize_with = "loose_string")]
    pub birth_year: Option<String>,

    /// `1` for male, `0` for female
    #[serde(rename = "gioitinh", default, deserialize_with = "loose_string")]
    pub sex: Option<String>,

    /// National id card number
    #[serde(rename = "cmnd", default, deserialize_with = "loose_string")]
    pub id_card: Option<String>,

    #[serde(rename = "dienthoai", default, deserialize_with = "loose_string")]
    pub phone: Option<String>,

    #[serde(rename = "diachi", default, deserialize_with = "loose_string")]
    pub address: Option<String>,

    #[serde(rename = "vitri", default, deserialize_with = "loose_string")]
    pub position: Option<String>,

    #[serde(rename = "congviec", default, deserialize_with = "loose_string")]
    pub duties: Option<String>,

    #[serde(rename = "mucluong", default, deserialize_with = "loose_string")]
    pub salary: Option<String>,

    #[serde(rename = "ghichu", default, deserialize_with = "loose_string")]
    pub notes: Option<String>,

    #[serde(rename = "idvaitro", default, deserialize_with = "loose_string")]
    pub role_id: Option<String>,
}

/// A validated `tblNhanVien` row
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeRow {
    pub id: EmployeeId,
    pub name: String,
    pub birth_year: String,
    pub sex: u8,
    pub id_card: String,
    pub address: String,
    pub phone: String,
    pub position: String,
    pub duties: String,
    pub salary: f64,
    pub notes: String,
    pub role_id: String,
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn text_or_empty(value: &Option<String>) -> String {
    trimmed(value).unwrap_or_default().to_string()
}

impl NewEmployee {
    /// Validates the request and builds the row to insert under `id`
    ///
    /// Name, birth year, sex and phone are required. Optional text columns
    /// default to the empty string and salary defaults to 0.
    pub fn into_row(self, id: EmployeeId) -> Result<EmployeeRow> {
        let (Some(name), Some(birth_year), Some(sex), Some(phone)) = (
            trimmed(&self.name),
            trimmed(&self.birth_year),
            trimmed(&self.sex),
            trimmed(&self.phone),
        ) else {
            return Err(AdminError::Validation(
                "Thiếu dữ liệu bắt buộc (Tên, Năm sinh, Giới tính, Điện thoại)".to_string(),
            ));
        };

        if birth_year.len() != 4 || !birth_year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AdminError::Validation(format!(
                "Năm sinh không hợp lệ: {birth_year}"
            )));
        }

        let sex = sex
            .parse::<u8>()
            .map_err(|_| AdminError::Validation(format!("Giới tính không hợp lệ: {sex}")))?;

        let salary = match trimmed(&self.salary) {
            None => 0.0,
            Some(raw) => raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .ok_or_else(|| AdminError::Validation(format!("Mức lương không hợp lệ: {raw}")))?,
        };

        Ok(EmployeeRow {
            id,
            name: name.to_string(),
            birth_year: birth_year.to_string(),
            sex,
            phone: phone.to_string(),
            id_card: text_or_empty(&self.id_card),
            address: text_or_empty(&self.address),
            position: text_or_empty(&self.position),
            duties: text_or_empty(&self.duties),
            notes: text_or_empty(&self.notes),
            salary,
            role_id: trimmed(&self.role_id)
                .unwrap_or(DEFAULT_ROLE_ID)
                .to_string(),
        })
    }
}

/// Login to create for an existing employee
#[derive(Debug, Clone, Default)]
pub struct NewAccount {
    /// Id returned by employee creation
    pub employee_id: Option<String>,

    /// Login name
    pub account: Option<String>,

    /// Login password
    pub password: Option<SecretString>,
}

/// A validated `tblUser` row
///
/// Both `MaTaiKhoan` and `MaNguoiDung` take the employee id.
#[derive(Debug, Clone)]
pub struct AccountRow {
    pub employee_id: EmployeeId,
    pub account: String,
    pub password: SecretString,
    pub is_admin: bool,
}

impl NewAccount {
    /// Validates the request into the row to insert
    pub fn into_row(self) -> Result<AccountRow> {
        let invalid = || AdminError::Validation("Dữ liệu không hợp lệ".to_string());

        let employee_id = trimmed(&self.employee_id).ok_or_else(invalid)?;
        let employee_id = EmployeeId::new(employee_id).map_err(AdminError::Validation)?;

        let account = trimmed(&self.account).ok_or_else(invalid)?;
        if account.chars().count() > MAX_ACCOUNT_LEN {
            return Err(AdminError::Validation(format!(
                "Tên tài khoản tối đa {MAX_ACCOUNT_LEN} ký tự"
            )));
        }

        let password = self.password.ok_or_else(invalid)?;
        if password.expose_secret().is_empty() {
            return Err(invalid());
        }

        Ok(AccountRow {
            employee_id,
            account: account.to_string(),
            password,
            is_admin: false,
        })
    }
}
