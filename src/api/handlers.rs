//! Request handlers

use super::response::{success, ApiError, ApiJson};
use super::state::AppState;
use crate::adapters::database::ServerInfo;
use crate::config::SecretString;
use crate::core::connection::{failure_status, test_connection as probe};
use crate::core::import::ImportSummary;
use crate::core::staff::{self, write_failure_message};
use crate::core::{locale_script, sql};
use crate::domain::connection::ConnectionDescriptor;
use crate::domain::patient::loose_string;
use crate::domain::staff::{NewAccount, NewEmployee};
use crate::domain::AdminError;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const MISSING_CONNECTION: &str = "Thiếu thông tin kết nối cơ sở dữ liệu";

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Deserialize)]
pub struct KeyRequest {
    #[serde(default)]
    pub key: Option<String>,
}

pub async fn validate_key(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<KeyRequest>,
) -> Result<Response, ApiError> {
    if state.keys.is_valid(request.key.as_deref()).await {
        tracing::info!("Access key accepted");
        Ok(success::<()>("Key hợp lệ", None))
    } else {
        tracing::warn!("Access key rejected");
        Err(ApiError::new(StatusCode::UNAUTHORIZED, "Key không hợp lệ"))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConnectionData {
    server: String,
    database: String,
    #[serde(flatten)]
    info: ServerInfo,
    timestamp: String,
}

pub async fn test_connection(
    State(state): State<AppState>,
    ApiJson(descriptor): ApiJson<ConnectionDescriptor>,
) -> Result<Response, ApiError> {
    match probe(state.connector.as_ref(), &descriptor).await {
        Ok(info) => Ok(success(
            "Kết nối thành công!",
            Some(ConnectionData {
                server: descriptor.server.clone(),
                database: descriptor.database.clone(),
                info,
                timestamp: timestamp(),
            }),
        )),
        Err(e) => {
            tracing::warn!(server = %descriptor.server, error = %e, "Connection test failed");
            let status =
                StatusCode::from_u16(failure_status(&e)).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let error = match e {
                AdminError::Validation(msg) => ApiError::bad_request(msg),
                AdminError::Connection(failure) => {
                    ApiError::new(status, failure.kind.user_message()).with_detail(failure.detail)
                }
                other => ApiError::new(status, "Không thể kết nối đến SQL Server")
                    .with_detail(other.to_string()),
            };
            Err(error.with_status(status))
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    #[serde(default)]
    pub connection_data: Option<ConnectionDescriptor>,

    #[serde(default)]
    pub patients: Option<Vec<Value>>,
}

#[derive(Debug, Serialize)]
struct ImportData {
    total: usize,
    success: usize,
    failed: usize,
    errors: Option<Vec<String>>,
}

impl From<&ImportSummary> for ImportData {
    fn from(summary: &ImportSummary) -> Self {
        Self {
            total: summary.total,
            success: summary.success,
            failed: summary.failed(),
            errors: summary.error_lines(),
        }
    }
}

pub async fn import_patients(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ImportRequest>,
) -> Result<Response, ApiError> {
    let descriptor = request
        .connection_data
        .ok_or_else(|| ApiError::bad_request(MISSING_CONNECTION))?;
    let patients = request.patients.unwrap_or_default();

    let summary = state
        .importer
        .import(state.connector.as_ref(), &descriptor, patients)
        .await
        .map_err(|e| {
            crate::log_error_with_context!(&e, "Patient import aborted");
            ApiError::from(e)
        })?;

    Ok(success(
        format!("Đã nhập {}/{} bệnh nhân", summary.success, summary.total),
        Some(ImportData::from(&summary)),
    ))
}

/// Employee fields sit next to `connectionData` at the top level
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRequest {
    #[serde(default)]
    pub connection_data: Option<ConnectionDescriptor>,

    #[serde(flatten)]
    pub employee: NewEmployee,
}

#[derive(Debug, Serialize)]
struct EmployeeData {
    idnhanvien: String,
    tennhanvien: String,
    namsinh: String,
    gioitinh: u8,
    timestamp: String,
}

/// Maps a staff provisioning failure, keeping the store text as detail
fn staff_error(error: AdminError, table: &str, fallback: &str) -> ApiError {
    match error {
        AdminError::Validation(msg) => ApiError::bad_request(msg),
        AdminError::Database(_) | AdminError::Timeout(_) => {
            let message = write_failure_message(&error, table, fallback);
            let detail = error.store_detail().unwrap_or_default().to_string();
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, message).with_detail(detail)
        }
        other => ApiError::from(other),
    }
}

pub async fn create_employee(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<EmployeeRequest>,
) -> Result<Response, ApiError> {
    let descriptor = request
        .connection_data
        .ok_or_else(|| ApiError::bad_request(MISSING_CONNECTION))?;

    let row = staff::create_employee(state.connector.as_ref(), &descriptor, request.employee)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Employee creation failed");
            staff_error(e, "tblNhanVien", "Lỗi khi tạo nhân viên")
        })?;

    Ok(success(
        "Nhân viên được tạo thành công!",
        Some(EmployeeData {
            idnhanvien: row.id.as_str().to_string(),
            tennhanvien: row.name,
            namsinh: row.birth_year,
            gioitinh: row.sex,
            timestamp: timestamp(),
        }),
    ))
}

/// The employee a login is created for
#[derive(Debug, Default, Deserialize)]
pub struct EmployeeRef {
    #[serde(default, deserialize_with = "loose_string")]
    pub idnhanvien: Option<String>,
}

/// `{ connectionData, employeeData: { idnhanvien }, account, password }`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRequest {
    #[serde(default)]
    pub connection_data: Option<ConnectionDescriptor>,

    #[serde(default)]
    pub employee_data: Option<EmployeeRef>,

    #[serde(default, deserialize_with = "loose_string")]
    pub account: Option<String>,

    #[serde(default)]
    pub password: Option<SecretString>,
}

impl AccountRequest {
    fn into_parts(self) -> (Option<ConnectionDescriptor>, NewAccount) {
        let account = NewAccount {
            employee_id: self.employee_data.and_then(|e| e.idnhanvien),
            account: self.account,
            password: self.password,
        };
        (self.connection_data, account)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountData {
    ma_tai_khoan: String,
    ma_nguoi_dung: String,
    account: String,
    timestamp: String,
}

pub async fn create_account(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AccountRequest>,
) -> Result<Response, ApiError> {
    let (descriptor, account) = request.into_parts();
    let descriptor = descriptor.ok_or_else(|| ApiError::bad_request(MISSING_CONNECTION))?;

    let created = staff::create_account(state.connector.as_ref(), &descriptor, account)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Account creation failed");
            staff_error(e, "tblUser", "Lỗi khi tạo tài khoản")
        })?;

    let id = created.employee_id.as_str().to_string();
    Ok(success(
        "Tài khoản được tạo thành công!",
        Some(AccountData {
            ma_tai_khoan: id.clone(),
            ma_nguoi_dung: id,
            account: created.account,
            timestamp: timestamp(),
        }),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlRequest {
    #[serde(default)]
    pub connection_data: Option<ConnectionDescriptor>,

    #[serde(default, alias = "query")]
    pub sql: String,
}

pub async fn execute_sql(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SqlRequest>,
) -> Result<Response, ApiError> {
    let descriptor = request
        .connection_data
        .ok_or_else(|| ApiError::bad_request(MISSING_CONNECTION))?;

    let outcome = sql::execute_sql(
        state.connector.as_ref(),
        &descriptor,
        &request.sql,
        state.allow_raw_sql,
    )
    .await
    .map_err(|e| {
        tracing::warn!(error = %e, "Raw SQL rejected or failed");
        match e {
            AdminError::Database(detail) | AdminError::Timeout(detail) => {
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Lỗi khi thực thi SQL")
                    .with_detail(detail)
            }
            other => ApiError::from(other),
        }
    })?;

    Ok(success("Thực thi SQL thành công", Some(outcome)))
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: String,
}

pub async fn health() -> Json<Health> {
    Json(Health {
        status: "OK",
        message: "Server đang chạy",
        timestamp: timestamp(),
    })
}

pub async fn download_locale_script() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", locale_script::FILE_NAME),
            ),
        ],
        locale_script::render(),
    )
}

pub async fn not_found() -> ApiError {
    ApiError::not_found("Endpoint không tìm thấy")
}
