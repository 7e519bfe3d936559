//! Employee and login provisioning

use crate::adapters::database::{with_session, StoreConnector};
use crate::domain::connection::ConnectionDescriptor;
use crate::domain::errors::WriteFailureKind;
use crate::domain::ids::EmployeeId;
use crate::domain::staff::{EmployeeRow, NewAccount, NewEmployee};
use crate::domain::{AdminError, Result};

/// What was created for an account request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedAccount {
    pub employee_id: EmployeeId,
    pub account: String,
}

/// Inserts a new `tblNhanVien` row under a random 12-digit id
///
/// # Errors
///
/// Missing required fields are a validation error raised before connecting.
/// Insert failures keep the store message in [`AdminError::Database`].
pub async fn create_employee(
    connector: &dyn StoreConnector,
    descriptor: &ConnectionDescriptor,
    request: NewEmployee,
) -> Result<EmployeeRow> {
    let row = request.into_row(EmployeeId::random())?;
    descriptor.validate()?;

    tracing::info!(employee_id = %row.id, sex = row.sex, "Creating employee");

    let inserted = row.clone();
    with_session(connector, descriptor, move |session| {
        Box::pin(async move { session.insert_employee(&inserted).await })
    })
    .await?;

    tracing::info!(employee_id = %row.id, "Employee created");
    Ok(row)
}

/// Inserts a `tblUser` login for an existing employee
pub async fn create_account(
    connector: &dyn StoreConnector,
    descriptor: &ConnectionDescriptor,
    request: NewAccount,
) -> Result<CreatedAccount> {
    let row = request.into_row()?;
    descriptor.validate()?;

    let created = CreatedAccount {
        employee_id: row.employee_id.clone(),
        account: row.account.clone(),
    };
    tracing::info!(employee_id = %created.employee_id, account = %created.account, "Creating account");

    with_session(connector, descriptor, move |session| {
        Box::pin(async move { session.insert_account(&row).await })
    })
    .await?;

    Ok(created)
}

/// User-facing message for a failed insert into `table`
pub fn write_failure_message(error: &AdminError, table: &str, fallback: &str) -> String {
    let Some(detail) = error.store_detail() else {
        return fallback.to_string();
    };
    match WriteFailureKind::classify(detail) {
        WriteFailureKind::PermissionDenied => format!("Không có quyền INSERT vào bảng {table}"),
        WriteFailureKind::Duplicate => match table {
            "tblUser" => "Tài khoản hoặc ID đã tồn tại".to_string(),
            _ => "ID nhân viên hoặc CMND đã tồn tại".to_string(),
        },
        WriteFailureKind::Timeout => "Kết nối hết thời gian chờ".to_string(),
        WriteFailureKind::Other => fallback.to_string(),
    }
}
