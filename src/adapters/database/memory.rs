//! In-memory store
//!
//! Implements every store trait over shared in-process state. Handles are
//! cheap clones of one `Arc`, so a test can hand one to the HTTP layer as
//! the connector and inspect the same data afterwards. Failures can be
//! injected to exercise the error paths without a SQL Server.

use super::traits::{
    DatabaseSession, PatientStore, ServerInfo, SqlOutcome, StaffStore, StoreConnector,
};
use crate::domain::connection::ConnectionDescriptor;
use crate::domain::errors::{AdminError, ConnectionFailure};
use crate::domain::ids::{FileNumber, SequencePrefix};
use crate::domain::patient::NormalizedPatient;
use crate::domain::staff::{AccountRow, EmployeeRow};
use crate::domain::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct MemoryState {
    patients: Vec<NormalizedPatient>,
    employees: Vec<EmployeeRow>,
    accounts: Vec<AccountRow>,
    executed_sql: Vec<String>,
    raw_sql_outcome: Option<SqlOutcome>,
    connect_failure: Option<String>,
    lookup_failure: Option<String>,
    rejected_names: HashMap<String, String>,
    sessions_opened: usize,
    sessions_closed: usize,
}

/// Shared in-memory database
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<MemoryState>>,
}

impl InMemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds an existing patient row without going through an import
    pub fn seed_patient(&self, patient: NormalizedPatient) {
        self.state().patients.push(patient);
    }

    /// Makes every connect attempt fail with `message`
    pub fn fail_connect(&self, message: impl Into<String>) {
        self.state().connect_failure = Some(message.into());
    }

    /// Makes both high-water-mark lookups fail with `message`
    pub fn fail_lookups(&self, message: impl Into<String>) {
        self.state().lookup_failure = Some(message.into());
    }

    /// Rejects inserts of patients named `name` with `message`
    pub fn reject_patient_named(&self, name: impl Into<String>, message: impl Into<String>) {
        self.state()
            .rejected_names
            .insert(name.into(), message.into());
    }

    /// Sets what the next raw statements return
    pub fn set_raw_sql_outcome(&self, outcome: SqlOutcome) {
        self.state().raw_sql_outcome = Some(outcome);
    }

    /// Stored patients, in insertion order
    pub fn patients(&self) -> Vec<NormalizedPatient> {
        self.state().patients.clone()
    }

    /// Stored employees
    pub fn employees(&self) -> Vec<EmployeeRow> {
        self.state().employees.clone()
    }

    /// Stored accounts
    pub fn accounts(&self) -> Vec<AccountRow> {
        self.state().accounts.clone()
    }

    /// Raw statements received, in order
    pub fn executed_sql(&self) -> Vec<String> {
        self.state().executed_sql.clone()
    }

    /// `(opened, closed)` session counts
    pub fn session_counts(&self) -> (usize, usize) {
        let state = self.state();
        (state.sessions_opened, state.sessions_closed)
    }
}

fn duplicate_key(table: &str, key: &str) -> AdminError {
    AdminError::Database(format!(
        "Violation of PRIMARY KEY constraint 'PK_{table}'. Cannot insert duplicate key in object 'dbo.{table}'. The duplicate key value is ({key})."
    ))
}

#[async_trait]
impl PatientStore for InMemoryStore {
    async fn max_sequence_for_prefix(&mut self, prefix: &SequencePrefix) -> Result<Option<u32>> {
        let state = self.state();
        if let Some(message) = &state.lookup_failure {
            return Err(AdminError::Database(message.clone()));
        }
        Ok(state
            .patients
            .iter()
            .filter(|p| p.id.prefix() == prefix.as_str())
            .map(|p| p.id.sequence())
            .max())
    }

    async fn max_file_number(&mut self) -> Result<Option<FileNumber>> {
        let state = self.state();
        if let Some(message) = &state.lookup_failure {
            return Err(AdminError::Database(message.clone()));
        }
        Ok(state.patients.iter().map(|p| p.file_number).max())
    }

    async fn insert_patient(&mut self, patient: &NormalizedPatient) -> Result<()> {
        let mut state = self.state();
        if let Some(message) = state.rejected_names.get(&patient.name) {
            return Err(AdminError::Database(message.clone()));
        }
        if state.patients.iter().any(|p| p.id == patient.id) {
            return Err(duplicate_key("tblBenhNhan", patient.id.as_str()));
        }
        state.patients.push(patient.clone());
        Ok(())
    }
}

#[async_trait]
impl StaffStore for InMemoryStore {
    async fn insert_employee(&mut self, employee: &EmployeeRow) -> Result<()> {
        let mut state = self.state();
        if state.employees.iter().any(|e| e.id == employee.id) {
            return Err(duplicate_key("tblNhanVien", employee.id.as_str()));
        }
        state.employees.push(employee.clone());
        Ok(())
    }

    async fn insert_account(&mut self, account: &AccountRow) -> Result<()> {
        let mut state = self.state();
        if state.accounts.iter().any(|a| {
            a.employee_id == account.employee_id || a.account == account.account
        }) {
            return Err(duplicate_key("tblUser", account.employee_id.as_str()));
        }
        state.accounts.push(account.clone());
        Ok(())
    }
}

#[async_trait]
impl DatabaseSession for InMemoryStore {
    async fn server_info(&mut self) -> Result<ServerInfo> {
        Ok(ServerInfo {
            server_version: "In-memory store".to_string(),
            server_name: "memory".to_string(),
            database_name: "memory".to_string(),
        })
    }

    async fn execute_raw(&mut self, sql: &str) -> Result<SqlOutcome> {
        let mut state = self.state();
        state.executed_sql.push(sql.to_string());
        Ok(state
            .raw_sql_outcome
            .clone()
            .unwrap_or(SqlOutcome::Affected { rows_affected: 0 }))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.state().sessions_closed += 1;
        Ok(())
    }
}

#[async_trait]
impl StoreConnector for InMemoryStore {
    async fn connect(&self, descriptor: &ConnectionDescriptor) -> Result<Box<dyn DatabaseSession>> {
        descriptor.validate()?;
        let mut state = self.state();
        if let Some(message) = &state.connect_failure {
            return Err(ConnectionFailure::from_message(message.clone()).into());
        }
        state.sessions_opened += 1;
        drop(state);
        Ok(Box::new(self.clone()))
    }
}
