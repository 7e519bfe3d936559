//! Database abstraction traits
//!
//! This module defines the traits a store adapter implements. A session is
//! opened per request from a [`ConnectionDescriptor`], used, and closed;
//! [`with_session`] guarantees the close on every path after the connect.

use crate::domain::connection::ConnectionDescriptor;
use crate::domain::ids::{FileNumber, SequencePrefix};
use crate::domain::patient::NormalizedPatient;
use crate::domain::staff::{AccountRow, EmployeeRow};
use crate::domain::Result;
use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::{Map, Value};

/// Identity of the server a session is connected to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    /// `@@VERSION`
    pub server_version: String,

    /// `@@SERVERNAME`
    pub server_name: String,

    /// `DB_NAME()`
    pub database_name: String,
}

/// Result of an ad-hoc statement
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlOutcome {
    /// Row-returning statement: column names and one object per row
    Rows {
        columns: Vec<String>,
        rows: Vec<Map<String, Value>>,
    },

    /// Any other statement
    Affected {
        #[serde(rename = "rowsAffected")]
        rows_affected: u64,
    },
}

/// Patient table operations used by the importer
#[async_trait]
pub trait PatientStore: Send {
    /// Highest six-digit sequence among ids starting with `prefix`
    ///
    /// # Returns
    ///
    /// `Ok(None)` when no id carries the prefix.
    async fn max_sequence_for_prefix(&mut self, prefix: &SequencePrefix) -> Result<Option<u32>>;

    /// Highest file number in the table, `Ok(None)` when the table is empty
    async fn max_file_number(&mut self) -> Result<Option<FileNumber>>;

    /// Insert one patient row
    ///
    /// # Errors
    ///
    /// Returns the store's message when the row is rejected (duplicate id,
    /// permissions, timeout).
    async fn insert_patient(&mut self, patient: &NormalizedPatient) -> Result<()>;
}

/// Staff table operations
#[async_trait]
pub trait StaffStore: Send {
    /// Insert one `tblNhanVien` row
    async fn insert_employee(&mut self, employee: &EmployeeRow) -> Result<()>;

    /// Insert one `tblUser` row
    async fn insert_account(&mut self, account: &AccountRow) -> Result<()>;
}

/// An open session against one database
#[async_trait]
pub trait DatabaseSession: PatientStore + StaffStore {
    /// Run the liveness probe and read the server identity
    async fn server_info(&mut self) -> Result<ServerInfo>;

    /// Execute caller-supplied SQL text
    async fn execute_raw(&mut self, sql: &str) -> Result<SqlOutcome>;

    /// Close the session
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Opens sessions from request descriptors
#[async_trait]
pub trait StoreConnector: Send + Sync {
    /// Connect and authenticate
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Connection`](crate::domain::AdminError::Connection)
    /// with the classified failure when the store cannot be reached.
    async fn connect(&self, descriptor: &ConnectionDescriptor) -> Result<Box<dyn DatabaseSession>>;
}

/// Runs `op` inside a session that is always closed afterwards
///
/// A failed connect returns immediately and `op` never runs. Once connected,
/// the session is closed whether `op` succeeds or fails; a failing close is
/// logged and does not mask the outcome of `op`.
///
/// # Example
///
/// ```no_run
/// use clinic_admin::adapters::database::{with_session, StoreConnector};
/// use clinic_admin::domain::{ConnectionDescriptor, Result};
///
/// # async fn example(connector: &dyn StoreConnector, descriptor: &ConnectionDescriptor) -> Result<()> {
/// let info = with_session(connector, descriptor, |session| {
///     Box::pin(async move { session.server_info().await })
/// })
/// .await?;
/// println!("{}", info.server_version);
/// # Ok(())
/// # }
/// ```
pub async fn with_session<T, F>(
    connector: &dyn StoreConnector,
    descriptor: &ConnectionDescriptor,
    op: F,
) -> Result<T>
where
    F: for<'a> FnOnce(&'a mut dyn DatabaseSession) -> BoxFuture<'a, Result<T>>,
{
    let mut session = connector.connect(descriptor).await?;
    tracing::debug!(server = %descriptor.server, database = %descriptor.database, "Session opened");

    let outcome = op(session.as_mut()).await;

    match session.close().await {
        Ok(()) => tracing::debug!(server = %descriptor.server, "Session closed"),
        Err(e) => tracing::warn!(
            server = %descriptor.server,
            error = %e,
            "Failed to close session"
        ),
    }

    outcome
}
