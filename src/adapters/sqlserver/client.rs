//! SQL Server client implementation
//!
//! One [`SqlServerClient`] is one TDS connection opened for a single request
//! and closed when the request is done. Every round trip is bounded by the
//! configured request timeout.

use super::models;
use crate::adapters::database::traits::{
    DatabaseSession, PatientStore, ServerInfo, SqlOutcome, StaffStore,
};
use crate::config::{expose, SqlServerConfig};
use crate::core::sql::returns_rows;
use crate::domain::connection::{ConnectionDescriptor, Credentials};
use crate::domain::errors::{AdminError, ConnectionFailure, ConnectionFailureKind};
use crate::domain::ids::{FileNumber, SequencePrefix};
use crate::domain::patient::NormalizedPatient;
use crate::domain::staff::{AccountRow, EmployeeRow};
use crate::domain::Result;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tiberius::{AuthMethod, Client, Config, EncryptionLevel, SqlBrowser};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

/// An open connection to one SQL Server database
pub struct SqlServerClient {
    /// TDS client
    client: Client<Compat<TcpStream>>,

    /// Per-statement time budget
    request_timeout: Duration,

    /// Patient table name (validated identifier)
    patient_table: String,
}

impl SqlServerClient {
    /// Connect and log in
    ///
    /// # Arguments
    ///
    /// * `descriptor` - Server, database and credentials from the request
    /// * `settings` - Timeouts, encryption and application name
    /// * `patient_table` - Table used by the importer
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Connection`] with the classified failure when
    /// the server cannot be reached or rejects the login.
    pub async fn connect(
        descriptor: &ConnectionDescriptor,
        settings: &SqlServerConfig,
        patient_table: &str,
    ) -> Result<Self> {
        let config = build_config(descriptor, settings)?;
        let named = descriptor.address()?.instance.is_some();
        let limit = Duration::from_secs(settings.connect_timeout_seconds);

        let client = match tokio::time::timeout(limit, open(config, named)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(ConnectionFailure::new(
                    ConnectionFailureKind::Timeout,
                    format!(
                        "Connection to {} timed out after {}s",
                        descriptor.server, settings.connect_timeout_seconds
                    ),
                )
                .into())
            }
        };

        tracing::debug!(server = %descriptor.server, database = %descriptor.database, "SQL Server login succeeded");

        Ok(Self {
            client,
            request_timeout: Duration::from_secs(settings.request_timeout_seconds),
            patient_table: patient_table.to_string(),
        })
    }
}

/// Builds the TDS configuration for a descriptor
pub fn build_config(descriptor: &ConnectionDescriptor, settings: &SqlServerConfig) -> Result<Config> {
    let address = descriptor.address()?;
    let mut config = Config::new();

    config.host(&address.host);
    if let Some(port) = address.port {
        config.port(port);
    }
    if let Some(instance) = &address.instance {
        config.instance_name(instance);
    }
    config.database(descriptor.database.trim());
    config.application_name(&settings.application_name);
    config.authentication(auth_method(descriptor.credentials()?)?);

    if settings.trust_server_certificate {
        config.trust_cert();
    }
    config.encryption(if settings.encrypt {
        EncryptionLevel::Required
    } else {
        EncryptionLevel::Off
    });

    Ok(config)
}

#[cfg(windows)]
fn auth_method(credentials: Credentials<'_>) -> Result<AuthMethod> {
    Ok(match credentials {
        Credentials::Windows => AuthMethod::Integrated,
        Credentials::SqlLogin { username, password } => AuthMethod::sql_server(username, password),
    })
}

#[cfg(not(windows))]
fn auth_method(credentials: Credentials<'_>) -> Result<AuthMethod> {
    match credentials {
        Credentials::Windows => Err(ConnectionFailure::new(
            ConnectionFailureKind::LoginFailed,
            "Windows Authentication is only available when the server runs on Windows",
        )
        .into()),
        Credentials::SqlLogin { username, password } => {
            Ok(AuthMethod::sql_server(username, password))
        }
    }
}

fn connect_failure(e: impl std::fmt::Display) -> AdminError {
    ConnectionFailure::from_message(e.to_string()).into()
}

async fn open(mut config: Config, named: bool) -> Result<Client<Compat<TcpStream>>> {
    let tcp = if named {
        TcpStream::connect_named(&config).await.map_err(connect_failure)?
    } else {
        TcpStream::connect(config.get_addr()).await.map_err(connect_failure)?
    };
    tcp.set_nodelay(true).map_err(connect_failure)?;

    match Client::connect(config.clone(), tcp.compat_write()).await {
        Ok(client) => Ok(client),
        // Azure SQL gateways answer the first login with a redirect
        Err(tiberius::error::Error::Routing { host, port }) => {
            tracing::debug!(host = %host, port, "Following SQL Server routing redirect");
            config.host(&host);
            config.port(port);
            let tcp = TcpStream::connect(config.get_addr())
                .await
                .map_err(connect_failure)?;
            tcp.set_nodelay(true).map_err(connect_failure)?;
            Client::connect(config, tcp.compat_write())
                .await
                .map_err(connect_failure)
        }
        Err(e) => Err(connect_failure(e)),
    }
}

fn database_error(e: tiberius::error::Error) -> AdminError {
    match e {
        tiberius::error::Error::Server(token) => AdminError::Database(token.message().to_string()),
        other => AdminError::Database(other.to_string()),
    }
}

/// Awaits `fut` within `limit`
async fn timed<T, F>(limit: Duration, what: &str, fut: F) -> Result<T>
where
    F: Future<Output = tiberius::Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(database_error),
        Err(_) => Err(AdminError::Timeout(format!(
            "{what} timed out after {}s",
            limit.as_secs()
        ))),
    }
}

#[async_trait]
impl PatientStore for SqlServerClient {
    async fn max_sequence_for_prefix(&mut self, prefix: &SequencePrefix) -> Result<Option<u32>> {
        let sql = models::max_sequence_query(&self.patient_table, prefix.as_str());
        let client = &mut self.client;
        let row = timed(self.request_timeout, "Sequence lookup", async move {
            client.simple_query(sql).await?.into_row().await
        })
        .await?;

        Ok(row
            .and_then(|r| r.into_iter().next())
            .and_then(|cell| models::cell_to_i64(&cell))
            .and_then(|v| u32::try_from(v).ok()))
    }

    async fn max_file_number(&mut self) -> Result<Option<FileNumber>> {
        let sql = models::max_file_number_query(&self.patient_table);
        let client = &mut self.client;
        let row = timed(self.request_timeout, "File number lookup", async move {
            client.simple_query(sql).await?.into_row().await
        })
        .await?;

        let max = row
            .and_then(|r| r.into_iter().next())
            .and_then(|cell| models::cell_to_i64(&cell));
        models::file_number_from_max(max)
    }

    async fn insert_patient(&mut self, patient: &NormalizedPatient) -> Result<()> {
        let sql = models::insert_patient_statement(&self.patient_table);
        let client = &mut self.client;
        timed(self.request_timeout, "Patient insert", async move {
            let id = patient.id.as_str();
            let file_number = patient.file_number.value();
            client
                .execute(
                    sql,
                    &[
                        &id,
                        &patient.name,
                        &patient.sex,
                        &patient.birth_year,
                        &patient.phone,
                        &patient.address,
                        &patient.arrival_date,
                        &file_number,
                    ],
                )
                .await
        })
        .await?;
        Ok(())
    }
}

#[async_trait]
impl StaffStore for SqlServerClient {
    async fn insert_employee(&mut self, employee: &EmployeeRow) -> Result<()> {
        let sql = models::insert_employee_statement();
        let client = &mut self.client;
        timed(self.request_timeout, "Employee insert", async move {
            let id = employee.id.as_str();
            client
                .execute(
                    sql,
                    &[
                        &id,
                        &employee.name,
                        &employee.birth_year,
                        &employee.sex,
                        &employee.id_card,
                        &employee.address,
                        &employee.phone,
                        &employee.position,
                        &employee.duties,
                        &employee.salary,
                        &employee.notes,
                        &employee.role_id,
                    ],
                )
                .await
        })
        .await?;
        Ok(())
    }

    async fn insert_account(&mut self, account: &AccountRow) -> Result<()> {
        let sql = models::insert_account_statement();
        let client = &mut self.client;
        timed(self.request_timeout, "Account insert", async move {
            let id = account.employee_id.as_str();
            let password = expose(&account.password);
            client
                .execute(
                    sql,
                    &[&id, &id, &account.account, &password, &account.is_admin],
                )
                .await
        })
        .await?;
        Ok(())
    }
}

#[async_trait]
impl DatabaseSession for SqlServerClient {
    async fn server_info(&mut self) -> Result<ServerInfo> {
        let client = &mut self.client;
        let row = timed(self.request_timeout, "Connection probe", async move {
            client.simple_query(models::SERVER_INFO).await?.into_row().await
        })
        .await?
        .ok_or_else(|| AdminError::Database("Connection probe returned no rows".to_string()))?;

        let text = |column: &str| {
            row.try_get::<&str, _>(column)
                .ok()
                .flatten()
                .unwrap_or_default()
                .to_string()
        };
        Ok(ServerInfo {
            server_version: text("version"),
            server_name: text("server_name"),
            database_name: text("database_name"),
        })
    }

    async fn execute_raw(&mut self, sql: &str) -> Result<SqlOutcome> {
        let client = &mut self.client;

        if returns_rows(sql) {
            let (columns, rows) = timed(self.request_timeout, "Query", async move {
                let mut stream = client.simple_query(sql).await?;
                let columns: Vec<String> = stream
                    .columns()
                    .await?
                    .map(|cols| cols.iter().map(|c| c.name().to_string()).collect())
                    .unwrap_or_default();
                let rows = stream.into_first_result().await?;
                Ok((columns, rows))
            })
            .await?;

            return Ok(SqlOutcome::Rows {
                columns,
                rows: rows.into_iter().map(models::row_to_json).collect(),
            });
        }

        let result = timed(self.request_timeout, "Statement", async move {
            client.execute(sql, &[]).await
        })
        .await?;
        Ok(SqlOutcome::Affected {
            rows_affected: result.total(),
        })
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let this = *self;
        timed(this.request_timeout, "Close", this.client.close()).await
    }
}
