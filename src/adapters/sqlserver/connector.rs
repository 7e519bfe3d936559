//! Session factory for SQL Server

use super::client::SqlServerClient;
use crate::adapters::database::traits::{DatabaseSession, StoreConnector};
use crate::config::{ImportConfig, SqlServerConfig};
use crate::domain::connection::ConnectionDescriptor;
use crate::domain::Result;
use async_trait::async_trait;

/// Opens a [`SqlServerClient`] per request descriptor
#[derive(Debug, Clone)]
pub struct SqlServerConnector {
    settings: SqlServerConfig,
    patient_table: String,
}

impl SqlServerConnector {
    /// Create a connector from the `sqlserver` and `import` sections
    pub fn new(settings: &SqlServerConfig, import: &ImportConfig) -> Self {
        Self {
            settings: settings.clone(),
            patient_table: import.patient_table.clone(),
        }
    }
}

#[async_trait]
impl StoreConnector for SqlServerConnector {
    async fn connect(&self, descriptor: &ConnectionDescriptor) -> Result<Box<dyn DatabaseSession>> {
        descriptor.validate()?;
        let client = SqlServerClient::connect(descriptor, &self.settings, &self.patient_table).await?;
        Ok(Box::new(client))
    }
}
