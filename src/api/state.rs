//! Shared handler state

use crate::adapters::database::StoreConnector;
use crate::adapters::sqlserver::SqlServerConnector;
use crate::config::AppConfig;
use crate::core::auth::KeyRegistry;
use crate::core::import::PatientImporter;
use std::sync::Arc;

/// State cloned into every handler
#[derive(Clone)]
pub struct AppState {
    /// Opens store sessions from request descriptors
    pub connector: Arc<dyn StoreConnector>,

    /// Access keys
    pub keys: KeyRegistry,

    /// Patient importer
    pub importer: PatientImporter,

    /// Whether `/api/execute-sql` runs statements
    pub allow_raw_sql: bool,
}

impl AppState {
    /// State for a running server, backed by SQL Server
    pub fn from_config(config: &AppConfig) -> Self {
        let connector = SqlServerConnector::new(&config.sqlserver, &config.import);
        Self::with_connector(config, Arc::new(connector))
    }

    /// State using an arbitrary connector
    pub fn with_connector(config: &AppConfig, connector: Arc<dyn StoreConnector>) -> Self {
        Self {
            connector,
            keys: KeyRegistry::new(config.auth.keys_file.clone()),
            importer: PatientImporter::new(&config.import),
            allow_raw_sql: config.sqlserver.allow_raw_sql,
        }
    }
}
