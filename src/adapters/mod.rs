//! External system integrations for the clinic admin backend.
//!
//! - [`database`] - Store abstraction (traits, session scope, in-memory store)
//! - [`sqlserver`] - SQL Server implementation over TDS
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate the driver from the
//! request handlers. Handlers only see [`database::StoreConnector`] and the
//! session traits, so tests run the same code paths against
//! [`database::InMemoryStore`].
//!
//! ```rust,no_run
//! use clinic_admin::adapters::database::{with_session, StoreConnector};
//! use clinic_admin::adapters::sqlserver::SqlServerConnector;
//! use clinic_admin::config::{secret_string, ImportConfig, SqlServerConfig};
//! use clinic_admin::domain::ConnectionDescriptor;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let connector = SqlServerConnector::new(&SqlServerConfig::default(), &ImportConfig::default());
//! let descriptor =
//!     ConnectionDescriptor::sql_login(".\\SQLEXPRESS", "PhongKham", "sa", secret_string("pw".into()));
//!
//! let info = with_session(&connector, &descriptor, |session| {
//!     Box::pin(async move { session.server_info().await })
//! })
//! .await?;
//! println!("Connected to {}", info.server_name);
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod sqlserver;
