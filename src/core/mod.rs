//! Core business logic for the clinic admin backend.
//!
//! # Modules
//!
//! - [`import`] - Patient batch import (normalization, id allocation, summary)
//! - [`auth`] - Access-key check against the key file
//! - [`connection`] - Connection testing
//! - [`staff`] - Employee and login provisioning
//! - [`sql`] - Ad-hoc SQL execution
//! - [`locale_script`] - Vietnamese locale setup script
//!
//! Every operation that touches the store opens its own session through
//! [`with_session`](crate::adapters::database::with_session) and closes it
//! before returning.
//!
//! # Example
//!
//! ```rust,no_run
//! use clinic_admin::adapters::database::InMemoryStore;
//! use clinic_admin::config::{secret_string, ImportConfig};
//! use clinic_admin::core::import::PatientImporter;
//! use clinic_admin::domain::ConnectionDescriptor;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryStore::new();
//! let descriptor =
//!     ConnectionDescriptor::sql_login("localhost", "PhongKham", "sa", secret_string("pw".into()));
//!
//! let importer = PatientImporter::new(&ImportConfig::default());
//! let summary = importer
//!     .import(&store, &descriptor, vec![serde_json::json!({"tenbenhnhan": "Nguyễn Văn A"})])
//!     .await?;
//!
//! println!("Imported {}/{}", summary.success, summary.total);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod connection;
pub mod import;
pub mod locale_script;
pub mod sql;
pub mod staff;
