// clinic-admin - Clinic database administration backend
// Copyright (c) 2025 Clinic Admin Contributors
// Licensed under the MIT License

//! # clinic-admin
//!
//! Administrative backend for clinic SQL Server databases. It serves a small
//! web front-end and a JSON API used by clinic staff to check access keys,
//! test database connections, provision staff logins and bulk-import patient
//! records exported from spreadsheets.
//!
//! ## Overview
//!
//! This library provides:
//! - **Patient import** with per-field normalization, date-prefixed patient
//!   ids and sequential file numbers, tolerating per-row failures
//! - **Connection testing** with classified, user-facing failure messages
//! - **Staff provisioning** (`tblNhanVien` and `tblUser` rows)
//! - **Access-key checks** against a JSON key file
//! - **Ad-hoc SQL**, disabled unless configured
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`api`] - HTTP routes, handlers and response envelope
//! - [`core`] - Business logic (import, auth, connection, staff, sql)
//! - [`adapters`] - Store traits, SQL Server and in-memory implementations
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use clinic_admin::adapters::sqlserver::SqlServerConnector;
//! use clinic_admin::config::{load_config, secret_string};
//! use clinic_admin::core::import::PatientImporter;
//! use clinic_admin::domain::ConnectionDescriptor;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("clinic-admin.toml")?;
//!     let connector = SqlServerConnector::new(&config.sqlserver, &config.import);
//!     let descriptor = ConnectionDescriptor::sql_login(
//!         ".\\SQLEXPRESS",
//!         "PhongKham",
//!         "sa",
//!         secret_string("secret".into()),
//!     );
//!
//!     let records = vec![serde_json::json!({
//!         "tenbenhnhan": "Nguyễn Văn A",
//!         "gioitinh": "Nam",
//!         "namsinh": "1980",
//!         "ngayden": "05/03/2024"
//!     })];
//!
//!     let summary = PatientImporter::new(&config.import)
//!         .import(&connector, &descriptor, records)
//!         .await?;
//!
//!     println!("Imported {}/{} patients", summary.success, summary.total);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Library code returns [`domain::AdminError`]; the binary converts to
//! `anyhow` at the edge and maps failures to exit codes.
//!
//! ## Logging
//!
//! All modules log through `tracing` with structured fields. Import batches
//! run inside a span carrying their `batch_id`.

pub mod adapters;
pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
