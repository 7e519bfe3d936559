//! SQL Server integration
//!
//! Sessions are plain TDS connections (`tiberius` over a tokio TCP stream)
//! opened from the descriptor each request carries.

pub mod client;
pub mod connector;
pub mod models;

pub use client::SqlServerClient;
pub use connector::SqlServerConnector;
