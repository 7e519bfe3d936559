//! Database abstraction layer
//!
//! Trait-based seams between the request handlers and the store, so the
//! same handlers run against SQL Server in production and the in-memory
//! store in tests.

pub mod memory;
pub mod traits;

pub use memory::InMemoryStore;
pub use traits::{
    with_session, DatabaseSession, PatientStore, ServerInfo, SqlOutcome, StaffStore,
    StoreConnector,
};
