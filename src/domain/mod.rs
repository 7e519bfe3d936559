//! Domain models and types for the clinic admin backend.
//!
//! This module contains the types every other layer shares: validated
//! identifiers, patient and staff records, the connection descriptor sent by
//! the front-end, and the error hierarchy.
//!
//! # Type Safety
//!
//! Identifiers use the newtype pattern so a patient id can never be passed
//! where an employee id is expected:
//!
//! ```rust
//! use clinic_admin::domain::{EmployeeId, PatientId};
//!
//! # fn example() -> Result<(), String> {
//! let patient = PatientId::new("100125000001")?;
//! let employee = EmployeeId::new("000000000042")?;
//!
//! // let wrong: EmployeeId = patient;  // Compile error!
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, AdminError>`]:
//!
//! ```rust
//! use clinic_admin::domain::Result;
//!
//! fn example() -> Result<()> {
//!     let config = clinic_admin::config::load_config("clinic-admin.toml")?;
//!     Ok(())
//! }
//! ```

pub mod connection;
pub mod errors;
pub mod ids;
pub mod patient;
pub mod result;
pub mod staff;

// Re-export commonly used types for convenience
pub use connection::{ConnectionDescriptor, Credentials, ServerAddress};
pub use errors::{AdminError, ConnectionFailure, ConnectionFailureKind, WriteFailureKind};
pub use ids::{EmployeeId, FileNumber, PatientId, SequencePrefix};
pub use patient::{NormalizedPatient, RawPatientRecord};
pub use result::Result;
pub use staff::{AccountRow, EmployeeRow, NewAccount, NewEmployee};
