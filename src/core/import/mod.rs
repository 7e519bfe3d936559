//! Patient batch import
//!
//! - [`normalize`] - pure per-field rules with their fallbacks
//! - [`allocator`] - patient id and file number allocation
//! - [`summary`] - per-batch outcome and row failures
//! - [`importer`] - the batch loop

pub mod allocator;
pub mod importer;
pub mod normalize;
pub mod summary;

pub use allocator::IdentifierAllocator;
pub use importer::PatientImporter;
pub use summary::{ImportSummary, RowFailure};
