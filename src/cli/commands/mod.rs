//! CLI command implementations

pub mod import;
pub mod init;
pub mod serve;
pub mod validate;
