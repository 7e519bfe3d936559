//! Import summary and reporting
//!
//! This module defines structures for tracking and reporting the outcome of
//! one patient import batch.

use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Rows are numbered for users as they appear in the source spreadsheet:
/// 1-based, with the header occupying the first line.
pub const HEADER_OFFSET: usize = 2;

/// A row that could not be imported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFailure {
    /// Zero-based position in the submitted batch
    pub row_index: usize,

    /// Single-line reason
    pub reason: String,
}

impl RowFailure {
    /// Create a row failure, collapsing the reason onto one line
    pub fn new(row_index: usize, reason: impl AsRef<str>) -> Self {
        Self {
            row_index,
            reason: single_line(reason.as_ref()),
        }
    }

    /// Line number shown to users
    pub fn display_row(&self) -> usize {
        self.row_index + HEADER_OFFSET
    }
}

impl fmt::Display for RowFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dòng {}: {}", self.display_row(), self.reason)
    }
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Summary of an import batch
#[derive(Debug, Clone)]
pub struct ImportSummary {
    /// Batch correlation id (also on every log line of the batch)
    pub batch_id: Uuid,

    /// Rows submitted
    pub total: usize,

    /// Rows inserted
    pub success: usize,

    /// Rows that failed, in input order
    pub failures: Vec<RowFailure>,

    /// Wall-clock time spent on the batch
    pub duration: Duration,
}

impl ImportSummary {
    /// Create an empty summary for a batch of `total` rows
    pub fn new(batch_id: Uuid, total: usize) -> Self {
        Self {
            batch_id,
            total,
            success: 0,
            failures: Vec::new(),
            duration: Duration::from_secs(0),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Record an inserted row
    pub fn add_success(&mut self) {
        self.success += 1;
    }

    /// Record a failed row
    pub fn add_failure(&mut self, failure: RowFailure) {
        self.failures.push(failure);
    }

    /// Number of failed rows
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Check if every row was inserted
    pub fn is_successful(&self) -> bool {
        self.failures.is_empty()
    }

    /// User-facing failure lines, or `None` when nothing failed
    pub fn error_lines(&self) -> Option<Vec<String>> {
        if self.failures.is_empty() {
            None
        } else {
            Some(self.failures.iter().map(ToString::to_string).collect())
        }
    }

    /// Log the summary
    pub fn log_summary(&self) {
        crate::log_import_complete!(
            self.batch_id,
            self.total,
            self.success,
            self.failed(),
            self.duration
        );

        if !self.failures.is_empty() {
            tracing::warn!(
                batch_id = %self.batch_id,
                error_count = self.failures.len(),
                "Patient import completed with errors"
            );
        }
    }
}
