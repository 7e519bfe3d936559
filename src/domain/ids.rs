//! Domain identifier types with validation
//!
//! Newtype wrappers for the identifiers the clinic schema uses. Each type
//! guarantees its textual format at construction time.

use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of digits in the variable part of a synthesized patient id
pub const SEQUENCE_DIGITS: usize = 6;

/// Largest sequence number that still fits in [`SEQUENCE_DIGITS`] digits
pub const MAX_SEQUENCE: u32 = 999_999;

fn is_ascii_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

/// Patient identifier: exactly 12 ASCII digits
///
/// Synthesized ids are `DDMMYY` followed by a zero-padded 6-digit sequence.
///
/// # Examples
///
/// ```
/// use clinic_admin::domain::ids::{PatientId, SequencePrefix};
/// use chrono::NaiveDate;
///
/// let prefix = SequencePrefix::from_date(NaiveDate::from_ymd_opt(2025, 1, 10).unwrap());
/// let id = PatientId::synthesize(&prefix, 1).unwrap();
/// assert_eq!(id.as_str(), "100125000001");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PatientId(String);

impl PatientId {
    /// Creates a patient id from an existing 12-digit string
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if !is_ascii_digits(&id, 12) {
            return Err(format!("Patient ID must be exactly 12 digits, got: {id}"));
        }
        Ok(Self(id))
    }

    /// Builds `prefix + zero-padded sequence`
    ///
    /// # Errors
    ///
    /// Returns an error if the sequence is 0 or does not fit in six digits.
    pub fn synthesize(prefix: &SequencePrefix, sequence: u32) -> Result<Self, String> {
        if sequence == 0 || sequence > MAX_SEQUENCE {
            return Err(format!(
                "Sequence {sequence} is outside 1..={MAX_SEQUENCE} for prefix {prefix}"
            ));
        }
        Ok(Self(format!(
            "{}{:0width$}",
            prefix.as_str(),
            sequence,
            width = SEQUENCE_DIGITS
        )))
    }

    /// Returns the `DDMMYY` part
    pub fn prefix(&self) -> &str {
        &self.0[..6]
    }

    /// Returns the numeric sequence part (positions 7-12)
    pub fn sequence(&self) -> u32 {
        // Twelve ASCII digits are guaranteed by construction
        self.0[6..].parse().unwrap_or(0)
    }

    /// Returns the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PatientId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for PatientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The `DDMMYY` prefix derived from a calendar date
///
/// Built only from the server clock, never from request data, which is what
/// allows the seed query to embed it in SQL text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SequencePrefix(String);

impl SequencePrefix {
    /// Derives the prefix for a date
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.format("%d%m%y").to_string())
    }

    /// Returns the prefix as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SequencePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store-wide file number ("số hồ sơ")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileNumber(i32);

impl FileNumber {
    /// Wraps a raw file number
    pub fn new(value: i32) -> Self {
        Self(value)
    }

    /// Returns the raw value
    pub fn value(&self) -> i32 {
        self.0
    }

    /// Returns the following file number, if representable
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for FileNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Employee identifier: 12 ASCII digits, randomly generated
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmployeeId(String);

impl EmployeeId {
    /// Creates an employee id from an existing 12-digit string
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if !is_ascii_digits(&id, 12) {
            return Err(format!("Employee ID must be exactly 12 digits, got: {id}"));
        }
        Ok(Self(id))
    }

    /// Generates a random zero-padded 12-digit id
    pub fn random() -> Self {
        let n: u64 = rand::thread_rng().gen_range(0..1_000_000_000_000);
        Self(format!("{n:012}"))
    }

    /// Returns the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EmployeeId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
