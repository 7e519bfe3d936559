//! Identifier allocation for one import batch
//!
//! Both counters are seeded once from the store's high-water marks and then
//! advanced in memory. Two batches running on the same day can compute the
//! same next sequence; the store's primary key turns the loser's rows into
//! row failures. Replacing this type is the only change needed to move
//! allocation into the store.

use crate::domain::ids::{FileNumber, PatientId, SequencePrefix, MAX_SEQUENCE};

/// Hands out patient ids and file numbers in strict order
#[derive(Debug, Clone)]
pub struct IdentifierAllocator {
    prefix: SequencePrefix,
    next_sequence: u32,
    next_file_number: Option<FileNumber>,
}

impl IdentifierAllocator {
    /// Seeds the allocator from the current maxima
    ///
    /// `None` for either maximum (nothing stored, or the lookup failed)
    /// starts that counter at 1.
    pub fn new(
        prefix: SequencePrefix,
        max_sequence: Option<u32>,
        max_file_number: Option<FileNumber>,
    ) -> Self {
        Self {
            prefix,
            next_sequence: max_sequence.map_or(1, |max| max.saturating_add(1)),
            next_file_number: match max_file_number {
                Some(max) => max.next(),
                None => Some(FileNumber::new(1)),
            },
        }
    }

    /// Date prefix used for synthesized ids
    pub fn prefix(&self) -> &SequencePrefix {
        &self.prefix
    }

    /// Reserves the next file number
    ///
    /// Called once per attempted row, whatever happens to the row afterwards.
    pub fn next_file_number(&mut self) -> Result<FileNumber, String> {
        let current = self
            .next_file_number
            .ok_or_else(|| "Số hồ sơ đã vượt quá giới hạn".to_string())?;
        self.next_file_number = current.next();
        Ok(current)
    }

    /// Synthesizes the next `DDMMYY` + six-digit id
    ///
    /// Once the sequence passes 999999 every call fails; the counter is not
    /// advanced further.
    pub fn next_patient_id(&mut self) -> Result<PatientId, String> {
        if self.next_sequence > MAX_SEQUENCE {
            return Err(format!(
                "Đã hết số thứ tự mã bệnh nhân cho ngày {}",
                self.prefix
            ));
        }
        let id = PatientId::synthesize(&self.prefix, self.next_sequence)?;
        self.next_sequence += 1;
        Ok(id)
    }
}
