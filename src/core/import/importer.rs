//! Patient batch importer
//!
//! Rows are processed strictly in input order. Each row first reserves a
//! file number, then is normalized and inserted; any failure after that
//! point is recorded against the row and the loop moves on.

use super::allocator::IdentifierAllocator;
use super::normalize::{
    normalize_arrival_date, normalize_birth_year, normalize_id, normalize_name,
    normalize_optional_text, normalize_sex,
};
use super::summary::{ImportSummary, RowFailure};
use crate::adapters::database::{with_session, PatientStore, StoreConnector};
use crate::config::ImportConfig;
use crate::domain::connection::ConnectionDescriptor;
use crate::domain::ids::SequencePrefix;
use crate::domain::patient::{NormalizedPatient, RawPatientRecord};
use crate::domain::{AdminError, Result};
use chrono::{Local, NaiveDate};
use serde_json::Value;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// Runs patient import batches
#[derive(Debug, Clone)]
pub struct PatientImporter {
    placeholder_name: String,
    max_rows: usize,
    run_date: Option<NaiveDate>,
}

impl PatientImporter {
    /// Create an importer from the `[import]` configuration
    pub fn new(config: &ImportConfig) -> Self {
        Self {
            placeholder_name: config.placeholder_name.clone(),
            max_rows: config.max_rows,
            run_date: None,
        }
    }

    /// Pin the date used for id prefixes and date fallbacks
    ///
    /// Without this the server's local date at the start of each batch is used.
    pub fn with_run_date(mut self, date: NaiveDate) -> Self {
        self.run_date = Some(date);
        self
    }

    fn today(&self) -> NaiveDate {
        self.run_date.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Rejects batches that must not reach the store
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Validation`] for an empty batch or one larger
    /// than `import.max_rows`.
    pub fn check_batch(&self, records: &[Value]) -> Result<()> {
        if records.is_empty() {
            return Err(AdminError::Validation(
                "Danh sách bệnh nhân trống".to_string(),
            ));
        }
        if records.len() > self.max_rows {
            return Err(AdminError::Validation(format!(
                "Số dòng ({}) vượt quá giới hạn {} dòng mỗi lần nhập",
                records.len(),
                self.max_rows
            )));
        }
        Ok(())
    }

    /// Validates the batch, opens a session and imports every row
    ///
    /// # Errors
    ///
    /// Validation errors are returned before any connection attempt; a
    /// connection failure is returned as-is with no row attempted. Row-level
    /// failures never surface here, they are part of the summary.
    pub async fn import(
        &self,
        connector: &dyn StoreConnector,
        descriptor: &ConnectionDescriptor,
        records: Vec<Value>,
    ) -> Result<ImportSummary> {
        self.check_batch(&records)?;
        descriptor.validate()?;

        let importer = self.clone();
        with_session(connector, descriptor, move |session| {
            Box::pin(async move { Ok(importer.run(session, records).await) })
        })
        .await
    }

    /// Imports `records` through an already-open store
    ///
    /// Never fails: lookup errors fall back to counters starting at 1 and
    /// every row-level problem is recorded in the summary.
    pub async fn run<S>(&self, store: &mut S, records: Vec<Value>) -> ImportSummary
    where
        S: PatientStore + ?Sized,
    {
        let batch_id = Uuid::new_v4();
        let span = tracing::info_span!("patient_import", batch_id = %batch_id);
        self.run_batch(batch_id, store, records)
            .instrument(span)
            .await
    }

    async fn run_batch<S>(
        &self,
        batch_id: Uuid,
        store: &mut S,
        records: Vec<Value>,
    ) -> ImportSummary
    where
        S: PatientStore + ?Sized,
    {
        let started = Instant::now();
        let today = self.today();
        let prefix = SequencePrefix::from_date(today);

        crate::log_import_start!(batch_id, records.len(), prefix);

        let max_sequence = store
            .max_sequence_for_prefix(&prefix)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, prefix = %prefix, "Sequence lookup failed, starting at 1");
                None
            });
        let max_file_number = store.max_file_number().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "File number lookup failed, starting at 1");
            None
        });
        tracing::debug!(
            ?max_sequence,
            max_file_number = ?max_file_number.map(|n| n.value()),
            "Seeded identifier counters"
        );

        let mut allocator = IdentifierAllocator::new(prefix, max_sequence, max_file_number);
        let mut summary = ImportSummary::new(batch_id, records.len());

        for (row_index, record) in records.iter().enumerate() {
            let outcome = match self.prepare_row(&mut allocator, row_index, record, today) {
                Ok(patient) => match store.insert_patient(&patient).await {
                    Ok(()) => Ok(patient),
                    Err(e) => Err(RowFailure::new(row_index, row_reason(&e))),
                },
                Err(failure) => Err(failure),
            };

            match outcome {
                Ok(patient) => {
                    tracing::trace!(
                        row_index,
                        patient_id = %patient.id,
                        file_number = %patient.file_number,
                        "Patient row inserted"
                    );
                    summary.add_success();
                }
                Err(failure) => {
                    crate::log_row_failure!(batch_id, row_index, failure.reason);
                    summary.add_failure(failure);
                }
            }
        }

        let summary = summary.with_duration(started.elapsed());
        summary.log_summary();
        summary
    }

    /// Reserves identifiers for one row and normalizes it
    ///
    /// The file number is taken first so that a row failing for any later
    /// reason still consumes exactly one.
    fn prepare_row(
        &self,
        allocator: &mut IdentifierAllocator,
        row_index: usize,
        record: &Value,
        today: NaiveDate,
    ) -> std::result::Result<NormalizedPatient, RowFailure> {
        let file_number = allocator
            .next_file_number()
            .map_err(|reason| RowFailure::new(row_index, reason))?;

        let raw = RawPatientRecord::from_value(record)
            .map_err(|reason| RowFailure::new(row_index, reason))?;

        let id = match normalize_id(raw.id.as_deref()) {
            Some(id) => id,
            None => allocator
                .next_patient_id()
                .map_err(|reason| RowFailure::new(row_index, reason))?,
        };

        Ok(NormalizedPatient {
            id,
            name: normalize_name(raw.name.as_deref(), &self.placeholder_name),
            sex: normalize_sex(raw.sex.as_deref()),
            birth_year: normalize_birth_year(raw.birth_year.as_deref(), today),
            arrival_date: normalize_arrival_date(raw.arrival_date.as_deref(), today),
            file_number,
            phone: normalize_optional_text(raw.phone.as_deref()),
            address: normalize_optional_text(raw.address.as_deref()),
        })
    }
}

/// The store's own message when there is one
fn row_reason(error: &AdminError) -> String {
    error
        .store_detail()
        .map(str::to_string)
        .unwrap_or_else(|| error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::database::InMemoryStore;
    use crate::domain::ids::{FileNumber, PatientId};
    use serde_json::json;

    fn run_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()
    }

    fn importer() -> PatientImporter {
        PatientImporter::new(&ImportConfig::default()).with_run_date(run_date())
    }

    #[tokio::test]
    async fn test_synthesizes_id_for_malformed_input() {
        let mut store = InMemoryStore::new();
        let summary = importer()
            .run(&mut store, vec![json!({"idbenhnhan": "abc", "gioitinh": "Nam"})])
            .await;

        assert_eq!(summary.success, 1);
        let patients = store.patients();
        assert_eq!(patients[0].id.as_str(), "100125000001");
        assert_eq!(patients[0].sex, 1);
        assert_eq!(patients[0].file_number, FileNumber::new(1));
        assert_eq!(patients[0].arrival_date, run_date());
        assert_eq!(patients[0].birth_year, "2025");
    }

    #[tokio::test]
    async fn test_keeps_well_formed_id_without_consuming_sequence() {
        let mut store = InMemoryStore::new();
        let summary = importer()
            .run(
                &mut store,
                vec![json!({"idbenhnhan": "010124000123"}), json!({"tenbenhnhan": "B"})],
            )
            .await;

        assert_eq!(summary.success, 2);
        let ids: Vec<_> = store.patients().into_iter().map(|p| p.id).collect();
        assert_eq!(
            ids,
            vec![
                PatientId::new("010124000123").unwrap(),
                PatientId::new("100125000001").unwrap()
            ]
        );
    }

    #[tokio::test]
    async fn test_non_object_row_fails_but_reserves_file_number() {
        let mut store = InMemoryStore::new();
        let summary = importer()
            .run(&mut store, vec![json!({}), json!(42), json!({})])
            .await;

        assert_eq!(summary.success, 2);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.failures[0].row_index, 1);

        let files: Vec<_> = store.patients().iter().map(|p| p.file_number.value()).collect();
        assert_eq!(files, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_lookup_failure_starts_counters_at_one() {
        let mut store = InMemoryStore::new();
        store.fail_lookups("Invalid object name 'tblBenhNhan'.");

        let summary = importer().run(&mut store, vec![json!({})]).await;

        assert_eq!(summary.success, 1);
        assert_eq!(store.patients()[0].id.sequence(), 1);
        assert_eq!(store.patients()[0].file_number, FileNumber::new(1));
    }

    #[test]
    fn test_check_batch_limits() {
        let importer = PatientImporter::new(&ImportConfig {
            max_rows: 2,
            ..ImportConfig::default()
        });

        assert!(importer.check_batch(&[]).is_err());
        assert!(importer.check_batch(&[json!({}), json!({})]).is_ok());
        assert!(matches!(
            importer.check_batch(&[json!({}), json!({}), json!({})]),
            Err(AdminError::Validation(_))
        ));
    }
}
