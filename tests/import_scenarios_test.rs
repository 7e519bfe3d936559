//! Integration tests for patient batch imports
//!
//! These tests run the importer end to end against the in-memory store and
//! check the batch-level guarantees:
//! - Every row is accounted for as a success or a failure
//! - Synthesized ids carry the run date and increase strictly
//! - File numbers increase strictly, including across failed rows
//! - Batches that cannot run never open a session

use chrono::NaiveDate;
use clinic_admin::adapters::database::InMemoryStore;
use clinic_admin::config::{secret_string, ImportConfig};
use clinic_admin::core::import::PatientImporter;
use clinic_admin::domain::{AdminError, ConnectionDescriptor, FileNumber, NormalizedPatient, PatientId};
use fake::faker::name::en::Name;
use fake::Fake;
use serde_json::{json, Value};

fn run_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()
}

fn importer() -> PatientImporter {
    PatientImporter::new(&ImportConfig::default()).with_run_date(run_date())
}

fn descriptor() -> ConnectionDescriptor {
    ConnectionDescriptor::sql_login("memory", "PhongKham", "sa", secret_string("pw".into()))
}

fn fake_rows(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            let name: String = Name().fake();
            json!({
                "tenbenhnhan": name,
                "gioitinh": if i % 2 == 0 { "Nam" } else { "Nữ" },
                "namsinh": 1950 + i as i64,
                "ngayden": "05/03/2024",
            })
        })
        .collect()
}

#[tokio::test]
async fn test_every_row_is_accounted_for() {
    let store = InMemoryStore::new();
    let mut rows = fake_rows(5);
    rows.insert(2, json!("not an object"));
    rows.push(Value::Null);

    let summary = importer()
        .import(&store, &descriptor(), rows)
        .await
        .unwrap();

    assert_eq!(summary.total, 7);
    assert_eq!(summary.success, 5);
    assert_eq!(summary.failed(), 2);
    assert_eq!(summary.success + summary.failed(), summary.total);
    assert_eq!(store.patients().len(), 5);
    assert_eq!(store.session_counts(), (1, 1));

    let lines = summary.error_lines().unwrap();
    assert!(lines[0].starts_with("Dòng 4: "));
    assert!(lines[1].starts_with("Dòng 8: "));
}

#[tokio::test]
async fn test_synthesized_ids_use_run_date_and_increase() {
    let store = InMemoryStore::new();
    let summary = importer()
        .import(&store, &descriptor(), fake_rows(20))
        .await
        .unwrap();
    assert!(summary.is_successful());

    let patients = store.patients();
    for patient in &patients {
        assert_eq!(patient.id.as_str().len(), 12);
        assert_eq!(patient.id.prefix(), "100125");
    }
    for pair in patients.windows(2) {
        assert!(pair[0].id.sequence() < pair[1].id.sequence());
        assert!(pair[0].file_number < pair[1].file_number);
    }
    assert_eq!(patients[0].id.as_str(), "100125000001");
    assert_eq!(patients[19].file_number, FileNumber::new(20));
}

#[tokio::test]
async fn test_numbering_continues_from_existing_rows() {
    let store = InMemoryStore::new();
    store.seed_patient(NormalizedPatient {
        id: PatientId::new("100125000041").unwrap(),
        name: "Existing".to_string(),
        sex: 1,
        birth_year: "1970".to_string(),
        arrival_date: run_date(),
        file_number: FileNumber::new(900),
        phone: None,
        address: None,
    });

    importer()
        .import(&store, &descriptor(), fake_rows(2))
        .await
        .unwrap();

    let patients = store.patients();
    assert_eq!(patients[1].id.as_str(), "100125000042");
    assert_eq!(patients[1].file_number, FileNumber::new(901));
    assert_eq!(patients[2].id.as_str(), "100125000043");
    assert_eq!(patients[2].file_number, FileNumber::new(902));
}

#[tokio::test]
async fn test_duplicate_supplied_id_fails_only_that_row() {
    let store = InMemoryStore::new();
    let rows = vec![
        json!({"idbenhnhan": "010124000001", "tenbenhnhan": "A"}),
        json!({"idbenhnhan": "010124000001", "tenbenhnhan": "B"}),
        json!({"tenbenhnhan": "C"}),
    ];

    let summary = importer().import(&store, &descriptor(), rows).await.unwrap();

    assert_eq!(summary.success, 2);
    let lines = summary.error_lines().unwrap();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("Dòng 3: "));
    assert!(lines[0].contains("PRIMARY KEY"));

    // The failed row still consumed file number 2
    let patients = store.patients();
    assert_eq!(patients[1].name, "C");
    assert_eq!(patients[1].id.as_str(), "100125000001");
    assert_eq!(patients[1].file_number, FileNumber::new(3));
}

#[tokio::test]
async fn test_lookup_failure_starts_counters_at_one() {
    let store = InMemoryStore::new();
    store.fail_lookups("Invalid object name 'tblBenhNhan'.");

    let summary = importer()
        .import(&store, &descriptor(), fake_rows(1))
        .await
        .unwrap();

    assert_eq!(summary.success, 1);
    let patients = store.patients();
    assert_eq!(patients[0].id.as_str(), "100125000001");
    assert_eq!(patients[0].file_number, FileNumber::new(1));
}

#[tokio::test]
async fn test_empty_batch_never_connects() {
    let store = InMemoryStore::new();
    let err = importer()
        .import(&store, &descriptor(), Vec::new())
        .await
        .unwrap_err();

    assert!(matches!(err, AdminError::Validation(_)));
    assert_eq!(store.session_counts(), (0, 0));
}

#[tokio::test]
async fn test_oversized_batch_never_connects() {
    let store = InMemoryStore::new();
    let config = ImportConfig {
        max_rows: 3,
        ..ImportConfig::default()
    };
    let err = PatientImporter::new(&config)
        .import(&store, &descriptor(), fake_rows(4))
        .await
        .unwrap_err();

    assert!(matches!(err, AdminError::Validation(_)));
    assert_eq!(store.session_counts(), (0, 0));
}

#[tokio::test]
async fn test_connection_failure_attempts_no_rows() {
    let store = InMemoryStore::new();
    store.fail_connect("Login failed for user 'sa'.");

    let err = importer()
        .import(&store, &descriptor(), fake_rows(3))
        .await
        .unwrap_err();

    assert!(matches!(err, AdminError::Connection(_)));
    assert!(store.patients().is_empty());
}

#[tokio::test]
async fn test_store_rejection_is_reported_per_row() {
    let store = InMemoryStore::new();
    store.reject_patient_named(
        "Bad",
        "String or binary data would be truncated.\r\nThe statement has been terminated.",
    );
    let rows = vec![json!({"tenbenhnhan": "Good"}), json!({"tenbenhnhan": "Bad"})];

    let summary = importer().import(&store, &descriptor(), rows).await.unwrap();

    assert_eq!(summary.success, 1);
    let lines = summary.error_lines().unwrap();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("Dòng 3: String or binary data would be truncated."));
    assert!(!lines[0].contains('\n'));
}
