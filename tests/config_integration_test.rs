//! Integration tests for configuration loading

use clinic_admin::config::{load_config, AppConfig, Environment};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Tests touching CLINIC_* variables must not interleave
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_defaults() {
    let config = AppConfig::default();
    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.import.patient_table, "tblBenhNhan");
    assert!(!config.sqlserver.allow_raw_sql);
    assert!(config.validate().is_ok());
}

#[test]
fn test_full_file() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let file = write_config(
        r#"
environment = "staging"

[application]
log_level = "debug"

[server]
host = "127.0.0.1"
port = 8080
static_dir = "public"
shutdown_timeout_secs = 5

[auth]
keys_file = "/etc/clinic/keys.json"

[sqlserver]
connect_timeout_seconds = 20
request_timeout_seconds = 60
encrypt = true
trust_server_certificate = false
allow_raw_sql = true

[import]
patient_table = "tblBenhNhan_Test"
placeholder_name = "Chưa rõ"
max_rows = 100

[logging]
local_enabled = false
local_rotation = "hourly"
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.environment, Environment::Staging);
    assert_eq!(config.server.bind_address(), "127.0.0.1:8080");
    assert_eq!(config.auth.keys_file, PathBuf::from("/etc/clinic/keys.json"));
    assert_eq!(config.sqlserver.request_timeout_seconds, 60);
    assert!(config.sqlserver.allow_raw_sql);
    assert_eq!(config.import.patient_table, "tblBenhNhan_Test");
    assert_eq!(config.import.max_rows, 100);
    assert!(!config.logging.local_enabled);
}

#[test]
fn test_raw_sql_refused_in_production() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let file = write_config(
        r#"
environment = "production"

[sqlserver]
allow_raw_sql = true
"#,
    );

    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("allow_raw_sql"));
}

#[test]
fn test_unsafe_table_name_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let file = write_config("[import]\npatient_table = \"tblBenhNhan; DROP TABLE x\"\n");
    assert!(load_config(file.path()).is_err());
}

#[test]
fn test_env_substitution_and_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    std::env::set_var("CLINIC_TEST_KEYS_PATH", "/run/secrets/keys.json");
    std::env::set_var("CLINIC_SERVER_PORT", "9090");
    std::env::set_var("CLINIC_IMPORT_PLACEHOLDER_NAME", "Vô danh");

    let file = write_config(
        r#"
[server]
port = 3000

[auth]
keys_file = "${CLINIC_TEST_KEYS_PATH}"
"#,
    );
    let result = load_config(file.path());

    std::env::remove_var("CLINIC_TEST_KEYS_PATH");
    std::env::remove_var("CLINIC_SERVER_PORT");
    std::env::remove_var("CLINIC_IMPORT_PLACEHOLDER_NAME");

    let config = result.unwrap();
    assert_eq!(config.auth.keys_file, PathBuf::from("/run/secrets/keys.json"));
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.import.placeholder_name, "Vô danh");
}

#[test]
fn test_bad_override_is_an_error() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    std::env::set_var("CLINIC_SERVER_PORT", "not-a-port");

    let file = write_config("");
    let result = load_config(file.path());

    std::env::remove_var("CLINIC_SERVER_PORT");
    let err = result.unwrap_err();
    assert!(err.to_string().contains("CLINIC_SERVER_PORT"));
}
