//! Init command implementation
//!
//! Writes a sample configuration file and a key file holding one freshly
//! generated access key.

use crate::core::auth::KeyRegistry;
use clap::Args;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::fs;
use std::path::Path;

const KEY_LEN: usize = 32;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "clinic-admin.toml")]
    pub output: String,

    /// Path where to create the key file
    #[arg(long, default_value = "keys.json")]
    pub keys_output: String,

    /// Overwrite an existing configuration file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing clinic-admin configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        if let Err(e) = fs::write(&self.output, Self::sample_config(&self.keys_output)) {
            println!("❌ Failed to write configuration file");
            println!("   Error: {e}");
            return Ok(5);
        }
        println!("✅ Configuration file created: {}", self.output);

        let keys_path = Path::new(&self.keys_output);
        if keys_path.exists() {
            println!("ℹ️  Key file already exists, left unchanged: {}", self.keys_output);
        } else {
            let key = generate_key();
            if let Err(e) = KeyRegistry::write_template(keys_path, &[key.clone()]) {
                println!("❌ Failed to write key file");
                println!("   Error: {e}");
                return Ok(5);
            }
            println!("✅ Key file created: {}", self.keys_output);
            println!("   Access key: {key}");
        }

        println!();
        println!("Next steps:");
        println!("  1. Edit {} with your settings", self.output);
        println!("  2. Validate configuration: clinic-admin validate-config");
        println!("  3. Start the server: clinic-admin serve");
        println!();
        Ok(0)
    }

    fn sample_config(keys_file: &str) -> String {
        format!(
            r#"# clinic-admin configuration
# Values may reference environment variables with ${{VAR}} and be overridden
# with CLINIC_<SECTION>_<KEY> (for example CLINIC_SERVER_PORT=8080).

environment = "development"  # development | staging | production

[application]
log_level = "info"

[server]
host = "0.0.0.0"
port = 3000
static_dir = "public"
shutdown_timeout_secs = 30

[auth]
keys_file = "{keys_file}"

[sqlserver]
connect_timeout_seconds = 10
request_timeout_seconds = 10
encrypt = false
trust_server_certificate = true
# Never enabled in production
allow_raw_sql = false
application_name = "clinic-admin"

[import]
patient_table = "tblBenhNhan"
placeholder_name = "Không tên"
max_rows = 5000

[logging]
local_enabled = true
local_path = "logs"
local_rotation = "daily"  # hourly | daily | never
local_max_files = 14
"#
        )
    }
}

fn generate_key() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(KEY_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_str;
    use tempfile::TempDir;

    #[test]
    fn test_sample_config_parses_and_validates() {
        let config = load_config_str(&InitArgs::sample_config("keys.json")).unwrap();
        assert_eq!(config.server.port, 3000);
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_init_writes_both_files_once() {
        let dir = TempDir::new().unwrap();
        let args = InitArgs {
            output: dir.path().join("clinic-admin.toml").display().to_string(),
            keys_output: dir.path().join("keys.json").display().to_string(),
            force: false,
        };

        assert_eq!(args.execute().await.unwrap(), 0);
        let keys = fs::read_to_string(&args.keys_output).unwrap();
        assert!(keys.contains("validKeys"));

        assert_eq!(args.execute().await.unwrap(), 2);
    }

    #[test]
    fn test_generated_keys_differ() {
        let a = generate_key();
        assert_eq!(a.len(), KEY_LEN);
        assert_ne!(a, generate_key());
    }
}
