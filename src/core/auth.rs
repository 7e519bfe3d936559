//! Access-key check
//!
//! Keys live in a JSON file of the form `{ "validKeys": ["...", ...] }`.
//! The file is read on every check so edits apply without a restart. Any
//! problem reading it makes every key invalid; it never fails a request.

use crate::domain::{AdminError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Serialize, Deserialize)]
struct KeyFile {
    #[serde(rename = "validKeys", default)]
    valid_keys: Vec<Value>,
}

/// Key registry backed by a JSON file
#[derive(Debug, Clone)]
pub struct KeyRegistry {
    path: PathBuf,
}

impl KeyRegistry {
    /// Registry reading `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the key file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Checks `key` against the file
    ///
    /// Both sides are trimmed. Empty or absent input is invalid.
    pub async fn is_valid(&self, key: Option<&str>) -> bool {
        let Some(key) = key.map(str::trim).filter(|k| !k.is_empty()) else {
            return false;
        };

        match self.load_keys().await {
            Ok(keys) => keys.iter().any(|k| k == key),
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "Cannot read key file");
                false
            }
        }
    }

    async fn load_keys(&self) -> Result<Vec<String>> {
        let data = tokio::fs::read_to_string(&self.path).await?;
        let file: KeyFile = serde_json::from_str(&data)?;
        Ok(file
            .valid_keys
            .into_iter()
            .map(|v| match v {
                Value::String(s) => s.trim().to_string(),
                other => other.to_string().trim().to_string(),
            })
            .collect())
    }

    /// Writes a key file holding `keys`, refusing to overwrite
    pub fn write_template(path: &Path, keys: &[String]) -> Result<()> {
        if path.exists() {
            return Err(AdminError::Io(format!(
                "Key file already exists: {}",
                path.display()
            )));
        }
        let file = KeyFile {
            valid_keys: keys.iter().cloned().map(Value::String).collect(),
        };
        std::fs::write(path, serde_json::to_string_pretty(&file)?)?;
        Ok(())
    }
}
