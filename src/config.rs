use std::{
    path::PathBuf,
    time::Duration,
};

use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    core::LoanError,
    persistence::{
        load_json_or_default,
        save_json,
    },
};

pub const CONFIG_FILE: &str = "config.json";

/// User-editable settings, stored as `config.json` in the app data dir.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Google Drive id of the shared model file.
    pub model_file_id: String,
    /// Where the downloaded model is written, relative to the working directory.
    pub artifact_path: PathBuf,
    /// Expected SHA-256 of the model file, hex encoded.
    pub model_sha256: Option<String>,
    /// Keep the decoded model for the rest of the session instead of
    /// downloading it again on every prediction.
    pub reuse_downloaded_model: bool,
    pub request_timeout_secs: u64,
    pub loan_term_min_months: u32,
    pub loan_term_step_months: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_file_id: String::new(),
            artifact_path: PathBuf::from("loan_model.bin"),
            model_sha256: None,
            reuse_downloaded_model: true,
            request_timeout_secs: 120,
            loan_term_min_months: 0,
            loan_term_step_months: 1,
        }
    }
}

impl AppConfig {
    pub fn load() -> Self {
        load_json_or_default(CONFIG_FILE)
    }

    pub fn save(&self) -> Result<(), LoanError> {
        save_json(self, CONFIG_FILE)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Checksum to verify against, ignoring blank entries.
    pub fn expected_sha256(&self) -> Option<&str> {
        self.model_sha256.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}
