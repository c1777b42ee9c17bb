//! Process-wide preference flags. Persisted as a small JSON document and
//! passed explicitly into the scheduler gating logic, never read ambiently.

use crate::error::AppError;
use crate::storage::json_store;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const SETTINGS_FILE_NAME: &str = "settings.json";
const SETTINGS_ENV_VAR: &str = "TASKFLOW_SETTINGS_PATH";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub onboarding_complete: bool,
    #[serde(default)]
    pub notifications_enabled: bool,
    #[serde(default)]
    pub notifications_denied: bool,
    #[serde(default = "default_true")]
    pub daily_review_enabled: bool,
    #[serde(default)]
    pub sample_task_seeded: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            onboarding_complete: false,
            notifications_enabled: false,
            notifications_denied: false,
            daily_review_enabled: true,
            sample_task_seeded: false,
        }
    }
}

fn default_true() -> bool {
    true
}

pub fn settings_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(SETTINGS_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    Ok(json_store::config_dir()?.join(SETTINGS_FILE_NAME))
}

pub fn load_settings(path: &Path) -> Result<Settings, AppError> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let content = std::fs::read_to_string(path).map_err(|err| AppError::io(err.to_string()))?;
    serde_json::from_str(&content).map_err(|err| AppError::invalid_data(err.to_string()))
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
    }

    let content = serde_json::to_string_pretty(settings)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    std::fs::write(path, content).map_err(|err| AppError::io(err.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Settings, load_settings, save_settings};
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(file_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("taskflow-{nanos}-{file_name}"))
    }

    #[test]
    fn missing_file_loads_defaults() {
        let path = temp_path("missing-settings.json");
        let settings = load_settings(&path).unwrap();

        assert!(!settings.onboarding_complete);
        assert!(!settings.notifications_enabled);
        assert!(!settings.notifications_denied);
        assert!(settings.daily_review_enabled);
        assert!(!settings.sample_task_seeded);
    }

    #[test]
    fn save_and_load_round_trip() {
        let path = temp_path("settings.json");
        let settings = Settings {
            onboarding_complete: true,
            notifications_enabled: true,
            notifications_denied: false,
            daily_review_enabled: false,
            sample_task_seeded: true,
        };

        save_settings(&path, &settings).unwrap();
        let loaded = load_settings(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded, settings);
    }

    #[test]
    fn partial_document_defaults_missing_flags() {
        let path = temp_path("partial-settings.json");
        fs::write(&path, "{\n  \"onboarding_complete\": true\n}").unwrap();

        let loaded = load_settings(&path).unwrap();
        fs::remove_file(&path).ok();

        assert!(loaded.onboarding_complete);
        assert!(loaded.daily_review_enabled);
        assert!(!loaded.notifications_enabled);
    }
}
