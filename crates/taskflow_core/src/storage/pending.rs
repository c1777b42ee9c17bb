//! Persisted registry of scheduled notification requests. This is the
//! stand-in for the platform's pending-notification center: scheduling
//! records a request here, `deliver_due` fires the ones that have come due.

use crate::error::AppError;
use crate::storage::json_store;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SCHEMA_VERSION: u32 = 1;
const PENDING_FILE_NAME: &str = "pending.json";
const PENDING_ENV_VAR: &str = "TASKFLOW_PENDING_PATH";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trigger {
    /// Fires exactly once at the given RFC 3339 instant.
    OneShot { fire_at: String },
    /// Fires every day at `hour:minute` local time. `last_fired` holds the
    /// date of the most recent delivery so a day fires at most once.
    Daily {
        hour: u8,
        minute: u8,
        #[serde(default)]
        last_fired: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRequest {
    pub id: String,
    pub title: String,
    pub body: String,
    pub trigger: Trigger,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredPending {
    schema_version: u32,
    requests: Vec<PendingRequest>,
}

pub fn pending_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(PENDING_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    Ok(json_store::config_dir()?.join(PENDING_FILE_NAME))
}

pub fn load_requests(path: &Path) -> Result<Vec<PendingRequest>, AppError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path).map_err(|err| AppError::io(err.to_string()))?;
    let stored: StoredPending =
        serde_json::from_str(&content).map_err(|err| AppError::invalid_data(err.to_string()))?;

    if !(1..=SCHEMA_VERSION).contains(&stored.schema_version) {
        return Err(AppError::invalid_data("schema_version mismatch"));
    }

    Ok(stored.requests)
}

pub fn save_requests(path: &Path, requests: &[PendingRequest]) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
    }

    let stored = StoredPending {
        schema_version: SCHEMA_VERSION,
        requests: requests.to_vec(),
    };
    let content = serde_json::to_string_pretty(&stored)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    std::fs::write(path, content).map_err(|err| AppError::io(err.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions).map_err(|err| AppError::io(err.to_string()))?;
    }

    Ok(())
}
