use crate::errors::AppError;
use crate::models::SyncConfig;
use serde::{Deserialize, Serialize};
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::{error, info};

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredSettings {
    #[serde(rename = "habit_script_url", default)]
    endpoint_url: String,
}

pub fn resolve_settings_path() -> PathBuf {
    if let Ok(path) = env::var("HABIT_CONFIG_PATH") {
        return PathBuf::from(path);
    }

    PathBuf::from("data/settings.json")
}

/// Reads the persisted endpoint. Anything unreadable means unconfigured.
pub async fn load_config(path: &Path) -> SyncConfig {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<StoredSettings>(&bytes) {
            Ok(settings) => SyncConfig::from_endpoint(&settings.endpoint_url),
            Err(err) => {
                error!("failed to parse settings file: {err}");
                SyncConfig::unconfigured()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => SyncConfig::unconfigured(),
        Err(err) => {
            error!("failed to read settings file: {err}");
            SyncConfig::unconfigured()
        }
    }
}

pub async fn save_config(path: &Path, config: &SyncConfig) -> Result<(), AppError> {
    let settings = StoredSettings {
        endpoint_url: config.endpoint_url().to_string(),
    };
    let payload = serde_json::to_vec_pretty(&settings).map_err(AppError::internal)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, payload).await?;
    info!(configured = config.is_configured(), "saved endpoint settings");
    Ok(())
}
