use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_API_URL: &str = "EMOTI_GAUGE_API_URL";
pub const ENV_PUBLIC_ORIGIN: &str = "EMOTI_GAUGE_PUBLIC_ORIGIN";
pub const ENV_DATA_DIR: &str = "EMOTI_GAUGE_DATA_DIR";

const DEFAULT_DATA_DIR: &str = ".emoti-gauge";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub api_base_url: String,
    pub public_origin: String,
    pub data_dir: String,
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub log_filter: Option<String>,
}

impl Settings {
    pub fn default_for(data_dir: &Path) -> Self {
        Self {
            api_base_url: "http://localhost:5010/api".to_string(),
            public_origin: "http://localhost:5173".to_string(),
            data_dir: data_dir.to_string_lossy().to_string(),
            request_timeout_secs: 30,
            log_filter: None,
        }
    }

    pub fn store_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("store.sqlite3")
    }

    pub fn log_filter_or_default(&self) -> String {
        self.log_filter
            .clone()
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| "emoti_gauge=info".to_string())
    }

    fn apply_env(mut self) -> Self {
        if let Some(url) = env_value(ENV_API_URL) {
            self.api_base_url = url;
        }
        if let Some(origin) = env_value(ENV_PUBLIC_ORIGIN) {
            self.public_origin = origin;
        }
        self
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Data directory: explicit argument, then environment, then `.emoti-gauge`.
pub fn resolve_data_dir(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .filter(|p| !p.as_os_str().is_empty())
        .or_else(|| env_value(ENV_DATA_DIR).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

pub fn settings_path(data_dir: &Path) -> PathBuf {
    data_dir.join("settings.json")
}

pub fn load_settings(data_dir: &Path) -> Result<Settings, String> {
    let path = settings_path(data_dir);
    if !path.exists() {
        let defaults = Settings::default_for(data_dir);
        save_settings(data_dir, &defaults)?;
        return Ok(defaults.apply_env());
    }
    let raw =
        fs::read_to_string(&path).map_err(|e| format!("Unable to read {}: {e}", path.display()))?;
    if raw.trim().is_empty() {
        let defaults = Settings::default_for(data_dir);
        save_settings(data_dir, &defaults)?;
        return Ok(defaults.apply_env());
    }
    let settings: Settings =
        serde_json::from_str(&raw).map_err(|e| format!("Invalid settings JSON: {e}"))?;
    Ok(settings.apply_env())
}

pub fn save_settings(data_dir: &Path, settings: &Settings) -> Result<(), String> {
    let path = settings_path(data_dir);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    let payload = serde_json::to_string_pretty(settings).map_err(|e| e.to_string())?;
    fs::write(&path, payload).map_err(|e| format!("Unable to write {}: {e}", path.display()))
}
