use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "lms.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub storage_url: String,
    pub data_dir: PathBuf,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8000/api".into(),
            storage_url: "http://127.0.0.1:8000/storage".into(),
            data_dir: default_data_dir(),
            log_level: "info".into(),
        }
    }
}

impl Settings {
    pub fn session_database_url(&self) -> String {
        storage::session_database_url(&self.data_dir)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    api_url: Option<String>,
    storage_url: Option<String>,
    data_dir: Option<PathBuf>,
    log_level: Option<String>,
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("./data"))
        .join("lms")
}

/// Defaults, then the config file, then the process environment.
///
/// An explicitly requested file must exist; the default `lms.toml` is
/// optional.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, required) = match config_path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    match fs::read_to_string(&path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?,
        Err(err) if required => {
            return Err(err).with_context(|| format!("failed to read '{}'", path.display()));
        }
        Err(_) => {}
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.api_url {
        settings.api_url = v;
    }
    if let Some(v) = file_cfg.storage_url {
        settings.storage_url = v;
    }
    if let Some(v) = file_cfg.data_dir {
        settings.data_dir = v;
    }
    if let Some(v) = file_cfg.log_level {
        settings.log_level = v;
    }
    Ok(())
}

/// `APP__*` names win over the `LMS_*` ones when both are set.
fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("LMS_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = var("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = var("LMS_STORAGE_URL") {
        settings.storage_url = v;
    }
    if let Some(v) = var("APP__STORAGE_URL") {
        settings.storage_url = v;
    }

    if let Some(v) = var("LMS_DATA_DIR") {
        settings.data_dir = PathBuf::from(v);
    }

    if let Some(v) = var("LMS_LOG") {
        settings.log_level = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
