use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::FixedOffset;
use classroom_sync::sync::DEFAULT_WORKERS;
use serde::{Deserialize, Serialize};

/// Top-level application configuration. Every key is optional.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Root under which `<course>/<assignment>/<student>` folders are created.
    #[serde(default = "default_destination")]
    pub destination: PathBuf,
    /// YAML roster of students per course.
    #[serde(default = "default_roster")]
    pub roster: PathBuf,
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Offset used for the timestamps in renamed earlier copies, e.g. `+02:00`.
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,
    pub api_base_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            destination: default_destination(),
            roster: default_roster(),
            workers: default_workers(),
            utc_offset: default_utc_offset(),
            api_base_url: None,
        }
    }
}

impl AppConfig {
    pub fn offset(&self) -> Result<FixedOffset> {
        self.utc_offset
            .parse()
            .with_context(|| format!("invalid utc_offset: {}", self.utc_offset))
    }
}

fn default_destination() -> PathBuf {
    PathBuf::from(".")
}

fn default_roster() -> PathBuf {
    PathBuf::from("courses_students.yaml")
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_utc_offset() -> String {
    "+02:00".into()
}

/// Config file path: `~/.config/classroom-sync/config.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("classroom-sync").join("config.toml"))
}

/// Load config from file, falling back to defaults if missing.
pub fn load_config() -> AppConfig {
    if let Some(path) = config_path()
        && let Ok(contents) = std::fs::read_to_string(&path)
    {
        if let Ok(config) = toml::from_str::<AppConfig>(&contents) {
            return config;
        }
        eprintln!(
            "warning: failed to parse config at {}, using defaults",
            path.display()
        );
    }

    AppConfig::default()
}

/// Bearer token for the Drive API, from `CLASSROOM_SYNC_TOKEN`.
pub fn api_token() -> Option<String> {
    std::env::var("CLASSROOM_SYNC_TOKEN").ok()
}
