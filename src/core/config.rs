use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;

/// Engine settings. Loaded once at process start and passed by reference;
/// the pure engine functions never read ambient state.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    /// Rolling window after which a ledger entry stops counting.
    #[serde(default = "default_expiration_window_days")]
    pub expiration_window_days: i64,
    /// Dragonstone total at/above which a member holds elevated status.
    #[serde(default = "default_status_threshold")]
    pub status_threshold: u32,
    /// Per-entry cap applied to group-split entries before summation.
    #[serde(default = "default_split_points_cap")]
    pub split_points_cap: u32,
    /// Cadence of the expiration sweep; also the lookback of its comparison
    /// snapshot.
    #[serde(default = "default_sweep_interval_hours")]
    pub sweep_interval_hours: i64,
}

fn default_expiration_window_days() -> i64 {
    180
}

fn default_status_threshold() -> u32 {
    50
}

fn default_split_points_cap() -> u32 {
    5
}

fn default_sweep_interval_hours() -> i64 {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            expiration_window_days: default_expiration_window_days(),
            status_threshold: default_status_threshold(),
            split_points_cap: default_split_points_cap(),
            sweep_interval_hours: default_sweep_interval_hours(),
        }
    }
}

impl Settings {
    pub fn expiration_window(&self) -> Duration {
        Duration::days(self.expiration_window_days)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::hours(self.sweep_interval_hours)
    }
}

pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(app_config_dir: PathBuf) -> Self {
        Self {
            config_path: app_config_dir.join("settings.json"),
        }
    }

    pub fn load(&self) -> Settings {
        if self.config_path.exists() {
            if let Ok(content) = fs::read_to_string(&self.config_path) {
                if let Ok(settings) = serde_json::from_str(&content) {
                    return settings;
                }
            }
        }
        Settings::default()
    }

    pub fn save(&self, settings: &Settings) -> io::Result<()> {
        // Ensure directory exists
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.config_path, content)
    }
}
