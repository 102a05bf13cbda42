use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::env;

/// Chain constants used by the reward/APR compute services.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ComputeSettings {
    #[serde(default = "default_blocks_per_day")]
    pub blocks_per_day: u64,
    #[serde(default = "default_days_per_year")]
    pub days_per_year: u64,
    #[serde(default = "default_weeks_per_year")]
    pub weeks_per_year: u64,
    #[serde(default = "default_epochs_in_week")]
    pub epochs_in_week: u64,
}

fn default_blocks_per_day() -> u64 {
    14_400 // 6s rounds
}
fn default_days_per_year() -> u64 {
    365
}
fn default_weeks_per_year() -> u64 {
    52
}
fn default_epochs_in_week() -> u64 {
    7 // one epoch per day
}

impl ComputeSettings {
    pub fn blocks_per_year(&self) -> u64 {
        self.blocks_per_day * self.days_per_year
    }
}

impl Default for ComputeSettings {
    fn default() -> Self {
        Self {
            blocks_per_day: default_blocks_per_day(),
            days_per_year: default_days_per_year(),
            weeks_per_year: default_weeks_per_year(),
            epochs_in_week: default_epochs_in_week(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SnapshotSettings {
    /// JSON file holding a `FullSnapshot`; loaded at startup when set.
    #[serde(default)]
    pub path: Option<String>,
    /// Periodic reload of `path`; 0 disables reloading.
    #[serde(default)]
    pub reload_interval_seconds: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LogSettings {
    /// JSON log lines (only honored with the `observability` feature).
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetricsSettings {
    #[serde(default = "default_prometheus_listen_addr")]
    pub prometheus_listen_addr: String,
}

fn default_prometheus_listen_addr() -> String {
    "0.0.0.0:9000".to_string()
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            prometheus_listen_addr: default_prometheus_listen_addr(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub compute: ComputeSettings,
    #[serde(default)]
    pub snapshot: SnapshotSettings,
    #[serde(default)]
    pub logging: LogSettings,
    #[serde(default)]
    pub metrics: MetricsSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_file("Config.toml")
    }

    /// Loads settings from `path` (optional; every key has a default) and
    /// applies `DEX_STATE_*` environment overrides.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path).required(false))
            .build()?;

        let mut settings: Self = s.try_deserialize()?;

        if let Ok(raw_path) = env::var("DEX_STATE_SNAPSHOT_PATH") {
            let trimmed = raw_path.trim();
            if !trimmed.is_empty() {
                settings.snapshot.path = Some(trimmed.to_string());
            }
        }
        if let Ok(raw_interval) = env::var("DEX_STATE_SNAPSHOT_RELOAD_INTERVAL_SECONDS") {
            settings.snapshot.reload_interval_seconds = parse_env_u64(
                "DEX_STATE_SNAPSHOT_RELOAD_INTERVAL_SECONDS",
                &raw_interval,
            )?;
        }
        if let Ok(raw_blocks) = env::var("DEX_STATE_BLOCKS_PER_DAY") {
            settings.compute.blocks_per_day =
                parse_env_u64("DEX_STATE_BLOCKS_PER_DAY", &raw_blocks)?;
        }

        if settings.compute.blocks_per_day == 0 || settings.compute.epochs_in_week == 0 {
            return Err(ConfigError::Message(
                "compute.blocks_per_day and compute.epochs_in_week must be positive".to_string(),
            ));
        }

        Ok(settings)
    }
}

fn parse_env_u64(key: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::Message(format!("{} is not a valid integer: {}", key, e)))
}
