use serde::Deserialize;

use crate::collector::DEFAULT_SAMPLE_INTERVAL_MS;
use crate::daily_log::DEFAULT_ARCHIVE_AFTER_DAYS;
use crate::history::DEFAULT_DATE_INDEX_REFRESH;
use crate::retention::{DEFAULT_LONG_HOURS, DEFAULT_SHORT_CAPACITY};
use crate::sampler::{DEFAULT_LINK_CAPACITY_MBPS, DEFAULT_SMOOTHING_WINDOW};

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding `system_stats_YYYY-MM-DD.csv` and `archive/`.
    pub log_dir: String,
    #[serde(default = "default_archive_after_days")]
    pub archive_after_days: u32,
}

fn default_archive_after_days() -> u32 {
    DEFAULT_ARCHIVE_AFTER_DAYS
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub sample_interval_ms: u64,
    /// Samples kept in the short (live) window.
    pub short_window_capacity: usize,
    /// Age bound of the long window.
    pub long_window_hours: u32,
    /// Link speed that counts as 100% network utilization.
    pub link_capacity_mbps: f64,
    /// Raw network readings averaged per sample.
    pub smoothing_window: usize,
    /// How often to log collector counters at INFO level.
    pub stats_log_interval_secs: u64,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
            short_window_capacity: DEFAULT_SHORT_CAPACITY,
            long_window_hours: DEFAULT_LONG_HOURS,
            link_capacity_mbps: DEFAULT_LINK_CAPACITY_MBPS,
            smoothing_window: DEFAULT_SMOOTHING_WINDOW,
            stats_log_interval_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Minimum age of the available-dates index before a rescan.
    pub date_index_refresh_secs: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            date_index_refresh_secs: DEFAULT_DATE_INDEX_REFRESH.as_secs(),
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {}", path, e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(!self.server.host.is_empty(), "server.host must be non-empty");
        anyhow::ensure!(
            !self.storage.log_dir.is_empty(),
            "storage.log_dir must be non-empty"
        );
        anyhow::ensure!(
            self.storage.archive_after_days > 0,
            "storage.archive_after_days must be > 0, got {}",
            self.storage.archive_after_days
        );
        anyhow::ensure!(
            self.monitoring.sample_interval_ms > 0,
            "monitoring.sample_interval_ms must be > 0, got {}",
            self.monitoring.sample_interval_ms
        );
        anyhow::ensure!(
            self.monitoring.short_window_capacity > 0,
            "monitoring.short_window_capacity must be > 0, got {}",
            self.monitoring.short_window_capacity
        );
        anyhow::ensure!(
            self.monitoring.long_window_hours > 0,
            "monitoring.long_window_hours must be > 0, got {}",
            self.monitoring.long_window_hours
        );
        anyhow::ensure!(
            self.monitoring.link_capacity_mbps > 0.0,
            "monitoring.link_capacity_mbps must be > 0, got {}",
            self.monitoring.link_capacity_mbps
        );
        anyhow::ensure!(
            self.monitoring.smoothing_window > 0,
            "monitoring.smoothing_window must be > 0, got {}",
            self.monitoring.smoothing_window
        );
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        anyhow::ensure!(
            self.history.date_index_refresh_secs > 0,
            "history.date_index_refresh_secs must be > 0, got {}",
            self.history.date_index_refresh_secs
        );
        Ok(())
    }
}
