//! hotspot.toml configuration parser.
//!
//! Every section is `#[serde(default)]`, so an empty file yields a
//! working configuration. Durations are written as strings ("60s",
//! "500ms", "5m") and parsed with [`parse_duration`].

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::StoreId;

/// What the daemon does with each fetched forecast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Derive schedule windows and queue placement tasks.
    #[default]
    Placement,
    /// Apply the forecast's replica recommendation to the cluster.
    Autoscale,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HotspotConfig {
    pub mode: RunMode,
    pub forecast: ForecastConfig,
    pub placement: PlacementConfig,
    pub scheduler: SchedulerConfig,
    pub autoscale: AutoscaleConfig,
    pub api: ApiConfig,
}

/// Where and how often to fetch forecasts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub url: String,
    pub fetch_interval: String,
    pub timeout: String,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8000/".to_string(),
            fetch_interval: "60s".to_string(),
            timeout: "10s".to_string(),
        }
    }
}

impl ForecastConfig {
    pub fn fetch_interval(&self) -> Duration {
        parse_duration(&self.fetch_interval).unwrap_or(Duration::from_secs(60))
    }

    pub fn timeout(&self) -> Duration {
        parse_duration(&self.timeout).unwrap_or(Duration::from_secs(10))
    }
}

/// Stores that hot region leaders are moved onto.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub target_stores: Vec<StoreId>,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            target_stores: vec![1],
        }
    }
}

/// Host polling loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub tick_interval: String,
    /// Cluster-wide limit on in-flight region operators.
    pub region_schedule_limit: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval: "1s".to_string(),
            region_schedule_limit: 4,
        }
    }
}

impl SchedulerConfig {
    pub fn tick_interval(&self) -> Duration {
        parse_duration(&self.tick_interval).unwrap_or(Duration::from_secs(1))
    }
}

/// Bounds for the replica count applied in autoscale mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoscaleConfig {
    pub min_replicas: u32,
    pub max_replicas: u32,
    pub cooldown: String,
}

impl Default for AutoscaleConfig {
    fn default() -> Self {
        Self {
            min_replicas: 1,
            max_replicas: 16,
            cooldown: "5m".to_string(),
        }
    }
}

impl AutoscaleConfig {
    pub fn cooldown(&self) -> Duration {
        parse_duration(&self.cooldown).unwrap_or(Duration::from_secs(300))
    }
}

/// Status API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub listen_addr: SocketAddr,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8590),
        }
    }
}

impl HotspotConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: HotspotConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Parse a duration string like "5s", "500ms", "1m".
///
/// A bare number is taken as seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(secs) = s.strip_suffix('s') {
        if let Some(ms) = secs.strip_suffix('m') {
            ms.parse::<u64>().ok().map(Duration::from_millis)
        } else {
            secs.parse::<u64>().ok().map(Duration::from_secs)
        }
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>().ok().map(|m| Duration::from_secs(m * 60))
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config: HotspotConfig = toml::from_str("").unwrap();
        assert_eq!(config.mode, RunMode::Placement);
        assert_eq!(config.forecast.fetch_interval(), Duration::from_secs(60));
        assert_eq!(config.placement.target_stores, vec![1]);
        assert_eq!(config.scheduler.region_schedule_limit, 4);
        assert_eq!(config.api.listen_addr.port(), 8590);
    }

    #[test]
    fn parses_full_file() {
        let toml_str = r#"
mode = "autoscale"

[forecast]
url = "http://10.0.0.4:8000/"
fetch_interval = "30s"
timeout = "2s"

[placement]
target_stores = [4, 5]

[scheduler]
tick_interval = "500ms"
region_schedule_limit = 8

[autoscale]
min_replicas = 3
max_replicas = 9
cooldown = "1m"
"#;
        let config: HotspotConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.mode, RunMode::Autoscale);
        assert_eq!(config.forecast.url, "http://10.0.0.4:8000/");
        assert_eq!(config.forecast.timeout(), Duration::from_secs(2));
        assert_eq!(config.placement.target_stores, vec![4, 5]);
        assert_eq!(config.scheduler.tick_interval(), Duration::from_millis(500));
        assert_eq!(config.autoscale.cooldown(), Duration::from_secs(60));
        assert_eq!(config.autoscale.min_replicas, 3);
    }

    #[test]
    fn bad_duration_falls_back() {
        let mut config = HotspotConfig::default();
        config.forecast.fetch_interval = "soon".to_string();
        assert_eq!(config.forecast.fetch_interval(), Duration::from_secs(60));
    }

    #[test]
    fn round_trips_through_file() {
        let mut config = HotspotConfig::default();
        config.placement.target_stores = vec![7];
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hotspot.toml");
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();

        let loaded = HotspotConfig::from_file(&path).unwrap();
        assert_eq!(loaded.placement.target_stores, vec![7]);
    }

    #[test]
    fn parse_duration_units() {
        assert_eq!(parse_duration("5s"), Some(Duration::from_secs(5)));
        assert_eq!(parse_duration("500ms"), Some(Duration::from_millis(500)));
        assert_eq!(parse_duration("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_duration("10"), Some(Duration::from_secs(10)));
        assert_eq!(parse_duration("ten"), None);
    }
}
