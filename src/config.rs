use chrono::TimeDelta;
use n2k_transport::{DEFAULT_FAST_PACKET_PGNS, ReassemblyConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::channels::Channel;
use crate::error::HubError;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub hub: HubConfig,
    #[serde(default)]
    pub reassembly: ReassemblySettings,
    /// Arbitration weight per source name, e.g. "NMEA2000/12": 10
    #[serde(default)]
    pub source_priority: HashMap<String, i32>,
    #[serde(default)]
    pub subscriptions: SubscriptionConfig,
    #[serde(default)]
    pub logging: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Directory where log files will be stored
    pub directory: String,
    /// Log file name prefix (date will be appended)
    pub file_prefix: String,
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            directory: "./logs".to_string(),
            file_prefix: "nmea_hub".to_string(),
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Frame dump to replay, in `candump` text format
    pub candump_file: String,
    /// Drive the hub clock from the dump timestamps instead of the wall clock
    pub replay_clock: bool,
    /// PGNs transmitted as fast packets. The built-in list is used when absent.
    pub fast_packet_pgns: Option<Vec<u32>>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            candump_file: "candump.log".to_string(),
            replay_clock: true,
            fast_packet_pgns: None,
        }
    }
}

impl InputConfig {
    pub fn fast_packet_pgns(&self) -> &[u32] {
        self.fast_packet_pgns
            .as_deref()
            .unwrap_or(DEFAULT_FAST_PACKET_PGNS)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// History length of every channel
    pub default_capacity: usize,
    /// How long a source stays current without publishing
    pub freshness_window_ms: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            default_capacity: 1024,
            freshness_window_ms: 15_000,
        }
    }
}

impl HubConfig {
    pub fn freshness_window(&self) -> TimeDelta {
        TimeDelta::milliseconds(i64::try_from(self.freshness_window_ms).unwrap_or(i64::MAX))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReassemblySettings {
    pub max_pending: usize,
    pub stale_after_frames: u64,
}

impl Default for ReassemblySettings {
    fn default() -> Self {
        let defaults = ReassemblyConfig::default();
        Self {
            max_pending: defaults.max_pending,
            stale_after_frames: defaults.stale_after_frames,
        }
    }
}

impl ReassemblySettings {
    pub fn to_reassembly_config(&self) -> ReassemblyConfig {
        ReassemblyConfig {
            max_pending: self.max_pending,
            stale_after_frames: self.stale_after_frames,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriptionConfig {
    /// Minimum time between two log lines of the same channel
    pub log_interval_ms: u64,
    /// Short names of the channels to log
    pub channels: Vec<String>,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            log_interval_ms: 5_000,
            channels: ["awa", "aws", "pos", "gpsSpeed", "magHdg"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl SubscriptionConfig {
    pub fn log_interval(&self) -> TimeDelta {
        TimeDelta::milliseconds(i64::try_from(self.log_interval_ms).unwrap_or(i64::MAX))
    }

    pub fn channels(&self) -> Result<Vec<Channel>, HubError> {
        self.channels
            .iter()
            .map(|name| Channel::from_short_name(name))
            .collect()
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, HubError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Check the values serde can not check on its own
    pub fn validate(&self) -> Result<(), HubError> {
        if self.hub.default_capacity == 0 {
            return Err(HubError::InvalidConfig(
                "hub.default_capacity must be greater than 0".to_string(),
            ));
        }
        if self.reassembly.max_pending == 0 {
            return Err(HubError::InvalidConfig(
                "reassembly.max_pending must be greater than 0".to_string(),
            ));
        }
        if self.input.fast_packet_pgns().iter().any(|pgn| *pgn > 0x3FFFF) {
            return Err(HubError::InvalidConfig(
                "input.fast_packet_pgns contains a value that is not a PGN".to_string(),
            ));
        }
        self.subscriptions.channels()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hub_config_default() {
        let config = HubConfig::default();
        assert_eq!(config.default_capacity, 1024);
        assert_eq!(config.freshness_window(), TimeDelta::seconds(15));
    }

    #[test]
    fn test_reassembly_settings_default() {
        let config = ReassemblySettings::default().to_reassembly_config();
        assert_eq!(config, ReassemblyConfig::default());
        assert_eq!(config.max_pending, 256);
        assert_eq!(config.stale_after_frames, 4096);
    }

    #[test]
    fn test_log_config_default() {
        let config = LogConfig::default();
        assert_eq!(config.directory, "./logs");
        assert_eq!(config.file_prefix, "nmea_hub");
        assert_eq!(config.level, "info");
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.input.candump_file, "candump.log");
        assert!(config.input.replay_clock);
        assert_eq!(config.input.fast_packet_pgns(), DEFAULT_FAST_PACKET_PGNS);
        assert_eq!(config.hub, HubConfig::default());
        assert!(config.source_priority.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let json = r#"{
            "input": { "candump_file": "/tmp/race.log", "fast_packet_pgns": [129029, 65280] },
            "hub": { "freshness_window_ms": 5000 },
            "source_priority": { "NMEA2000/12": 10, "NMEA2000/3": -1 },
            "subscriptions": { "channels": ["awa", "rot"] }
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();

        assert_eq!(config.input.candump_file, "/tmp/race.log");
        assert_eq!(config.input.fast_packet_pgns(), &[129029, 65280]);
        assert_eq!(config.hub.default_capacity, 1024);
        assert_eq!(config.hub.freshness_window(), TimeDelta::seconds(5));
        assert_eq!(config.source_priority["NMEA2000/12"], 10);
        assert_eq!(config.source_priority["NMEA2000/3"], -1);
        assert_eq!(config.subscriptions.log_interval_ms, 5_000);
        assert_eq!(
            config.subscriptions.channels().unwrap(),
            vec![Channel::Awa, Channel::RateOfTurn]
        );
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.subscriptions.channels = vec!["awa".to_string(), "windspeed".to_string()];
        assert!(matches!(
            config.validate(),
            Err(HubError::UnknownChannelName(name)) if name == "windspeed"
        ));

        let mut config = Config::default();
        config.hub.default_capacity = 0;
        assert!(matches!(config.validate(), Err(HubError::InvalidConfig(_))));

        let mut config = Config::default();
        config.input.fast_packet_pgns = Some(vec![0x40000]);
        assert!(matches!(config.validate(), Err(HubError::InvalidConfig(_))));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Config::from_file("/nonexistent/config.json"),
            Err(HubError::ConfigIo(_))
        ));
    }

    #[test]
    fn test_malformed_file() {
        let path = std::env::temp_dir().join("nmea_hub_malformed_config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Config::from_file(&path),
            Err(HubError::ConfigParse(_))
        ));
        let _ = fs::remove_file(&path);
    }
}
