use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::alerts::DEFAULT_HISTORY_LIMIT;
use crate::tone::DEFAULT_SAMPLE_RATE_HZ;

const MAX_TICK_INTERVAL: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub alerts: AlertsConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    pub web: Option<WebConfig>,
    #[serde(default)]
    pub api_keys: Vec<ApiKey>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlertsConfig {
    #[serde(default = "default_settings_file")]
    pub settings_file: PathBuf,
    #[serde(default = "default_tick_interval", deserialize_with = "deserialize_duration")]
    pub tick_interval: Duration,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            settings_file: default_settings_file(),
            tick_interval: default_tick_interval(),
            history_limit: default_history_limit(),
        }
    }
}

fn default_settings_file() -> PathBuf {
    PathBuf::from("alert-settings.yaml")
}

fn default_tick_interval() -> Duration {
    Duration::from_secs(1)
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    #[serde(default)]
    pub source: FeedSource,
    #[serde(default = "default_refresh_interval", deserialize_with = "deserialize_duration")]
    pub refresh_interval: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            source: FeedSource::default(),
            refresh_interval: default_refresh_interval(),
        }
    }
}

fn default_refresh_interval() -> Duration {
    Duration::from_secs(15)
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedSource {
    #[default]
    Simulated,
    File {
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    /// Player command fed raw S16LE mono PCM on stdin; `None` disables audio
    #[serde(default = "default_player")]
    pub player: Option<String>,
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            player: default_player(),
            sample_rate: default_sample_rate(),
        }
    }
}

fn default_player() -> Option<String> {
    Some("aplay -q -t raw -f S16_LE -r {rate} -c 1".to_string())
}

fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE_HZ
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default)]
    pub backend: NotificationBackendKind,
    #[serde(default = "default_notify_program")]
    pub program: String,
    pub icon: Option<String>,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            backend: NotificationBackendKind::default(),
            program: default_notify_program(),
            icon: None,
        }
    }
}

fn default_notify_program() -> String {
    "notify-send".to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationBackendKind {
    #[default]
    Command,
    Log,
    None,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiKey {
    pub key: String,
    pub name: String,
    pub permissions: HashSet<Permission>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ChangeSettings,
    TestAlerts,
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let tick = self.alerts.tick_interval;
        if tick.is_zero() || tick > MAX_TICK_INTERVAL {
            return Err(ConfigError::Invalid(format!(
                "alerts.tick_interval must be between 1ms and {}",
                humantime::format_duration(MAX_TICK_INTERVAL)
            )));
        }
        if self.feed.refresh_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "feed.refresh_interval must be non-zero".into(),
            ));
        }
        if self.audio.sample_rate == 0 {
            return Err(ConfigError::Invalid("audio.sample_rate must be non-zero".into()));
        }
        Ok(())
    }

    pub fn find_api_key(&self, key: &str) -> Option<&ApiKey> {
        self.api_keys.iter().find(|k| k.key == key)
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}
