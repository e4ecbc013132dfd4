use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unsupported minimum elevation {0} (expected 15, 30 or 60)")]
    InvalidElevation(u32),
    #[error("unsupported pre-pass warning {0} minutes (expected 1, 2, 5 or 10)")]
    InvalidWarningLead(u32),
}

/// Elevation threshold a pass must reach to count as high priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum MinElevation {
    Fair,
    Good,
    Excellent,
}

impl MinElevation {
    pub const ALL: [MinElevation; 3] = [Self::Fair, Self::Good, Self::Excellent];

    pub fn degrees(self) -> f64 {
        u32::from(self) as f64
    }

    pub fn label(self) -> &'static str {
        match self {
            MinElevation::Fair => "Fair",
            MinElevation::Good => "Good",
            MinElevation::Excellent => "Excellent",
        }
    }
}

impl TryFrom<u32> for MinElevation {
    type Error = SettingsError;

    fn try_from(degrees: u32) -> Result<Self, Self::Error> {
        match degrees {
            15 => Ok(MinElevation::Fair),
            30 => Ok(MinElevation::Good),
            60 => Ok(MinElevation::Excellent),
            other => Err(SettingsError::InvalidElevation(other)),
        }
    }
}

impl From<MinElevation> for u32 {
    fn from(value: MinElevation) -> Self {
        match value {
            MinElevation::Fair => 15,
            MinElevation::Good => 30,
            MinElevation::Excellent => 60,
        }
    }
}

/// How long before AOS a pre-pass warning may fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum WarningLead {
    OneMinute,
    TwoMinutes,
    FiveMinutes,
    TenMinutes,
}

impl WarningLead {
    pub const ALL: [WarningLead; 4] = [
        Self::OneMinute,
        Self::TwoMinutes,
        Self::FiveMinutes,
        Self::TenMinutes,
    ];

    pub fn minutes(self) -> u32 {
        u32::from(self)
    }

    pub fn window(self) -> Duration {
        Duration::minutes(self.minutes() as i64)
    }
}

impl TryFrom<u32> for WarningLead {
    type Error = SettingsError;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        match minutes {
            1 => Ok(WarningLead::OneMinute),
            2 => Ok(WarningLead::TwoMinutes),
            5 => Ok(WarningLead::FiveMinutes),
            10 => Ok(WarningLead::TenMinutes),
            other => Err(SettingsError::InvalidWarningLead(other)),
        }
    }
}

impl From<WarningLead> for u32 {
    fn from(value: WarningLead) -> Self {
        match value {
            WarningLead::OneMinute => 1,
            WarningLead::TwoMinutes => 2,
            WarningLead::FiveMinutes => 5,
            WarningLead::TenMinutes => 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct AlertSettings {
    /// Master switch for tones and notifications
    pub enabled: bool,
    /// Only warn about passes reaching `min_elevation`
    pub high_priority_only: bool,
    #[schema(value_type = u32, example = 30)]
    pub min_elevation: MinElevation,
    #[schema(value_type = u32, example = 5)]
    pub pre_pass_warning_minutes: WarningLead,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            high_priority_only: true,
            min_elevation: MinElevation::Good,
            pre_pass_warning_minutes: WarningLead::FiveMinutes,
        }
    }
}

/// Persisted alert settings.
///
/// Readers take an `Arc` snapshot; writers replace the whole value, so a
/// snapshot never observes a half-applied update. A store that was never
/// loaded has no snapshot at all.
pub struct SettingsStore {
    path: Option<PathBuf>,
    current: RwLock<Option<Arc<AlertSettings>>>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path: Some(path),
            current: RwLock::new(None),
        }
    }

    /// Loaded store without a backing file.
    #[cfg(test)]
    pub fn in_memory(settings: AlertSettings) -> Self {
        Self {
            path: None,
            current: RwLock::new(Some(Arc::new(settings))),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Read the settings file, falling back to defaults when it does not exist yet.
    pub fn load(&self) -> Result<Arc<AlertSettings>, SettingsError> {
        let settings = match &self.path {
            Some(path) if path.exists() => {
                let content = fs::read_to_string(path)?;
                serde_yaml::from_str(&content)?
            }
            Some(path) => {
                log::info!(
                    "No settings at {}, using defaults",
                    path.display()
                );
                AlertSettings::default()
            }
            None => return Ok(self.snapshot().unwrap_or_default()),
        };

        let settings = Arc::new(settings);
        *self.current.write().unwrap() = Some(settings.clone());
        Ok(settings)
    }

    pub fn snapshot(&self) -> Option<Arc<AlertSettings>> {
        self.current.read().unwrap().clone()
    }

    /// Persist `settings`, then make them the current snapshot.
    pub fn replace(&self, settings: AlertSettings) -> Result<Arc<AlertSettings>, SettingsError> {
        if let Some(path) = &self.path {
            save(path, &settings)?;
        }
        let settings = Arc::new(settings);
        *self.current.write().unwrap() = Some(settings.clone());
        log::info!(
            "Alert settings updated: enabled={} high_priority_only={} min_elevation={} warning={}m",
            settings.enabled,
            settings.high_priority_only,
            settings.min_elevation.degrees(),
            settings.pre_pass_warning_minutes.minutes()
        );
        Ok(settings)
    }

    pub fn update<F>(&self, f: F) -> Result<Arc<AlertSettings>, SettingsError>
    where
        F: FnOnce(&mut AlertSettings),
    {
        let mut next = self.snapshot().map(|s| *s).unwrap_or_default();
        f(&mut next);
        self.replace(next)
    }
}

fn save(path: &Path, settings: &AlertSettings) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    // Write beside the target and rename so readers never see a partial file
    let tmp = path.with_extension("yaml.tmp");
    fs::write(&tmp, serde_yaml::to_string(settings)?)?;
    fs::rename(tmp, path)?;
    Ok(())
}
