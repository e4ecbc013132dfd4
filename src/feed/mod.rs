mod file;
mod simulator;

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::alerts::{AlertMonitor, SatellitePass};
use crate::config::FeedSource;

pub use file::{load_passes, FileSource};
pub use simulator::SimulatedSource;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("pass file not found: {0}")]
    NotFound(String),
    #[error("pass file read error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid pass data in {file}: {message}")]
    InvalidPasses { file: String, message: String },
}

/// Upstream provider of predicted passes. Every fetch returns a complete
/// list that replaces the previous one.
pub trait PassSource: Send {
    fn describe(&self) -> String;
    fn fetch(&mut self, now: DateTime<Utc>) -> Result<Vec<SatellitePass>, FeedError>;
}

pub fn from_config(source: &FeedSource) -> Box<dyn PassSource> {
    match source {
        FeedSource::Simulated => Box::new(SimulatedSource::new()),
        FeedSource::File { path } => Box::new(FileSource::new(path.clone())),
    }
}

/// Fetch a new pass list and hand it to the monitor. On failure the
/// previous list stays in place.
pub fn refresh(source: &mut dyn PassSource, monitor: &Arc<Mutex<AlertMonitor>>, now: DateTime<Utc>) {
    match source.fetch(now) {
        Ok(passes) => {
            log::debug!("Fetched {} passes from {}", passes.len(), source.describe());
            monitor.lock().unwrap().replace_passes(passes);
        }
        Err(e) => {
            log::warn!("Pass refresh from {} failed: {}", source.describe(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{AlertSettings, SettingsStore};
    use crate::notify::NotificationEmitter;
    use crate::tone::TonePlayer;
    use chrono::TimeZone;

    struct FailingSource;

    impl PassSource for FailingSource {
        fn describe(&self) -> String {
            "failing".into()
        }

        fn fetch(&mut self, _now: DateTime<Utc>) -> Result<Vec<SatellitePass>, FeedError> {
            Err(FeedError::NotFound("nowhere".into()))
        }
    }

    #[test]
    fn failed_refresh_keeps_previous_passes() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let monitor = Arc::new(Mutex::new(AlertMonitor::new(
            Arc::new(SettingsStore::in_memory(AlertSettings::default())),
            TonePlayer::silent(),
            NotificationEmitter::disabled(),
        )));

        refresh(&mut SimulatedSource::seeded(1), &monitor, now);
        let before = monitor.lock().unwrap().passes().to_vec();
        assert_eq!(before.len(), 6);

        refresh(&mut FailingSource, &monitor, now);
        assert_eq!(monitor.lock().unwrap().passes(), before.as_slice());
    }
}
