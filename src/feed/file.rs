use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{FeedError, PassSource};
use crate::alerts::SatellitePass;

/// Accepts either `passes: [...]` or a bare list. JSON works too since it
/// parses as YAML.
#[derive(Deserialize)]
#[serde(untagged)]
enum PassDocument {
    Wrapped { passes: Vec<SatellitePass> },
    Bare(Vec<SatellitePass>),
}

/// Re-reads a pass file on every fetch.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl PassSource for FileSource {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    fn fetch(&mut self, _now: DateTime<Utc>) -> Result<Vec<SatellitePass>, FeedError> {
        load_passes(&self.path)
    }
}

pub fn load_passes(path: &Path) -> Result<Vec<SatellitePass>, FeedError> {
    if !path.exists() {
        return Err(FeedError::NotFound(path.display().to_string()));
    }
    let content = fs::read_to_string(path)?;
    let mut passes = parse_passes(&content).map_err(|e| FeedError::InvalidPasses {
        file: path.display().to_string(),
        message: e.to_string(),
    })?;
    for pass in passes.iter().filter(|p| p.duration() <= chrono::Duration::zero()) {
        log::warn!(
            "{}: {} at {} has LOS before AOS, keeping it anyway",
            path.display(),
            pass.name,
            pass.aos
        );
    }
    passes.sort_by_key(|p| p.aos);
    Ok(passes)
}

pub fn parse_passes(content: &str) -> Result<Vec<SatellitePass>, serde_yaml::Error> {
    let passes = match serde_yaml::from_str::<PassDocument>(content)? {
        PassDocument::Wrapped { passes } => passes,
        PassDocument::Bare(passes) => passes,
    };
    Ok(passes)
}
