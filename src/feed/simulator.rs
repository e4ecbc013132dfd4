use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::{FeedError, PassSource};
use crate::alerts::SatellitePass;

const SATELLITE_NAMES: [&str; 8] = [
    "ISS", "AO-91", "AO-92", "SO-50", "PO-101", "RS-44", "IO-86", "AO-27",
];
const PASS_COUNT: usize = 6;

/// Fabricates a plausible pass schedule: six passes spread over the next
/// dozen hours, 8 to 15 minutes long, peaking between 15° and 90°.
pub struct SimulatedSource {
    rng: StdRng,
}

impl SimulatedSource {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    #[cfg(test)]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn generate(&mut self, index: usize, now: DateTime<Utc>) -> SatellitePass {
        let name = SATELLITE_NAMES
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(SATELLITE_NAMES[0]);
        let offset_hours = index as f64 * 2.0 + self.rng.gen_range(0.0..3.0);
        let length_minutes = 8.0 + self.rng.gen_range(0.0..7.0);
        let max_elevation = (15.0 + self.rng.gen::<f64>() * 75.0).round();

        let aos = now + Duration::milliseconds((offset_hours * 3_600_000.0) as i64);
        let los = aos + Duration::milliseconds((length_minutes * 60_000.0) as i64);
        SatellitePass::new(name, aos, los, max_elevation)
    }
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PassSource for SimulatedSource {
    fn describe(&self) -> String {
        "simulated".to_string()
    }

    fn fetch(&mut self, now: DateTime<Utc>) -> Result<Vec<SatellitePass>, FeedError> {
        let mut passes: Vec<_> = (0..PASS_COUNT).map(|i| self.generate(i, now)).collect();
        passes.sort_by_key(|p| p.aos);
        Ok(passes)
    }
}
