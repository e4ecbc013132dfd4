use std::f64::consts::TAU;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum_macros::Display;
use utoipa::ToSchema;

use crate::alerts::AlertClass;

pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 44_100;

const WARNING_HZ: f64 = 800.0;
const WARNING_DURATION: Duration = Duration::from_millis(1500);
const URGENT_HZ: f64 = 1000.0;
const URGENT_DURATION: Duration = Duration::from_secs(2);
const URGENT_RATIO: f64 = 1.5;
const URGENT_SWITCH: Duration = Duration::from_millis(250);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ToneKind {
    Warning,
    Urgent,
}

impl From<AlertClass> for ToneKind {
    fn from(class: AlertClass) -> Self {
        match class {
            AlertClass::Warning => ToneKind::Warning,
            AlertClass::Active => ToneKind::Urgent,
        }
    }
}

/// Linear attack to `peak_gain`, then exponential decay down to `floor_gain`
/// at the end of the tone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub peak_gain: f64,
    pub attack: Duration,
    pub floor_gain: f64,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            peak_gain: 0.3,
            attack: Duration::from_millis(100),
            floor_gain: 0.001,
        }
    }
}

impl Envelope {
    pub fn gain_at(&self, t: f64, duration: Duration) -> f64 {
        let attack = self.attack.as_secs_f64();
        let total = duration.as_secs_f64();

        if t <= 0.0 {
            0.0
        } else if t < attack {
            self.peak_gain * t / attack
        } else if t >= total {
            self.floor_gain
        } else {
            let progress = (t - attack) / (total - attack);
            self.peak_gain * (self.floor_gain / self.peak_gain).powf(progress)
        }
    }
}

/// Two-tone alternation: every `period` the pitch flips between the base
/// frequency and `base * ratio`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alternation {
    pub ratio: f64,
    pub period: Duration,
}

/// Description of one alert tone.
#[derive(Debug, Clone, PartialEq)]
pub struct ToneSpec {
    pub kind: ToneKind,
    pub base_hz: f64,
    pub duration: Duration,
    pub alternation: Option<Alternation>,
    pub envelope: Envelope,
}

impl ToneSpec {
    pub fn for_kind(kind: ToneKind) -> Self {
        match kind {
            ToneKind::Warning => Self {
                kind,
                base_hz: WARNING_HZ,
                duration: WARNING_DURATION,
                alternation: None,
                envelope: Envelope::default(),
            },
            ToneKind::Urgent => Self {
                kind,
                base_hz: URGENT_HZ,
                duration: URGENT_DURATION,
                alternation: Some(Alternation {
                    ratio: URGENT_RATIO,
                    period: URGENT_SWITCH,
                }),
                envelope: Envelope::default(),
            },
        }
    }

    pub fn frequency_at(&self, t: f64) -> f64 {
        match self.alternation {
            None => self.base_hz,
            Some(alt) => {
                let slot = (t.max(0.0) / alt.period.as_secs_f64()).floor() as u64;
                if slot % 2 == 0 {
                    self.base_hz
                } else {
                    self.base_hz * alt.ratio
                }
            }
        }
    }

    pub fn gain_at(&self, t: f64) -> f64 {
        self.envelope.gain_at(t, self.duration)
    }

    pub fn sample_count(&self, sample_rate: u32) -> usize {
        (self.duration.as_secs_f64() * sample_rate as f64).round() as usize
    }

    /// Render to signed 16-bit mono PCM. Phase is carried across pitch
    /// changes so the alternation does not click.
    pub fn render(&self, sample_rate: u32) -> Vec<i16> {
        let rate = sample_rate as f64;
        let mut phase = 0.0_f64;

        (0..self.sample_count(sample_rate))
            .map(|n| {
                let t = n as f64 / rate;
                let value = phase.sin() * self.gain_at(t);
                phase = (phase + TAU * self.frequency_at(t) / rate) % TAU;
                (value * i16::MAX as f64) as i16
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_is_steady() {
        let spec = ToneSpec::for_kind(ToneKind::Warning);
        assert_eq!(spec.duration, Duration::from_millis(1500));
        for t in [0.0, 0.3, 0.9, 1.4] {
            assert_eq!(spec.frequency_at(t), 800.0);
        }
    }

    #[test]
    fn urgent_alternates_every_quarter_second() {
        let spec = ToneSpec::for_kind(ToneKind::Urgent);
        assert_eq!(spec.duration, Duration::from_secs(2));
        assert_eq!(spec.frequency_at(0.1), 1000.0);
        assert_eq!(spec.frequency_at(0.3), 1500.0);
        assert_eq!(spec.frequency_at(0.6), 1000.0);
        assert_eq!(spec.frequency_at(0.8), 1500.0);
        assert_eq!(spec.frequency_at(1.8), 1500.0);
        assert_eq!(spec.frequency_at(1.9), 1000.0 * 1.5);
    }

    #[test]
    fn active_alerts_use_urgent_tone() {
        assert_eq!(ToneKind::from(AlertClass::Active), ToneKind::Urgent);
        assert_eq!(ToneKind::from(AlertClass::Warning), ToneKind::Warning);
    }

    #[test]
    fn envelope_ramps_then_decays() {
        let spec = ToneSpec::for_kind(ToneKind::Warning);
        assert_eq!(spec.gain_at(0.0), 0.0);
        assert!((spec.gain_at(0.05) - 0.15).abs() < 1e-9);
        assert!((spec.gain_at(0.1) - 0.3).abs() < 1e-9);
        assert!(spec.gain_at(0.8) < 0.3);
        assert!(spec.gain_at(0.8) > spec.gain_at(1.2));
        assert!((spec.gain_at(1.5) - 0.001).abs() < 1e-9);
    }

    #[test]
    fn render_length_follows_duration() {
        let warning = ToneSpec::for_kind(ToneKind::Warning).render(8_000);
        let urgent = ToneSpec::for_kind(ToneKind::Urgent).render(8_000);
        assert_eq!(warning.len(), 12_000);
        assert_eq!(urgent.len(), 16_000);
    }

    #[test]
    fn render_stays_under_peak_gain() {
        let samples = ToneSpec::for_kind(ToneKind::Urgent).render(8_000);
        let limit = (0.3 * i16::MAX as f64) as i16 + 1;
        assert_eq!(samples[0], 0);
        assert!(samples.iter().all(|s| s.abs() <= limit));
        assert!(samples.iter().any(|s| s.abs() > limit / 2));
    }
}
