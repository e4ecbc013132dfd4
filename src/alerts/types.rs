use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use utoipa::ToSchema;
use uuid::Uuid;

/// A predicted satellite pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SatellitePass {
    pub name: String,
    pub aos: DateTime<Utc>,
    pub los: DateTime<Utc>,
    #[serde(alias = "max_el")]
    pub max_elevation: f64,
}

impl SatellitePass {
    pub fn new(name: &str, aos: DateTime<Utc>, los: DateTime<Utc>, max_elevation: f64) -> Self {
        Self {
            name: name.to_string(),
            aos,
            los,
            max_elevation,
        }
    }

    /// Non-positive for malformed passes where `los <= aos`.
    pub fn duration(&self) -> Duration {
        self.los - self.aos
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AlertClass {
    /// Pre-pass warning, fired inside the configured lead time before AOS
    Warning,
    /// Pass has just started and is an excellent one
    Active,
}

/// Identity of one (pass, class) firing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlertKey {
    pub name: String,
    pub aos: DateTime<Utc>,
    pub class: AlertClass,
}

impl AlertKey {
    pub fn new(pass: &SatellitePass, class: AlertClass) -> Self {
        Self {
            name: pass.name.clone(),
            aos: pass.aos,
            class,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AlertEvent {
    pub id: Uuid,
    pub class: AlertClass,
    pub pass: SatellitePass,
    pub fired_at: DateTime<Utc>,
    /// Signed: negative once the pass has started
    pub millis_until_aos: i64,
}

impl AlertEvent {
    pub fn new(class: AlertClass, pass: &SatellitePass, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            class,
            pass: pass.clone(),
            fired_at: now,
            millis_until_aos: (pass.aos - now).num_milliseconds(),
        }
    }

    pub fn key(&self) -> AlertKey {
        AlertKey::new(&self.pass, self.class)
    }

    pub fn time_until_aos(&self) -> Duration {
        Duration::milliseconds(self.millis_until_aos)
    }

    pub fn minutes_until_aos(&self) -> i64 {
        (self.millis_until_aos as f64 / 60_000.0).round() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn iss() -> SatellitePass {
        let aos = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        SatellitePass::new("ISS", aos, aos + Duration::seconds(600), 70.0)
    }

    #[test]
    fn keys_differ_by_class_only() {
        let pass = iss();
        let warning = AlertKey::new(&pass, AlertClass::Warning);
        let active = AlertKey::new(&pass, AlertClass::Active);
        assert_ne!(warning, active);
        assert_eq!(warning, AlertKey::new(&pass.clone(), AlertClass::Warning));
    }

    #[test]
    fn minutes_until_aos_rounds_to_nearest() {
        let pass = iss();
        let event = AlertEvent::new(
            AlertClass::Warning,
            &pass,
            pass.aos - Duration::seconds(4 * 60 + 59),
        );
        assert_eq!(event.minutes_until_aos(), 5);

        let event = AlertEvent::new(AlertClass::Warning, &pass, pass.aos - Duration::seconds(89));
        assert_eq!(event.minutes_until_aos(), 1);
    }

    #[test]
    fn pass_accepts_short_elevation_field() {
        let yaml = "name: AO-91\naos: 2026-03-01T12:00:00Z\nlos: 2026-03-01T12:10:00Z\nmax_el: 42\n";
        let pass: SatellitePass = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(pass.max_elevation, 42.0);
        assert_eq!(pass.duration(), Duration::minutes(10));
    }

    #[test]
    fn class_displays_snake_case() {
        assert_eq!(AlertClass::Warning.to_string(), "warning");
        assert_eq!(AlertClass::Active.to_string(), "active");
    }
}
