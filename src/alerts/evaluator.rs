use chrono::{DateTime, Duration, Utc};

use super::ledger::{AlertLedger, RETENTION};
use super::settings::AlertSettings;
use super::types::{AlertClass, AlertEvent, SatellitePass};

/// A pass counts as active for this long after AOS.
pub const ACTIVE_WINDOW: Duration = Duration::seconds(60);
/// Only passes at least this high raise an active alert, whatever `min_elevation` says.
pub const EXCELLENT_ELEVATION_DEG: f64 = 60.0;

/// Run one evaluation cycle.
///
/// Returns the alerts that newly qualify at `now` and records them in
/// `ledger`. Missing or disabled settings mute every alert. The ledger is
/// pruned on every call, muted or not.
pub fn evaluate(
    now: DateTime<Utc>,
    passes: &[SatellitePass],
    settings: Option<&AlertSettings>,
    ledger: &mut AlertLedger,
) -> Vec<AlertEvent> {
    let mut events = Vec::new();

    if let Some(settings) = settings.filter(|s| s.enabled) {
        for pass in passes {
            if qualifies_for_warning(now, pass, settings) {
                fire(AlertEvent::new(AlertClass::Warning, pass, now), ledger, &mut events);
            }
            if qualifies_as_active(now, pass) {
                fire(AlertEvent::new(AlertClass::Active, pass, now), ledger, &mut events);
            }
        }
    }

    let before = ledger.len();
    *ledger = std::mem::take(ledger).pruned(now, RETENTION);
    if ledger.len() < before {
        log::debug!("Pruned {} expired alert entries", before - ledger.len());
    }

    events
}

fn fire(event: AlertEvent, ledger: &mut AlertLedger, events: &mut Vec<AlertEvent>) {
    if ledger.insert(event.key(), event.fired_at) {
        events.push(event);
    }
}

fn qualifies_for_warning(now: DateTime<Utc>, pass: &SatellitePass, settings: &AlertSettings) -> bool {
    let time_until_aos = pass.aos - now;
    let in_window = time_until_aos > Duration::zero()
        && time_until_aos <= settings.pre_pass_warning_minutes.window();
    let high_priority = pass.max_elevation >= settings.min_elevation.degrees();

    in_window && (!settings.high_priority_only || high_priority)
}

fn qualifies_as_active(now: DateTime<Utc>, pass: &SatellitePass) -> bool {
    let time_until_aos = pass.aos - now;
    time_until_aos <= Duration::zero()
        && time_until_aos > -ACTIVE_WINDOW
        && pass.max_elevation >= EXCELLENT_ELEVATION_DEG
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::settings::{MinElevation, WarningLead};
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn pass(name: &str, max_elevation: f64) -> SatellitePass {
        SatellitePass::new(name, t0(), t0() + Duration::seconds(600), max_elevation)
    }

    fn settings() -> AlertSettings {
        AlertSettings {
            enabled: true,
            high_priority_only: true,
            min_elevation: MinElevation::Good,
            pre_pass_warning_minutes: WarningLead::FiveMinutes,
        }
    }

    fn mmss(minutes: i64, seconds: i64) -> Duration {
        Duration::minutes(minutes) + Duration::seconds(seconds)
    }

    #[test]
    fn iss_scenario_warns_then_goes_active() {
        let passes = vec![pass("ISS", 70.0)];
        let s = settings();
        let mut ledger = AlertLedger::new();

        let events = evaluate(t0() - mmss(4, 59), &passes, Some(&s), &mut ledger);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].class, AlertClass::Warning);
        assert_eq!(events[0].minutes_until_aos(), 5);
        assert_eq!(ledger.len(), 1);

        let events = evaluate(t0() - mmss(4, 58), &passes, Some(&s), &mut ledger);
        assert!(events.is_empty());

        let events = evaluate(t0() + Duration::seconds(10), &passes, Some(&s), &mut ledger);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].class, AlertClass::Active);
        assert_eq!(ledger.len(), 2);

        let events = evaluate(t0() + Duration::seconds(70), &passes, Some(&s), &mut ledger);
        assert!(events.is_empty());
    }

    #[test]
    fn mediocre_pass_only_warns() {
        let passes = vec![pass("ISS", 40.0)];
        let s = settings();
        let mut ledger = AlertLedger::new();

        let events = evaluate(t0() - mmss(4, 59), &passes, Some(&s), &mut ledger);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].class, AlertClass::Warning);

        let events = evaluate(t0() + Duration::seconds(10), &passes, Some(&s), &mut ledger);
        assert!(events.is_empty());
    }

    #[test]
    fn each_class_fires_at_most_once() {
        let passes = vec![pass("AO-91", 75.0)];
        let s = settings();
        let mut ledger = AlertLedger::new();
        let mut fired = Vec::new();

        let mut now = t0() - Duration::minutes(10);
        while now <= t0() + Duration::minutes(3) {
            fired.extend(evaluate(now, &passes, Some(&s), &mut ledger));
            now += Duration::seconds(1);
        }

        let classes: Vec<_> = fired.iter().map(|e| e.class).collect();
        assert_eq!(classes, vec![AlertClass::Warning, AlertClass::Active]);
    }

    #[test]
    fn disabled_settings_mute_everything() {
        let passes = vec![pass("ISS", 80.0)];
        let s = AlertSettings {
            enabled: false,
            ..settings()
        };
        let mut ledger = AlertLedger::new();

        for offset in [-240, -1, 0, 10, 59] {
            let now = t0() + Duration::seconds(offset);
            assert!(evaluate(now, &passes, Some(&s), &mut ledger).is_empty());
        }
        assert!(ledger.is_empty());
    }

    #[test]
    fn missing_settings_behave_as_disabled() {
        let passes = vec![pass("ISS", 80.0)];
        let mut ledger = AlertLedger::new();
        assert!(evaluate(t0() - Duration::minutes(1), &passes, None, &mut ledger).is_empty());
        assert!(evaluate(t0() + Duration::seconds(1), &passes, None, &mut ledger).is_empty());
    }

    #[test]
    fn priority_gate_blocks_low_passes() {
        let passes = vec![pass("SO-50", 20.0)];
        let mut ledger = AlertLedger::new();
        let now = t0() - Duration::minutes(2);

        assert!(evaluate(now, &passes, Some(&settings()), &mut ledger).is_empty());

        let open = AlertSettings {
            high_priority_only: false,
            ..settings()
        };
        let events = evaluate(now, &passes, Some(&open), &mut ledger);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn priority_gate_does_not_apply_to_active_alerts() {
        let passes = vec![pass("RS-44", 65.0)];
        let strict = AlertSettings {
            min_elevation: MinElevation::Excellent,
            ..settings()
        };
        let mut ledger = AlertLedger::new();
        let events = evaluate(t0(), &passes, Some(&strict), &mut ledger);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].class, AlertClass::Active);
    }

    #[test]
    fn warning_window_is_inclusive() {
        let passes = vec![pass("ISS", 70.0)];
        let s = settings();

        let mut ledger = AlertLedger::new();
        let at_edge = t0() - Duration::minutes(5);
        assert_eq!(evaluate(at_edge, &passes, Some(&s), &mut ledger).len(), 1);

        let mut ledger = AlertLedger::new();
        let just_outside = at_edge - Duration::microseconds(1);
        assert!(evaluate(just_outside, &passes, Some(&s), &mut ledger).is_empty());
    }

    #[test]
    fn aos_instant_is_active_not_warning() {
        let passes = vec![pass("ISS", 70.0)];
        let mut ledger = AlertLedger::new();
        let events = evaluate(t0(), &passes, Some(&settings()), &mut ledger);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].class, AlertClass::Active);
    }

    #[test]
    fn active_window_excludes_sixty_seconds_after_aos() {
        let passes = vec![pass("ISS", 70.0)];
        let mut ledger = AlertLedger::new();
        let late = t0() + Duration::seconds(60);
        assert!(evaluate(late, &passes, Some(&settings()), &mut ledger).is_empty());
    }

    #[test]
    fn missed_passes_are_not_backfilled() {
        let passes = vec![pass("AO-27", 85.0)];
        let mut ledger = AlertLedger::new();
        let events = evaluate(t0() + Duration::minutes(5), &passes, Some(&settings()), &mut ledger);
        assert!(events.is_empty());
        assert!(ledger.is_empty());
    }

    #[test]
    fn duplicate_name_and_aos_collapse() {
        let passes = vec![pass("ISS", 70.0), pass("ISS", 72.0)];
        let mut ledger = AlertLedger::new();
        let events = evaluate(t0() - Duration::minutes(1), &passes, Some(&settings()), &mut ledger);
        assert_eq!(events.len(), 1);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn ledger_is_pruned_even_when_muted() {
        let passes = vec![pass("ISS", 70.0)];
        let mut ledger = AlertLedger::new();
        evaluate(t0() - Duration::minutes(1), &passes, Some(&settings()), &mut ledger);
        assert_eq!(ledger.len(), 1);

        let later = t0() + Duration::hours(2) + Duration::seconds(1);
        let muted = AlertSettings {
            enabled: false,
            ..settings()
        };
        evaluate(later, &[], Some(&muted), &mut ledger);
        assert!(ledger.is_empty());
    }

    #[test]
    fn replaced_pass_list_keeps_dedup_state() {
        let s = settings();
        let mut ledger = AlertLedger::new();
        let first = vec![pass("ISS", 70.0)];
        assert_eq!(evaluate(t0() - Duration::minutes(3), &first, Some(&s), &mut ledger).len(), 1);

        // A refreshed feed carries the same physical pass plus a new one
        let refreshed = vec![
            pass("ISS", 70.0),
            SatellitePass::new("PO-101", t0() + Duration::minutes(1), t0() + Duration::minutes(12), 45.0),
        ];
        let events = evaluate(t0() - Duration::minutes(2), &refreshed, Some(&s), &mut ledger);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].pass.name, "PO-101");
    }
}
