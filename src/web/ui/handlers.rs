use axum::{extract::State, response::IntoResponse};
use chrono::{DateTime, Utc};

use crate::alerts::{AlertClass, AlertKey, AlertMonitor, AlertSettings};
use crate::web::auth::AppState;

use super::templates::{AlertRow, DashboardTemplate, PassRow};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

pub async fn dashboard(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.settings.snapshot();
    let settings = snapshot.as_deref().copied().unwrap_or_default();
    let threshold = settings.min_elevation.degrees();
    let now = Utc::now();

    let monitor = state.monitor.lock().unwrap();
    let passes = pass_rows(&monitor, threshold, now);
    let alerts = monitor
        .recent_alerts()
        .map(|e| AlertRow {
            class: e.class.to_string(),
            name: e.pass.name.clone(),
            fired_at: e.fired_at.format(TIME_FORMAT).to_string(),
            detail: match e.class {
                AlertClass::Warning => format!("AOS in {} min", e.minutes_until_aos()),
                AlertClass::Active => format!("{}° max elevation", e.pass.max_elevation),
            },
        })
        .collect();
    drop(monitor);

    template(snapshot.is_some(), settings, passes, alerts)
}

/// Passes that have not set yet, marked with the time their warning fired.
fn pass_rows(monitor: &AlertMonitor, threshold: f64, now: DateTime<Utc>) -> Vec<PassRow> {
    monitor
        .passes()
        .iter()
        .filter(|p| p.los >= now)
        .map(|p| PassRow {
            name: p.name.clone(),
            aos: p.aos.format(TIME_FORMAT).to_string(),
            los: p.los.format(TIME_FORMAT).to_string(),
            max_elevation: p.max_elevation,
            high_priority: p.max_elevation >= threshold,
            warned_at: monitor
                .ledger()
                .fired_at(&AlertKey::new(p, AlertClass::Warning))
                .map(|t| t.format(TIME_FORMAT).to_string()),
        })
        .collect()
}

fn template(
    settings_loaded: bool,
    settings: AlertSettings,
    passes: Vec<PassRow>,
    alerts: Vec<AlertRow>,
) -> DashboardTemplate {
    DashboardTemplate {
        settings_loaded,
        enabled: settings.enabled,
        high_priority_only: settings.high_priority_only,
        min_elevation: settings.min_elevation.into(),
        min_elevation_label: settings.min_elevation.label().to_string(),
        warning_minutes: settings.pre_pass_warning_minutes.minutes(),
        passes,
        alerts,
    }
}
