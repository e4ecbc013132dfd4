use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::evaluator::evaluate;
use super::ledger::AlertLedger;
use super::settings::SettingsStore;
use super::types::{AlertClass, AlertEvent, SatellitePass};
use crate::notify::NotificationEmitter;
use crate::tone::{ToneKind, TonePlayer};

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Owns the dedup ledger and current pass list, and turns evaluator output
/// into tones and notifications.
pub struct AlertMonitor {
    settings: Arc<SettingsStore>,
    ledger: AlertLedger,
    passes: Vec<SatellitePass>,
    history: VecDeque<AlertEvent>,
    history_limit: usize,
    tones: TonePlayer,
    notifier: NotificationEmitter,
}

impl AlertMonitor {
    pub fn new(settings: Arc<SettingsStore>, tones: TonePlayer, notifier: NotificationEmitter) -> Self {
        Self {
            settings,
            ledger: AlertLedger::new(),
            passes: Vec::new(),
            history: VecDeque::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            tones,
            notifier,
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Swap in a freshly fetched pass list. The ledger is kept.
    pub fn replace_passes(&mut self, mut passes: Vec<SatellitePass>) {
        passes.sort_by_key(|p| p.aos);
        log::debug!("Pass list replaced ({} passes)", passes.len());
        self.passes = passes;
    }

    pub fn passes(&self) -> &[SatellitePass] {
        &self.passes
    }

    pub fn ledger(&self) -> &AlertLedger {
        &self.ledger
    }

    /// Forget every fired alert so passes still in their windows alert again.
    /// Returns the number of entries dropped.
    pub fn reset_ledger(&mut self) -> usize {
        let cleared = self.ledger.len();
        self.ledger.clear();
        log::info!("Alert ledger reset ({} entries)", cleared);
        cleared
    }

    pub fn recent_alerts(&self) -> impl Iterator<Item = &AlertEvent> {
        self.history.iter().rev()
    }

    /// One evaluation cycle at `now`.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<AlertEvent> {
        let settings = self.settings.snapshot();
        let events = evaluate(now, &self.passes, settings.as_deref(), &mut self.ledger);

        for event in &events {
            match event.class {
                AlertClass::Warning => log::info!(
                    "Pass warning: {} in {} min, max elevation {}°",
                    event.pass.name,
                    event.minutes_until_aos(),
                    event.pass.max_elevation
                ),
                AlertClass::Active => log::info!(
                    "Pass active: {} rose at {}, max elevation {}°",
                    event.pass.name,
                    event.pass.aos,
                    event.pass.max_elevation
                ),
            }

            self.tones.play(ToneKind::from(event.class));
            self.notifier.notify(event);

            self.history.push_back(event.clone());
            while self.history.len() > self.history_limit {
                self.history.pop_front();
            }
        }

        events
    }

    /// Test-trigger path: plays the tone directly, without touching the
    /// ledger or sending a notification. Returns false when muted or when
    /// no audio backend is configured.
    pub fn play_test_tone(&self, kind: ToneKind) -> bool {
        let enabled = self.settings.snapshot().is_some_and(|s| s.enabled);
        if !enabled {
            log::debug!("Alerts disabled, ignoring {} test tone", kind);
            return false;
        }
        self.tones.play(kind).is_some()
    }
}
