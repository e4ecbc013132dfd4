use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::alerts::{AlertMonitor, SettingsStore};
use crate::config::{AudioConfig, Config, NotificationBackendKind, NotificationsConfig};
use crate::feed;
use crate::notify::{CommandNotifier, LogNotifier, NotificationEmitter};
use crate::ticker::{Clock, SystemClock, Ticker, TickerError};
use crate::tone::{CommandAudioBackend, TonePlayer};
use crate::web::{run_server, AppState};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ticker error: {0}")]
    Ticker(#[from] TickerError),
}

pub fn tone_player(config: &AudioConfig) -> TonePlayer {
    match &config.player {
        Some(cmd) if !cmd.trim().is_empty() => {
            TonePlayer::new(Arc::new(CommandAudioBackend::new(cmd)), config.sample_rate)
        }
        _ => {
            log::info!("No audio player configured, tones are disabled");
            TonePlayer::silent()
        }
    }
}

pub fn notification_emitter(config: &NotificationsConfig) -> NotificationEmitter {
    match config.backend {
        NotificationBackendKind::Command => NotificationEmitter::new(Arc::new(
            CommandNotifier::new(&config.program, config.icon.clone()),
        )),
        NotificationBackendKind::Log => NotificationEmitter::new(Arc::new(LogNotifier)),
        NotificationBackendKind::None => NotificationEmitter::disabled(),
    }
}

/// Run the alert loop, the pass feed and the optional web server until Ctrl-C.
pub async fn run(config: Config) -> Result<(), ServiceError> {
    let settings = Arc::new(SettingsStore::new(config.alerts.settings_file.clone()));
    if let Err(e) = settings.load() {
        log::error!(
            "Failed to load settings from {}: {}; alerts stay muted until settings are saved",
            config.alerts.settings_file.display(),
            e
        );
    }

    let notifier = notification_emitter(&config.notifications);
    notifier.ensure_permission();

    let monitor = Arc::new(Mutex::new(
        AlertMonitor::new(settings.clone(), tone_player(&config.audio), notifier)
            .with_history_limit(config.alerts.history_limit),
    ));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let mut feed_ticker = Ticker::new();
    {
        let mut source = feed::from_config(&config.feed.source);
        let monitor = monitor.clone();
        let clock = clock.clone();
        log::info!(
            "Refreshing passes from {} every {}",
            source.describe(),
            humantime::format_duration(config.feed.refresh_interval)
        );
        feed_ticker.start(config.feed.refresh_interval, move || {
            feed::refresh(source.as_mut(), &monitor, clock.now());
        })?;
    }

    let mut alert_ticker = Ticker::new();
    {
        let monitor = monitor.clone();
        let clock = clock.clone();
        alert_ticker.start(config.alerts.tick_interval, move || {
            monitor.lock().unwrap().tick(clock.now());
        })?;
    }

    let web = config.web.clone();
    let state = AppState {
        config: Arc::new(config),
        settings,
        monitor,
    };

    let result = match web {
        Some(web) => {
            tokio::select! {
                r = run_server(&web.bind, state) => r,
                r = tokio::signal::ctrl_c() => r,
            }
        }
        None => tokio::signal::ctrl_c().await,
    };

    log::info!("Shutting down");
    alert_ticker.stop().await;
    feed_ticker.stop().await;
    result.map_err(ServiceError::from)
}
