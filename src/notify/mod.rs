//! System notifications for pre-pass warnings.
//!
//! The emitter asks the backend for permission at most once per process
//! and only delivers while permission is granted. Delivery runs on a
//! background thread and its failures are logged, never returned.

mod backend;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::alerts::{AlertClass, AlertEvent};

pub use backend::{CommandNotifier, LogNotifier};

pub const NOTIFICATION_TITLE: &str = "Satellite Pass Alert";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to run notifier: {0}")]
    Io(#[from] std::io::Error),
    #[error("notifier `{program}` exited with code {code}")]
    Failed { program: String, code: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Undetermined,
    Granted,
    Denied,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// `None` lets the backend pick its default icon
    pub icon: Option<String>,
    pub silent: bool,
}

impl Notification {
    pub fn for_warning(event: &AlertEvent) -> Self {
        Self {
            title: NOTIFICATION_TITLE.to_string(),
            body: format!(
                "{} pass in {} minutes ({}° max elevation)",
                event.pass.name,
                event.minutes_until_aos(),
                event.pass.max_elevation
            ),
            icon: None,
            silent: false,
        }
    }
}

pub trait NotificationBackend: Send + Sync {
    /// Permission status before anything has been requested.
    fn permission(&self) -> Permission;
    fn request_permission(&self) -> Permission;
    fn show(&self, notification: &Notification) -> Result<(), NotifyError>;
}

pub struct NotificationEmitter {
    backend: Option<Arc<dyn NotificationBackend>>,
    permission: Mutex<Permission>,
    requested: AtomicBool,
}

impl NotificationEmitter {
    pub fn new(backend: Arc<dyn NotificationBackend>) -> Self {
        let permission = backend.permission();
        Self {
            backend: Some(backend),
            permission: Mutex::new(permission),
            requested: AtomicBool::new(false),
        }
    }

    pub fn disabled() -> Self {
        Self {
            backend: None,
            permission: Mutex::new(Permission::Denied),
            requested: AtomicBool::new(true),
        }
    }

    pub fn permission(&self) -> Permission {
        *self.permission.lock().unwrap()
    }

    /// Ask the backend for permission if the status is still undetermined and
    /// no request has been made yet in this process.
    pub fn ensure_permission(&self) -> Permission {
        // Held across the request so concurrent callers wait for the answer
        let mut permission = self.permission.lock().unwrap();
        if *permission != Permission::Undetermined || self.requested.swap(true, Ordering::SeqCst) {
            return *permission;
        }
        let Some(backend) = &self.backend else {
            return *permission;
        };

        *permission = backend.request_permission();
        log::info!("Notification permission: {:?}", *permission);
        *permission
    }

    /// Send the system notification for a warning alert. Other alert classes
    /// and missing permission are ignored.
    pub fn notify(&self, event: &AlertEvent) -> Option<JoinHandle<()>> {
        if event.class != AlertClass::Warning {
            return None;
        }
        if self.ensure_permission() != Permission::Granted {
            log::debug!("Notifications not permitted, skipping {}", event.pass.name);
            return None;
        }
        let backend = self.backend.clone()?;
        let notification = Notification::for_warning(event);

        let spawned = thread::Builder::new()
            .name("notify".into())
            .spawn(move || {
                if let Err(e) = backend.show(&notification) {
                    log::warn!("Failed to show notification: {}", e);
                }
            });

        match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("Failed to start notification thread: {}", e);
                None
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::testing::RecordingNotifier;
    use super::*;
    use crate::alerts::SatellitePass;

    fn warning_event() -> AlertEvent {
        let aos = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let pass = SatellitePass::new("ISS", aos, aos + Duration::minutes(10), 70.0);
        AlertEvent::new(AlertClass::Warning, &pass, aos - Duration::seconds(299))
    }

    #[test]
    fn body_names_pass_minutes_and_elevation() {
        let n = Notification::for_warning(&warning_event());
        assert_eq!(n.title, "Satellite Pass Alert");
        assert_eq!(n.body, "ISS pass in 5 minutes (70° max elevation)");
        assert!(!n.silent);
        assert!(n.icon.is_none());
    }

    #[test]
    fn requests_permission_once() {
        let (backend, rx) = RecordingNotifier::new(Permission::Undetermined, Permission::Granted);
        let emitter = NotificationEmitter::new(backend.clone());

        assert_eq!(emitter.ensure_permission(), Permission::Granted);
        emitter.notify(&warning_event()).unwrap().join().unwrap();
        emitter.notify(&warning_event()).unwrap().join().unwrap();

        assert_eq!(backend.requests.load(Ordering::SeqCst), 1);
        assert_eq!(rx.try_iter().count(), 2);
    }

    #[test]
    fn denied_permission_is_never_requested_again() {
        let (backend, rx) = RecordingNotifier::new(Permission::Undetermined, Permission::Denied);
        let emitter = NotificationEmitter::new(backend.clone());

        assert!(emitter.notify(&warning_event()).is_none());
        assert!(emitter.notify(&warning_event()).is_none());
        assert_eq!(emitter.ensure_permission(), Permission::Denied);

        assert_eq!(backend.requests.load(Ordering::SeqCst), 1);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn previously_denied_backend_is_not_asked() {
        let (backend, _rx) = RecordingNotifier::new(Permission::Denied, Permission::Granted);
        let emitter = NotificationEmitter::new(backend.clone());

        assert!(emitter.notify(&warning_event()).is_none());
        assert_eq!(backend.requests.load(Ordering::SeqCst), 0);
    }

    /// Takes a while to answer, like a desktop permission prompt.
    struct SlowPrompt(Arc<RecordingNotifier>);

    impl NotificationBackend for SlowPrompt {
        fn permission(&self) -> Permission {
            self.0.permission()
        }

        fn request_permission(&self) -> Permission {
            std::thread::sleep(std::time::Duration::from_millis(100));
            self.0.request_permission()
        }

        fn show(&self, notification: &Notification) -> Result<(), NotifyError> {
            self.0.show(notification)
        }
    }

    #[test]
    fn concurrent_first_warnings_wait_for_the_prompt() {
        let (backend, rx) = RecordingNotifier::new(Permission::Undetermined, Permission::Granted);
        let emitter = Arc::new(NotificationEmitter::new(Arc::new(SlowPrompt(backend.clone()))));

        let senders: Vec<_> = (0..2)
            .map(|_| {
                let emitter = emitter.clone();
                std::thread::spawn(move || emitter.notify(&warning_event()).map(|h| h.join()))
            })
            .collect();
        for sender in senders {
            assert!(sender.join().unwrap().is_some());
        }

        assert_eq!(backend.requests.load(Ordering::SeqCst), 1);
        assert_eq!(rx.try_iter().count(), 2);
    }

    #[test]
    fn active_alerts_do_not_notify() {
        let (backend, _rx) = RecordingNotifier::new(Permission::Granted, Permission::Granted);
        let emitter = NotificationEmitter::new(backend);

        let mut event = warning_event();
        event.class = AlertClass::Active;
        assert!(emitter.notify(&event).is_none());
    }

    #[test]
    fn disabled_emitter_is_inert() {
        let emitter = NotificationEmitter::disabled();
        assert_eq!(emitter.ensure_permission(), Permission::Denied);
        assert!(emitter.notify(&warning_event()).is_none());
    }
}
