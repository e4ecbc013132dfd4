use std::process::{Command, Stdio};

use super::{Notification, NotificationBackend, NotifyError, Permission};

const APP_NAME: &str = "pass-alert";
const DEFAULT_ICON: &str = "dialog-information";

/// Desktop notifications through a `notify-send` compatible program.
///
/// Permission is granted when the program can be run at all.
pub struct CommandNotifier {
    program: String,
    icon: Option<String>,
}

impl CommandNotifier {
    pub fn new(program: &str, icon: Option<String>) -> Self {
        Self {
            program: program.to_string(),
            icon,
        }
    }

    fn args(&self, notification: &Notification) -> Vec<String> {
        let icon = notification
            .icon
            .as_deref()
            .or(self.icon.as_deref())
            .unwrap_or(DEFAULT_ICON);

        let mut args = vec![
            format!("--app-name={}", APP_NAME),
            "--urgency=normal".to_string(),
            format!("--icon={}", icon),
        ];
        if notification.silent {
            args.push("--hint=boolean:suppress-sound:true".to_string());
        }
        args.push(notification.title.clone());
        args.push(notification.body.clone());
        args
    }
}

impl NotificationBackend for CommandNotifier {
    fn permission(&self) -> Permission {
        Permission::Undetermined
    }

    fn request_permission(&self) -> Permission {
        let probe = Command::new(&self.program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match probe {
            Ok(status) if status.success() => Permission::Granted,
            Ok(status) => {
                log::warn!("{} --version exited with {}", self.program, status);
                Permission::Denied
            }
            Err(e) => {
                log::warn!("Notification program {} unavailable: {}", self.program, e);
                Permission::Denied
            }
        }
    }

    fn show(&self, notification: &Notification) -> Result<(), NotifyError> {
        let status = Command::new(&self.program)
            .args(self.args(notification))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;

        if !status.success() {
            return Err(NotifyError::Failed {
                program: self.program.clone(),
                code: status.code().unwrap_or(-1),
            });
        }
        Ok(())
    }
}

/// Writes notifications to the log instead of the desktop.
pub struct LogNotifier;

impl NotificationBackend for LogNotifier {
    fn permission(&self) -> Permission {
        Permission::Granted
    }

    fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    fn show(&self, notification: &Notification) -> Result<(), NotifyError> {
        log::info!("[{}] {}", notification.title, notification.body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification() -> Notification {
        Notification {
            title: "Satellite Pass Alert".into(),
            body: "AO-91 pass in 2 minutes (45° max elevation)".into(),
            icon: None,
            silent: false,
        }
    }

    #[test]
    fn args_use_default_icon_and_normal_urgency() {
        let notifier = CommandNotifier::new("notify-send", None);
        let args = notifier.args(&notification());
        assert_eq!(
            args,
            vec![
                "--app-name=pass-alert",
                "--urgency=normal",
                "--icon=dialog-information",
                "Satellite Pass Alert",
                "AO-91 pass in 2 minutes (45° max elevation)",
            ]
        );
    }

    #[test]
    fn configured_icon_overrides_default() {
        let notifier = CommandNotifier::new("notify-send", Some("satellite".into()));
        assert!(notifier
            .args(&notification())
            .contains(&"--icon=satellite".to_string()));
    }

    #[test]
    fn missing_program_is_denied() {
        let notifier = CommandNotifier::new("/nonexistent/notify-send", None);
        assert_eq!(notifier.request_permission(), Permission::Denied);
        assert!(notifier.show(&notification()).is_err());
    }
}
