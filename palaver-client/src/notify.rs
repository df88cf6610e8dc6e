use tokio::sync::mpsc;

use crate::IntentKind;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Level {
    Success,
    Failure,
}

/// Transient user-facing message about the outcome of an intent
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Notification {
    pub level: Level,
    pub kind: IntentKind,
    pub message: &'static str,
}

impl Notification {
    pub fn success(kind: IntentKind) -> Notification {
        Notification {
            level: Level::Success,
            kind,
            message: kind.success_message(),
        }
    }

    pub fn failure(kind: IntentKind) -> Notification {
        Notification {
            level: Level::Failure,
            kind,
            message: kind.failure_message(),
        }
    }
}

/// Whatever displays notifications to the user
pub trait Notifier: Send + Sync {
    fn notify(&self, n: Notification);
}

/// Routes notifications to the log, for when nothing displays them
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, n: Notification) {
        match n.level {
            Level::Success => tracing::info!(kind = %n.kind, "{}", n.message),
            Level::Failure => tracing::warn!(kind = %n.kind, "{}", n.message),
        }
    }
}

impl Notifier for mpsc::UnboundedSender<Notification> {
    fn notify(&self, n: Notification) {
        if let Err(e) = self.send(n) {
            tracing::debug!(notification = ?e.0, "notification receiver is gone");
        }
    }
}
