use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level { Success, Error }

/// A transient, user-visible message about the outcome of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self { Self { level: Level::Success, message: message.into() } }
    pub fn error(message: impl Into<String>) -> Self { Self { level: Level::Error, message: message.into() } }
}

pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, notification: Notification);
}

/// Emits notifications as log events only.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            Level::Success => tracing::info!(notice = %notification.message, "user notified"),
            Level::Error => tracing::warn!(notice = %notification.message, "user notified"),
        }
    }
}

/// Delivers every notification to both notifiers, left first.
impl<A: Notifier, B: Notifier> Notifier for (A, B) {
    fn notify(&self, notification: Notification) {
        self.0.notify(notification.clone());
        self.1.notify(notification);
    }
}

impl Notifier for UnboundedSender<Notification> {
    fn notify(&self, notification: Notification) {
        if self.send(notification).is_err() {
            tracing::debug!("notification dropped, receiver closed");
        }
    }
}
