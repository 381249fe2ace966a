//! Self-dismissing notification banner.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

/// How long a banner stays up.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

/// Holds at most one visible [`Notification`].
///
/// Each `show` starts a dismiss timer; a timer only clears the banner it was
/// started for, so a newer banner is never cut short by an older timer.
/// Must be used from within a tokio runtime.
#[derive(Clone)]
pub struct Notifier {
    current: Arc<watch::Sender<Option<Notification>>>,
    shown: Arc<AtomicU64>,
    ttl: Duration,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(NOTIFICATION_TTL)
    }
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            current: Arc::new(current),
            shown: Arc::new(AtomicU64::new(0)),
            ttl,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Notification>> {
        self.current.subscribe()
    }

    /// The banner currently visible, if any.
    pub fn current(&self) -> Option<Notification> {
        self.current.borrow().clone()
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(NotificationKind::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.show(NotificationKind::Error, message.into());
    }

    pub fn show(&self, kind: NotificationKind, message: String) {
        let ticket = self.shown.fetch_add(1, Ordering::SeqCst) + 1;
        self.current.send_replace(Some(Notification { kind, message }));

        let current = Arc::clone(&self.current);
        let shown = Arc::clone(&self.shown);
        let ttl = self.ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            current.send_if_modified(|banner| {
                if shown.load(Ordering::SeqCst) == ticket && banner.is_some() {
                    *banner = None;
                    true
                } else {
                    false
                }
            });
        });
    }
}
