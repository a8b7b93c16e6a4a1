//! Transient user-facing notifications.
//!
//! Every failed mutation or search emits exactly one notification so the
//! UI can show a toast and the user knows the backend rejected the change.
//! The channel is unbounded; a dropped receiver is tolerated (headless
//! use, tests).

use tokio::sync::mpsc;

/// Which subsystem produced the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Cart,
    Wishlist,
    Catalog,
    Order,
    Search,
}

/// A transient message for the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

/// Sending half, cloned into the service and search pipeline.
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl Notifier {
    /// Emit a failure notification. Silently dropped if nobody listens.
    pub fn error(&self, kind: NotificationKind, message: impl Into<String>) {
        let _ = self.tx.send(Notification {
            kind,
            message: message.into(),
        });
    }
}

/// Receiving half, held by the UI layer.
pub struct NotificationStream {
    rx: mpsc::UnboundedReceiver<Notification>,
}

impl NotificationStream {
    /// Wait for the next notification. `None` once all senders are gone.
    pub async fn recv(&mut self) -> Option<Notification> {
        self.rx.recv().await
    }

    /// Non-blocking poll for a pending notification.
    pub fn try_recv(&mut self) -> Option<Notification> {
        self.rx.try_recv().ok()
    }
}

/// Create a connected notifier/stream pair.
#[must_use]
pub fn channel() -> (Notifier, NotificationStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Notifier { tx }, NotificationStream { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_delivery_order() {
        let (notifier, mut stream) = channel();
        notifier.error(NotificationKind::Cart, "first");
        notifier.error(NotificationKind::Search, "second");

        let first = stream.try_recv().unwrap();
        assert_eq!(first.kind, NotificationKind::Cart);
        assert_eq!(first.message, "first");
        assert_eq!(stream.try_recv().unwrap().message, "second");
        assert!(stream.try_recv().is_none());
    }

    #[test]
    fn test_send_without_receiver_is_silent() {
        let (notifier, stream) = channel();
        drop(stream);
        // Must not panic
        notifier.error(NotificationKind::Wishlist, "ignored");
    }
}
