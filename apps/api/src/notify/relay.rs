//! Application-scoped notification relay.
//!
//! Created once in `main` and handed to whoever needs to raise a transient
//! success/error message. Observers are called synchronously on every change
//! with a snapshot of the live notifications. Each notification dismisses
//! itself after its lifetime when a tokio runtime is available; otherwise
//! `sweep_expired` does the same job on demand.

use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(pub u64);

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
    pub lifetime_ms: u64,
}

impl Notification {
    fn expires_at(&self) -> DateTime<Utc> {
        self.created_at + chrono::Duration::milliseconds(self.lifetime_ms as i64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Arc<dyn Fn(&[Notification]) + Send + Sync>;

#[derive(Default)]
struct Inner {
    next_id: u64,
    next_subscription: u64,
    queue: Vec<Notification>,
    observers: Vec<(SubscriptionId, Observer)>,
    closed: bool,
}

#[derive(Clone)]
pub struct NotificationRelay {
    inner: Arc<Mutex<Inner>>,
    default_lifetime: Duration,
}

impl NotificationRelay {
    pub fn new(default_lifetime: Duration) -> Self {
        NotificationRelay {
            inner: Arc::new(Mutex::new(Inner::default())),
            default_lifetime,
        }
    }

    pub fn success(&self, message: impl Into<String>) -> Option<NotificationId> {
        self.publish(message, Severity::Success)
    }

    pub fn error(&self, message: impl Into<String>) -> Option<NotificationId> {
        self.publish(message, Severity::Error)
    }

    pub fn publish(&self, message: impl Into<String>, severity: Severity) -> Option<NotificationId> {
        self.publish_for(message, severity, self.default_lifetime)
    }

    /// Queues a notification and notifies observers before returning.
    /// Returns `None` once the relay has been shut down.
    pub fn publish_for(
        &self,
        message: impl Into<String>,
        severity: Severity,
        lifetime: Duration,
    ) -> Option<NotificationId> {
        let message = message.into();
        let (id, snapshot, observers) = {
            let mut inner = self.inner.lock();
            if inner.closed {
                debug!("Relay closed; dropping notification '{message}'");
                return None;
            }
            inner.next_id += 1;
            let id = NotificationId(inner.next_id);
            inner.queue.push(Notification {
                id,
                message,
                severity,
                created_at: Utc::now(),
                lifetime_ms: lifetime.as_millis() as u64,
            });
            (id, inner.queue.clone(), observers_of(&inner))
        };
        notify(&observers, &snapshot);
        self.schedule_expiry(id, lifetime);
        Some(id)
    }

    fn schedule_expiry(&self, id: NotificationId, lifetime: Duration) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let weak: Weak<Mutex<Inner>> = Arc::downgrade(&self.inner);
        handle.spawn(async move {
            tokio::time::sleep(lifetime).await;
            if let Some(inner) = weak.upgrade() {
                dismiss_in(&inner, id);
            }
        });
    }

    /// Registers an observer. It is called with the current notifications
    /// on every publish and dismissal until unsubscribed.
    pub fn subscribe(
        &self,
        observer: impl Fn(&[Notification]) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let mut inner = self.inner.lock();
        inner.next_subscription += 1;
        let id = SubscriptionId(inner.next_subscription);
        inner.observers.push((id, Arc::new(observer)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.observers.len();
        inner.observers.retain(|(sub, _)| *sub != id);
        inner.observers.len() != before
    }

    pub fn dismiss(&self, id: NotificationId) -> bool {
        dismiss_in(&self.inner, id)
    }

    /// Removes every notification whose lifetime has ended by `now`.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let (removed, snapshot, observers) = {
            let mut inner = self.inner.lock();
            let before = inner.queue.len();
            inner.queue.retain(|n| n.expires_at() > now);
            let removed = before - inner.queue.len();
            (removed, inner.queue.clone(), observers_of(&inner))
        };
        if removed > 0 {
            notify(&observers, &snapshot);
        }
        removed
    }

    pub fn pending(&self) -> Vec<Notification> {
        self.inner.lock().queue.clone()
    }

    #[cfg(test)]
    pub fn observer_count(&self) -> usize {
        self.inner.lock().observers.len()
    }

    /// Teardown: drops pending notifications and observers. Later publishes
    /// are ignored.
    pub fn shutdown(&self) {
        let mut inner = self.inner.lock();
        inner.closed = true;
        inner.queue.clear();
        inner.observers.clear();
        debug!("Notification relay shut down");
    }
}

fn observers_of(inner: &Inner) -> Vec<Observer> {
    inner.observers.iter().map(|(_, o)| Arc::clone(o)).collect()
}

// Observers run with the lock released so they may publish or dismiss.
fn notify(observers: &[Observer], snapshot: &[Notification]) {
    for observer in observers {
        observer(snapshot);
    }
}

fn dismiss_in(inner: &Mutex<Inner>, id: NotificationId) -> bool {
    let (snapshot, observers) = {
        let mut guard = inner.lock();
        let Some(index) = guard.queue.iter().position(|n| n.id == id) else {
            return false;
        };
        guard.queue.remove(index);
        (guard.queue.clone(), observers_of(&guard))
    };
    notify(&observers, &snapshot);
    true
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn relay() -> NotificationRelay {
        NotificationRelay::new(Duration::from_millis(3000))
    }

    #[test]
    fn test_publish_notifies_observers_synchronously() {
        let relay = relay();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        relay.subscribe(move |queue| {
            counter.store(queue.len(), Ordering::SeqCst);
        });

        relay.success("Template copied");
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        relay.error("Copy failed");
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_duplicates_stack() {
        let relay = relay();
        relay.success("Saved");
        relay.success("Saved");
        let pending = relay.pending();
        assert_eq!(pending.len(), 2);
        assert_ne!(pending[0].id, pending[1].id);
    }

    #[test]
    fn test_unsubscribed_observer_is_not_called() {
        let relay = relay();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let sub = relay.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        relay.success("one");
        assert!(relay.unsubscribe(sub));
        relay.success("two");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!relay.unsubscribe(sub));
    }

    #[test]
    fn test_dismiss_removes_immediately() {
        let relay = relay();
        let id = relay.success("Saved").unwrap();
        assert!(relay.dismiss(id));
        assert!(relay.pending().is_empty());
        assert!(!relay.dismiss(id));
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let relay = relay();
        relay.publish_for("short", Severity::Success, Duration::from_millis(100));
        relay.publish_for("long", Severity::Success, Duration::from_secs(60));
        let removed = relay.sweep_expired(Utc::now() + chrono::Duration::seconds(5));
        assert_eq!(removed, 1);
        assert_eq!(relay.pending()[0].message, "long");
    }

    #[test]
    fn test_observer_may_publish_without_deadlock() {
        let relay = relay();
        let inner_relay = relay.clone();
        relay.subscribe(move |queue| {
            if queue.len() == 1 {
                inner_relay.error("follow-up");
            }
        });
        relay.success("first");
        assert_eq!(relay.pending().len(), 2);
    }

    #[test]
    fn test_shutdown_clears_and_closes() {
        let relay = relay();
        relay.subscribe(|_| {});
        relay.success("pending");
        relay.shutdown();
        assert!(relay.pending().is_empty());
        assert_eq!(relay.observer_count(), 0);
        assert!(relay.success("late").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_notifications_auto_dismiss_after_lifetime() {
        let relay = relay();
        relay.success("Saved");
        tokio::time::sleep(Duration::from_millis(2999)).await;
        assert_eq!(relay.pending().len(), 1);
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(relay.pending().is_empty());
    }
}
