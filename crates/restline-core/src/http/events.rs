//! Completion notification bus
//!
//! Every finished call publishes one [`CompletionEvent`] on the bus it was
//! constructed with. The bus is fan-out over [`tokio::sync::broadcast`]:
//! publishing with no subscribers is not an error, and slow subscribers skip
//! what they lagged behind on.
//!
//! The bus lives as long as its last `Arc`. Create one at startup and hand it
//! to each [`Client`](crate::http::Client) that should report on it; once
//! every handle is gone, subscriptions see the channel close.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::broadcast;
use url::Url;
use uuid::Uuid;

use crate::types::{Method, Outcome};

/// Name of the completion notification channel
pub const RESPONSE_NOTIFICATION: &str = "restline.client.response";

/// Default channel capacity
pub const DEFAULT_CAPACITY: usize = 256;

/// Published once per completed call
#[derive(Debug, Clone)]
pub struct CompletionEvent {
    pub call_id: Uuid,
    pub method: Method,
    /// Resolved URL; `None` when resolution itself failed
    pub url: Option<Url>,
    pub outcome: Outcome,
    pub elapsed: Duration,
}

impl CompletionEvent {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Broadcast bus for completion events
#[derive(Debug)]
pub struct NotificationBus {
    name: &'static str,
    sender: broadcast::Sender<CompletionEvent>,
    published: AtomicU64,
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl NotificationBus {
    /// Create a bus named [`RESPONSE_NOTIFICATION`] with the given capacity.
    ///
    /// A capacity of zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            name: RESPONSE_NOTIFICATION,
            sender,
            published: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Publish an event to all current subscribers
    pub fn publish(&self, event: CompletionEvent) {
        self.published.fetch_add(1, Ordering::Relaxed);
        // No receivers is fine.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Total events published since creation
    #[must_use]
    pub fn published_count(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Receiving end of a [`NotificationBus`]
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<CompletionEvent>,
}

impl Subscription {
    /// Wait for the next event; `None` once the bus is gone
    pub async fn recv(&mut self) -> Option<CompletionEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next event if one is already queued
    pub fn try_recv(&mut self) -> Option<CompletionEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::Arc;

    fn event(method: Method) -> CompletionEvent {
        CompletionEvent {
            call_id: Uuid::new_v4(),
            method,
            url: None,
            outcome: Err(Error::decode("x")),
            elapsed: Duration::from_millis(1),
        }
    }

    #[test]
    fn publish_without_subscribers_does_not_panic() {
        let bus = NotificationBus::new(4);
        bus.publish(event(Method::Get));
        assert_eq!(bus.published_count(), 1);
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.name(), RESPONSE_NOTIFICATION);
    }

    #[test]
    fn every_subscriber_sees_each_event() {
        let bus = NotificationBus::new(4);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.publish(event(Method::Put));

        assert_eq!(first.try_recv().map(|e| e.method), Some(Method::Put));
        assert_eq!(second.try_recv().map(|e| e.method), Some(Method::Put));
        assert!(first.try_recv().is_none());
    }

    #[test]
    fn lagging_subscriber_skips_to_retained_events() {
        let bus = NotificationBus::new(2);
        let mut sub = bus.subscribe();

        bus.publish(event(Method::Get));
        bus.publish(event(Method::Post));
        bus.publish(event(Method::Delete));

        assert_eq!(sub.try_recv().map(|e| e.method), Some(Method::Post));
        assert_eq!(sub.try_recv().map(|e| e.method), Some(Method::Delete));
        assert!(sub.try_recv().is_none());
    }

    #[tokio::test]
    async fn recv_returns_none_after_bus_dropped() {
        let bus = Arc::new(NotificationBus::default());
        let mut sub = bus.subscribe();
        drop(bus);
        assert!(sub.recv().await.is_none());
    }
}
