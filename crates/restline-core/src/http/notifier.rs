//! Single-delivery completion
//!
//! [`Completion`] wraps the caller's callback behind a completed flag, so it
//! runs at most once no matter how many delivery attempts reach it.
//! [`CompletionNotifier`] fires the completion first and only then publishes
//! the same outcome on the notification bus.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use tracing::{trace, warn};
use url::Url;
use uuid::Uuid;

use crate::http::events::{CompletionEvent, NotificationBus};
use crate::types::{Method, Outcome};

type Callback = Box<dyn FnOnce(&Outcome) + Send>;

/// Once-guarded completion callback
pub struct Completion {
    completed: AtomicBool,
    callback: Mutex<Option<Callback>>,
}

impl Completion {
    pub fn new<F>(callback: F) -> Self
    where
        F: FnOnce(&Outcome) + Send + 'static,
    {
        Self {
            completed: AtomicBool::new(false),
            callback: Mutex::new(Some(Box::new(callback))),
        }
    }

    /// A completion without a callback; the outcome is only returned and published
    pub fn none() -> Self {
        Self {
            completed: AtomicBool::new(false),
            callback: Mutex::new(None),
        }
    }

    /// Run the callback if this completion has not fired yet.
    ///
    /// Returns `false` when it had already fired. A panicking callback still
    /// counts as fired.
    pub fn fire(&self, outcome: &Outcome) -> bool {
        if self.completed.swap(true, Ordering::AcqRel) {
            return false;
        }

        let callback = self
            .callback
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(callback) = callback {
            if panic::catch_unwind(AssertUnwindSafe(|| callback(outcome))).is_err() {
                warn!("Completion callback panicked");
            }
        }

        true
    }

    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("completed", &self.is_completed())
            .finish()
    }
}

/// Identity of one call, carried into its completion event
#[derive(Debug, Clone)]
pub struct CallContext {
    pub call_id: Uuid,
    pub method: Method,
    pub url: Option<Url>,
    pub started: Instant,
}

impl CallContext {
    pub fn new(method: Method) -> Self {
        Self {
            call_id: Uuid::new_v4(),
            method,
            url: None,
            started: Instant::now(),
        }
    }
}

/// Delivers outcomes to the caller and then to the bus
#[derive(Debug, Clone)]
pub struct CompletionNotifier {
    bus: Arc<NotificationBus>,
}

impl CompletionNotifier {
    pub fn new(bus: Arc<NotificationBus>) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &Arc<NotificationBus> {
        &self.bus
    }

    /// Fire `completion`, then publish one event, then hand the outcome back.
    ///
    /// If `completion` already fired nothing is published again.
    pub fn deliver(&self, call: CallContext, outcome: Outcome, completion: &Completion) -> Outcome {
        if !completion.fire(&outcome) {
            warn!(call_id = %call.call_id, "Completion already delivered; skipping notification");
            return outcome;
        }

        self.bus.publish(CompletionEvent {
            call_id: call.call_id,
            method: call.method,
            url: call.url,
            outcome: outcome.clone(),
            elapsed: call.started.elapsed(),
        });
        trace!(
            call_id = %call.call_id,
            channel = self.bus.name(),
            subscribers = self.bus.subscriber_count(),
            "Published completion"
        );

        outcome
    }
}
