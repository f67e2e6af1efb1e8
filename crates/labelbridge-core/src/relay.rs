// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Status/event relay: the single owner of the current printer status.
//
// Providers and the facade share one `Arc<StatusRelay>`. Every status change
// is stored (last write wins), emitted as `StatusUpdated` to each event sink
// and handed to each subscribed listener. A listener or sink that panics is
// logged and skipped; nothing propagates back into the provider.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, info, warn};

use crate::events::{BridgeEvent, EventSink};
use crate::status::StatusKind;

/// Callback receiving the rendered status text.
pub type StatusListener = Arc<dyn Fn(&str) + Send + Sync>;

/// Handle returned by [`StatusRelay::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub struct StatusRelay {
    status: Mutex<StatusKind>,
    listeners: Mutex<Vec<(SubscriptionId, StatusListener)>>,
    sinks: Mutex<Vec<Arc<dyn EventSink>>>,
    next_id: AtomicU64,
}

/// Status state is a plain value, so a poisoned lock still holds usable data.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl StatusRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current status.
    pub fn status(&self) -> StatusKind {
        lock(&self.status).clone()
    }

    /// Current status rendered for the host.
    pub fn status_text(&self) -> String {
        self.status().to_string()
    }

    /// Replace the current status and notify sinks and listeners.
    pub fn set_status(&self, status: StatusKind) {
        let text = status.to_string();
        *lock(&self.status) = status;
        info!(status = %text, "printer status updated");

        self.emit(&BridgeEvent::StatusUpdated {
            status: text.clone(),
        });

        // Snapshot so listeners may call back into the relay.
        let listeners: Vec<StatusListener> = lock(&self.listeners)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            deliver(&listener, &text);
        }
    }

    /// Register a listener for future status changes.
    pub fn subscribe(&self, listener: StatusListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.listeners).push((id, listener));
        debug!(subscription = id.0, "status listener subscribed");
        id
    }

    /// Register a listener and hand it the current status straight away.
    pub fn subscribe_and_notify(&self, listener: StatusListener) -> SubscriptionId {
        let id = self.subscribe(Arc::clone(&listener));
        deliver(&listener, &self.status_text());
        id
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = lock(&self.listeners);
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }

    /// Attach an outbound event sink.
    pub fn add_sink(&self, sink: Arc<dyn EventSink>) {
        lock(&self.sinks).push(sink);
    }

    /// Emit an `onError` event.
    pub fn log_error(&self, source: &str, message: &str) {
        error!(source, message, "provider error");
        self.emit(&BridgeEvent::Error {
            source: source.into(),
            message: message.into(),
        });
    }

    /// Emit an `onEvent` diagnostic event.
    pub fn log_event(&self, event_type: &str, source: &str, message: &str) {
        info!(event_type, source, message, "provider event");
        self.emit(&BridgeEvent::Event {
            event_type: event_type.into(),
            source: source.into(),
            message: message.into(),
        });
    }

    fn emit(&self, event: &BridgeEvent) {
        let sinks: Vec<Arc<dyn EventSink>> = lock(&self.sinks).iter().cloned().collect();
        for sink in sinks {
            if panic::catch_unwind(AssertUnwindSafe(|| sink.emit(event))).is_err() {
                warn!(event = event.name(), "event sink panicked; event dropped for it");
            }
        }
    }
}

fn deliver(listener: &StatusListener, text: &str) {
    if panic::catch_unwind(AssertUnwindSafe(|| listener(text))).is_err() {
        warn!("status listener panicked; ignoring");
    }
}
