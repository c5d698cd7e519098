//! Process-local event bus shared by mounted widget instances
//!
//! Stateless fan-out registry: handlers are registered under string topics
//! and invoked synchronously, in registration order, when a message is sent.
//! There is no queuing and no backpressure; slow handlers block the sender.
//!
//! The bus is an explicitly constructed value shared via `Arc` internally.
//! Clone it freely and thread it through whatever owns the widgets; two
//! independently created buses never cross-talk.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use flowcal_domain::BusMessage;
use tracing::{debug, warn};

/// Handler invoked for every message on a subscribed topic.
///
/// A returned error is logged and does not prevent delivery to handlers
/// registered after this one.
pub type BusHandler = dyn Fn(&BusMessage) -> anyhow::Result<()> + Send + Sync;

struct Registration {
    token: u64,
    handler: Arc<BusHandler>,
}

#[derive(Default)]
struct BusInner {
    topics: Mutex<HashMap<String, Vec<Registration>>>,
    next_token: AtomicU64,
}

impl BusInner {
    fn remove(&self, topic: &str, token: u64) {
        let mut topics = self.topics.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(registrations) = topics.get_mut(topic) {
            registrations.retain(|registration| registration.token != token);
            // Drop empty topic entries so the registry never grows unbounded.
            if registrations.is_empty() {
                topics.remove(topic);
            }
        }
    }
}

/// In-memory publish/subscribe bus keyed by widget topic.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `topic`.
    ///
    /// Registrations are never deduplicated: subscribing the same closure
    /// twice yields two deliveries per message. The returned
    /// [`Subscription`] removes exactly this registration, either explicitly
    /// or when dropped.
    pub fn subscribe<F>(&self, topic: impl Into<String>, handler: F) -> Subscription
    where
        F: Fn(&BusMessage) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let topic = topic.into();
        let token = self.inner.next_token.fetch_add(1, Ordering::Relaxed);
        {
            let mut topics = self.inner.topics.lock().unwrap_or_else(PoisonError::into_inner);
            topics
                .entry(topic.clone())
                .or_default()
                .push(Registration { token, handler: Arc::new(handler) });
        }
        debug!(topic, token, "bus subscription registered");
        Subscription { bus: Arc::downgrade(&self.inner), topic, token, active: AtomicBool::new(true) }
    }

    /// Deliver `message` to every handler currently registered for `topic`,
    /// in registration order. Completes all invocations before returning.
    pub fn send_message(&self, topic: &str, message: &BusMessage) {
        let handlers = {
            let topics = self.inner.topics.lock().unwrap_or_else(PoisonError::into_inner);
            topics
                .get(topic)
                .map(|registrations| {
                    registrations
                        .iter()
                        .map(|registration| Arc::clone(&registration.handler))
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        };
        deliver(topic, &handlers, message);
    }

    /// Deliver `message` to every handler across every topic.
    pub fn broadcast(&self, message: &BusMessage) {
        let snapshot = {
            let topics = self.inner.topics.lock().unwrap_or_else(PoisonError::into_inner);
            topics
                .iter()
                .map(|(topic, registrations)| {
                    let handlers = registrations
                        .iter()
                        .map(|registration| Arc::clone(&registration.handler))
                        .collect::<Vec<_>>();
                    (topic.clone(), handlers)
                })
                .collect::<Vec<_>>()
        };
        for (topic, handlers) in snapshot {
            deliver(&topic, &handlers, message);
        }
    }

    /// Number of handlers currently registered for `topic`.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        let topics = self.inner.topics.lock().unwrap_or_else(PoisonError::into_inner);
        topics.get(topic).map_or(0, Vec::len)
    }

    /// Number of topics with at least one handler.
    pub fn topic_count(&self) -> usize {
        let topics = self.inner.topics.lock().unwrap_or_else(PoisonError::into_inner);
        topics.len()
    }
}

// Invocation happens outside the registry lock so handlers can subscribe or
// unsubscribe re-entrantly.
fn deliver(topic: &str, handlers: &[Arc<BusHandler>], message: &BusMessage) {
    for handler in handlers {
        if let Err(error) = handler(message) {
            warn!(topic, error = %error, "bus handler failed; continuing delivery");
        }
    }
}

/// Scoped registration handle returned by [`EventBus::subscribe`].
///
/// Dropping the handle releases the registration on every exit path;
/// [`Subscription::unsubscribe`] is idempotent and may be called ahead of
/// the drop.
pub struct Subscription {
    bus: Weak<BusInner>,
    topic: String,
    token: u64,
    active: AtomicBool,
}

impl Subscription {
    /// Remove exactly this registration. Safe to call more than once; other
    /// subscribers are unaffected.
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(inner) = self.bus.upgrade() {
            inner.remove(&self.topic, self.token);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use serde_json::json;

    use super::*;

    fn recording_handler(
        log: &Arc<StdMutex<Vec<String>>>,
        tag: &str,
    ) -> impl Fn(&BusMessage) -> anyhow::Result<()> + Send + Sync + 'static {
        let log = Arc::clone(log);
        let tag = tag.to_string();
        move |_message| {
            log.lock().unwrap().push(tag.clone());
            Ok(())
        }
    }

    #[test]
    fn topics_are_isolated() {
        let bus = EventBus::new();
        let log = Arc::new(StdMutex::new(Vec::new()));
        let _sub = bus.subscribe("calendar-1", recording_handler(&log, "one"));

        bus.send_message("calendar-2", &BusMessage::custom(json!({"type": "PING"})));
        assert!(log.lock().unwrap().is_empty());

        bus.send_message("calendar-1", &BusMessage::custom(json!({"type": "PING"})));
        assert_eq!(*log.lock().unwrap(), vec!["one"]);
    }

    #[test]
    fn handler_failure_does_not_stop_delivery() {
        let bus = EventBus::new();
        let log = Arc::new(StdMutex::new(Vec::new()));
        let _failing = bus.subscribe("calendar-1", |_message| anyhow::bail!("handler exploded"));
        let _second = bus.subscribe("calendar-1", recording_handler(&log, "after"));

        bus.send_message("calendar-1", &BusMessage::custom(json!({"type": "PING"})));
        assert_eq!(*log.lock().unwrap(), vec!["after"]);
    }

    #[test]
    fn delivery_follows_registration_order() {
        let bus = EventBus::new();
        let log = Arc::new(StdMutex::new(Vec::new()));
        let _a = bus.subscribe("calendar-1", recording_handler(&log, "a"));
        let _b = bus.subscribe("calendar-1", recording_handler(&log, "b"));
        let _c = bus.subscribe("calendar-1", recording_handler(&log, "c"));

        bus.send_message("calendar-1", &BusMessage::custom(json!({"type": "PING"})));
        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn duplicate_registrations_deliver_twice() {
        let bus = EventBus::new();
        let log = Arc::new(StdMutex::new(Vec::new()));
        let _first = bus.subscribe("calendar-1", recording_handler(&log, "dup"));
        let _second = bus.subscribe("calendar-1", recording_handler(&log, "dup"));

        bus.send_message("calendar-1", &BusMessage::custom(json!({"type": "PING"})));
        assert_eq!(*log.lock().unwrap(), vec!["dup", "dup"]);
    }

    #[test]
    fn unsubscribe_is_idempotent_and_scoped() {
        let bus = EventBus::new();
        let log = Arc::new(StdMutex::new(Vec::new()));
        let first = bus.subscribe("calendar-1", recording_handler(&log, "first"));
        let _second = bus.subscribe("calendar-1", recording_handler(&log, "second"));

        first.unsubscribe();
        first.unsubscribe();
        assert!(!first.is_active());

        bus.send_message("calendar-1", &BusMessage::custom(json!({"type": "PING"})));
        assert_eq!(*log.lock().unwrap(), vec!["second"]);
    }

    #[test]
    fn dropping_the_handle_releases_the_registration() {
        let bus = EventBus::new();
        let log = Arc::new(StdMutex::new(Vec::new()));
        {
            let _scoped = bus.subscribe("calendar-1", recording_handler(&log, "scoped"));
            assert_eq!(bus.subscriber_count("calendar-1"), 1);
        }
        assert_eq!(bus.subscriber_count("calendar-1"), 0);

        bus.send_message("calendar-1", &BusMessage::custom(json!({"type": "PING"})));
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn empty_topics_are_removed() {
        let bus = EventBus::new();
        let log = Arc::new(StdMutex::new(Vec::new()));
        let sub = bus.subscribe("calendar-9", recording_handler(&log, "only"));
        assert_eq!(bus.topic_count(), 1);

        sub.unsubscribe();
        assert_eq!(bus.topic_count(), 0);
    }

    #[test]
    fn broadcast_reaches_every_topic() {
        let bus = EventBus::new();
        let log = Arc::new(StdMutex::new(Vec::new()));
        let _one = bus.subscribe("calendar-1", recording_handler(&log, "one"));
        let _two = bus.subscribe("calendar-2", recording_handler(&log, "two"));

        bus.broadcast(&BusMessage::widget_pinned(1, true));
        let mut seen = log.lock().unwrap().clone();
        seen.sort();
        assert_eq!(seen, vec!["one", "two"]);
    }
}
