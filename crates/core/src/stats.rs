//! Widget analytics batching
//!
//! Append-only stat events are buffered per widget and flushed through a
//! [`StatSink`] once the configured queue limit is reached. The queue is a
//! convenience, not a durability mechanism: a failed flush re-queues the
//! batch and the session keeps going.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use flowcal_domain::{Result, StatEvent};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

/// One flushed batch of stat events.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatBatch {
    pub widget_id: i64,
    pub user_id: i64,
    pub events: Vec<StatEvent>,
    pub counters: BTreeMap<String, u64>,
    pub total_events: usize,
    pub last_updated: DateTime<Utc>,
    pub batch_type: String,
}

/// Receiver for flushed stat batches.
pub trait StatSink: Send + Sync {
    fn submit(&self, batch: &StatBatch) -> Result<()>;
}

/// Sink that records batches to the structured log. Used whenever no host
/// analytics endpoint is wired up.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogStatSink;

impl StatSink for LogStatSink {
    fn submit(&self, batch: &StatBatch) -> Result<()> {
        info!(
            widget_id = batch.widget_id,
            total_events = batch.total_events,
            batch_type = %batch.batch_type,
            "stat batch flushed"
        );
        Ok(())
    }
}

#[derive(Default)]
struct RecorderState {
    queue: Vec<StatEvent>,
    counters: BTreeMap<String, u64>,
}

/// Per-widget stat queue with flush-at-limit semantics.
pub struct StatRecorder<S: StatSink> {
    widget_id: i64,
    user_id: i64,
    max_queue_size: usize,
    sink: S,
    state: Mutex<RecorderState>,
}

impl<S: StatSink> StatRecorder<S> {
    pub fn new(widget_id: i64, user_id: i64, max_queue_size: usize, sink: S) -> Self {
        Self {
            widget_id,
            user_id,
            max_queue_size: max_queue_size.max(1),
            sink,
            state: Mutex::new(RecorderState::default()),
        }
    }

    /// Record one event; flushes when the queue reaches the limit.
    pub fn track_event(&self, event_type: &str, metadata: Option<Value>) {
        let should_flush = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            let mut event = StatEvent::now(event_type, self.widget_id, self.user_id);
            if let Some(metadata) = metadata {
                event = event.with_metadata(metadata);
            }
            state.queue.push(event);
            *state.counters.entry(event_type.to_string()).or_insert(0) += 1;
            state.queue.len() >= self.max_queue_size
        };
        if should_flush {
            self.flush("queue_limit_reached");
        }
    }

    /// Flush everything queued so far. A failed submit re-queues the events
    /// and is logged; stats never interrupt widget operation.
    pub fn flush(&self, batch_type: &str) {
        let batch = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if state.queue.is_empty() {
                return;
            }
            let events = std::mem::take(&mut state.queue);
            StatBatch {
                widget_id: self.widget_id,
                user_id: self.user_id,
                total_events: events.len(),
                events,
                counters: state.counters.clone(),
                last_updated: Utc::now(),
                batch_type: batch_type.to_string(),
            }
        };

        if let Err(error) = self.sink.submit(&batch) {
            warn!(widget_id = self.widget_id, error = %error, "stat flush failed; re-queueing");
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            let mut requeued = batch.events;
            requeued.append(&mut state.queue);
            state.queue = requeued;
        }
    }

    /// Lifetime counters per event type.
    pub fn counters(&self) -> BTreeMap<String, u64> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).counters.clone()
    }

    /// Events currently waiting for a flush.
    pub fn queued(&self) -> usize {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).queue.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex as StdMutex};

    use flowcal_domain::WidgetError;

    use super::*;

    #[derive(Default, Clone)]
    struct RecordingSink {
        batches: Arc<StdMutex<Vec<StatBatch>>>,
        fail: Arc<StdMutex<bool>>,
    }

    impl StatSink for RecordingSink {
        fn submit(&self, batch: &StatBatch) -> Result<()> {
            if *self.fail.lock().unwrap() {
                return Err(WidgetError::Network("stat endpoint down".into()));
            }
            self.batches.lock().unwrap().push(batch.clone());
            Ok(())
        }
    }

    #[test]
    fn flushes_exactly_at_queue_limit() {
        let sink = RecordingSink::default();
        let recorder = StatRecorder::new(1, 10, 3, sink.clone());

        recorder.track_event("calendar_opened", None);
        recorder.track_event("task_created", None);
        assert!(sink.batches.lock().unwrap().is_empty());
        assert_eq!(recorder.queued(), 2);

        recorder.track_event("task_created", None);
        let batches = sink.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].total_events, 3);
        assert_eq!(batches[0].counters["task_created"], 2);
        assert_eq!(recorder.queued(), 0);
    }

    #[test]
    fn failed_flush_requeues_events() {
        let sink = RecordingSink::default();
        *sink.fail.lock().unwrap() = true;
        let recorder = StatRecorder::new(1, 10, 2, sink.clone());

        recorder.track_event("calendar_opened", None);
        recorder.track_event("task_created", None);
        assert_eq!(recorder.queued(), 2);

        *sink.fail.lock().unwrap() = false;
        recorder.flush("manual");
        assert_eq!(recorder.queued(), 0);
        assert_eq!(sink.batches.lock().unwrap().len(), 1);
    }

    #[test]
    fn counters_outlive_flushes() {
        let recorder = StatRecorder::new(1, 10, 1, LogStatSink);
        recorder.track_event("calendar_opened", None);
        recorder.track_event("calendar_opened", None);
        assert_eq!(recorder.counters()["calendar_opened"], 2);
        assert_eq!(recorder.queued(), 0);
    }
}
