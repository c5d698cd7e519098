//! Default platform adapter
//!
//! Gives every widget a working `save_config`/`subscribe`/`send_message`
//! even when no host platform is embedding it. Persistence is local-first:
//! the cache write and the in-memory config update always happen; the
//! upstream push runs only when the widget data carries a platform URL, and
//! its failure is absorbed into the returned [`SaveOutcome`] rather than
//! raised.

use std::sync::{Arc, Mutex, PoisonError};

use flowcal_domain::{apply_update, BusMessage, NodeUpdate, Result, WidgetConfig};
use serde::Serialize;
use tracing::{debug, warn};

use crate::bus::{EventBus, Subscription};
use crate::ports::{ConfigCache, PlatformPush};

/// What a `save_config` call accomplished.
///
/// Only the local write is load-bearing; the remote branch reports
/// best-effort replication so callers that care can observe it. The default
/// UI path ignores everything except an `Err`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveOutcome {
    /// Nothing was written: a pinned widget refused a position-only update.
    SkippedPinned,
    /// Local cache and in-memory config updated; no remote platform
    /// configured.
    Local,
    /// Local write plus acknowledged remote push.
    LocalAndRemote,
    /// Local write succeeded; the remote push failed and was logged. The
    /// local state stays authoritative for the running session.
    LocalRemoteFailed,
}

/// Host-facing side of one widget instance.
pub struct PlatformAdapter {
    widget: Arc<Mutex<WidgetConfig>>,
    bus: EventBus,
    cache: Arc<dyn ConfigCache>,
    push: Option<Arc<dyn PlatformPush>>,
    widget_id: i64,
    topic: String,
}

impl PlatformAdapter {
    /// Bind an adapter to a shared widget config reference.
    ///
    /// Adapters constructed independently for the same widget share the
    /// derived bus topic, so their subscribers see each other's messages.
    pub fn new(
        widget: Arc<Mutex<WidgetConfig>>,
        bus: EventBus,
        cache: Arc<dyn ConfigCache>,
        push: Option<Arc<dyn PlatformPush>>,
    ) -> Self {
        let widget_id = widget.lock().unwrap_or_else(PoisonError::into_inner).widget_id;
        let topic = flowcal_domain::constants::widget_topic(widget_id);
        Self { widget, bus, cache, push, widget_id, topic }
    }

    /// Current widget config snapshot.
    pub fn widget_config(&self) -> WidgetConfig {
        self.widget.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Merge `update` into the widget config and persist the result.
    ///
    /// Sequence: pin check, merge, in-memory update, cache write (failure
    /// logged, not raised), change broadcasts, optional upstream push.
    /// Concurrent calls are last-write-wins against whatever config value is
    /// current when each one merges.
    pub async fn save_config(&self, update: NodeUpdate) -> Result<SaveOutcome> {
        let mut update = update;

        let (snapshot, touched_position, touched_pin) = {
            let mut widget = self.widget.lock().unwrap_or_else(PoisonError::into_inner);

            // A pinned widget rejects position saves; unrelated parts of the
            // same update still apply.
            if widget.config.data.is_pinned && update.touches_position() {
                debug!(widget_id = self.widget_id, "position save rejected: widget is pinned");
                update.position = None;
                if update.is_empty() {
                    return Ok(SaveOutcome::SkippedPinned);
                }
            }

            let merged = apply_update(&widget, &update);
            *widget = merged.clone();
            (merged, update.touches_position(), update.touches_pin())
        };

        if let Err(error) = self.cache.store(self.widget_id, &snapshot.config).await {
            warn!(widget_id = self.widget_id, error = %error, "config cache write failed");
        }

        // Best-effort notifications to other widgets on the same bus; not an
        // acknowledgement of remote persistence.
        if touched_position {
            self.bus.broadcast(&BusMessage::position_updated(
                self.widget_id,
                snapshot.config.position,
            ));
        }
        if touched_pin {
            self.bus.broadcast(&BusMessage::widget_pinned(
                self.widget_id,
                snapshot.config.data.is_pinned,
            ));
        }

        let Some(push) = self.push.as_ref() else {
            return Ok(SaveOutcome::Local);
        };
        if snapshot.config.data.platform_api_url.is_none() {
            return Ok(SaveOutcome::Local);
        }
        match push.push_widget_config(&snapshot).await {
            Ok(()) => Ok(SaveOutcome::LocalAndRemote),
            Err(error) => {
                warn!(widget_id = self.widget_id, error = %error, "upstream config push failed");
                Ok(SaveOutcome::LocalRemoteFailed)
            }
        }
    }

    /// Subscribe to this widget's derived topic.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&BusMessage) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.bus.subscribe(self.topic.clone(), handler)
    }

    /// Send a message on this widget's derived topic.
    pub fn send_message(&self, message: &BusMessage) {
        self.bus.send_message(&self.topic, message);
    }

    /// Observability hook; size semantics are fully expressed by
    /// [`PlatformAdapter::save_config`].
    pub fn on_resize(&self, width: f64, height: f64) {
        debug!(widget_id = self.widget_id, width, height, "widget resized");
    }

    /// Observability hook; pin semantics are fully expressed by
    /// [`PlatformAdapter::save_config`].
    pub fn on_pin_toggle(&self, is_pinned: bool) {
        debug!(widget_id = self.widget_id, is_pinned, "widget pin toggled");
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}
