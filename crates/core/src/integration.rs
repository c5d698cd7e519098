//! Integration resolver - the composition root
//!
//! Given one `WidgetConfig`, produce one [`CalendarNodeData`]: the resolved,
//! ready-to-render bag of display fields, domain callbacks, and platform
//! functions. Resolution itself performs no I/O; every network call is
//! deferred to callback invocation.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use flowcal_domain::constants::DEFAULT_API_BASE_URL;
use flowcal_domain::{
    BusMessage, CalendarEvent, CalendarView, NodeUpdate, Result, ServerTask, TaskDraft,
    WidgetConfig, WidgetError,
};
use tracing::debug;

use crate::bus::{EventBus, Subscription};
use crate::platform::{PlatformAdapter, SaveOutcome};
use crate::ports::{ConfigCache, PlatformPushFactory, TaskGateway, TaskGatewayFactory};

/// Resolves raw widget configuration records into runtime data bags.
///
/// One resolver per mounted application; it owns the shared bus, the cache,
/// and the client factories, and hands each widget its own adapter.
pub struct IntegrationResolver {
    bus: EventBus,
    cache: Arc<dyn ConfigCache>,
    tasks: Arc<dyn TaskGatewayFactory>,
    platform: Arc<dyn PlatformPushFactory>,
}

impl IntegrationResolver {
    pub fn new(
        bus: EventBus,
        cache: Arc<dyn ConfigCache>,
        tasks: Arc<dyn TaskGatewayFactory>,
        platform: Arc<dyn PlatformPushFactory>,
    ) -> Self {
        Self { bus, cache, tasks, platform }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Replace `widget.config` with the cached node from a previous session,
    /// if one exists. Returns whether a cached node was applied.
    pub async fn rehydrate(&self, widget: &mut WidgetConfig) -> Result<bool> {
        match self.cache.load(widget.widget_id).await? {
            Some(node) => {
                debug!(widget_id = widget.widget_id, "rehydrated widget config from cache");
                widget.config = node;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Resolve a raw host record. `None` or JSON `null` is the one mandatory
    /// precondition failure: widget construction must abort rather than
    /// render with defaults.
    pub fn resolve_raw(&self, raw: Option<serde_json::Value>) -> Result<CalendarNodeData> {
        let value = match raw {
            Some(value) if !value.is_null() => value,
            _ => {
                return Err(WidgetError::Configuration(
                    "widget config record is missing".to_string(),
                ))
            }
        };
        let widget: WidgetConfig = serde_json::from_value(value)
            .map_err(|error| WidgetError::Configuration(error.to_string()))?;
        self.resolve(widget)
    }

    /// Produce the runtime data bag for one widget mount.
    ///
    /// Domain callbacks always go through the standalone task gateway bound
    /// to the widget's backend URL; only persistence of widget state is ever
    /// delegated to a host platform.
    pub fn resolve(&self, widget: WidgetConfig) -> Result<CalendarNodeData> {
        let widget_id = widget.widget_id;
        let data = &widget.config.data;

        let api_base_url =
            data.api_base_url.clone().unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let tasks = self.tasks.task_gateway(&api_base_url)?;

        let push = match data.platform_api_url.as_deref() {
            Some(url) => Some(self.platform.platform_push(url)?),
            None => None,
        };

        let label = data.label.clone().unwrap_or_else(|| format!("Calendar {widget_id}"));
        let is_pinned = data.is_pinned;
        let events = data.events.clone();
        let current_view = data.current_view.unwrap_or_default();
        let current_date = data.current_date.unwrap_or_else(Utc::now);
        let width = data.width;
        let height = data.height;

        let widget = Arc::new(Mutex::new(widget));
        let platform =
            PlatformAdapter::new(Arc::clone(&widget), self.bus.clone(), Arc::clone(&self.cache), push);

        debug!(widget_id, %api_base_url, "widget resolved");
        Ok(CalendarNodeData {
            label,
            api_base_url,
            is_pinned,
            events,
            current_view,
            current_date,
            width,
            height,
            widget,
            tasks,
            platform,
        })
    }
}

/// The resolved, ready-to-render object produced once per widget mount.
///
/// Created exactly once by the resolver and treated as immutable by the
/// rendering layer: state changes are expressed as `save_config` calls,
/// never as mutation of the bag. A fresh bag is produced only on remount or
/// explicit config refresh.
pub struct CalendarNodeData {
    pub label: String,
    pub api_base_url: String,
    pub is_pinned: bool,
    pub events: Vec<CalendarEvent>,
    pub current_view: CalendarView,
    pub current_date: DateTime<Utc>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    widget: Arc<Mutex<WidgetConfig>>,
    tasks: Arc<dyn TaskGateway>,
    platform: PlatformAdapter,
}

impl CalendarNodeData {
    /// Snapshot of the originating widget config, reflecting every save made
    /// since the mount.
    pub fn widget_config(&self) -> WidgetConfig {
        self.widget.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub async fn on_event_create(&self, draft: &TaskDraft) -> Result<ServerTask> {
        self.tasks.create_task(draft).await
    }

    pub async fn on_event_update(&self, task_id: i64, draft: &TaskDraft) -> Result<ServerTask> {
        self.tasks.update_task(task_id, draft).await
    }

    pub async fn on_event_delete(&self, task_id: i64) -> Result<()> {
        self.tasks.delete_task(task_id).await
    }

    /// Re-derive calendar entries from the backend's task listing.
    pub async fn load_events(&self) -> Result<Vec<CalendarEvent>> {
        let tasks = self.tasks.list_tasks().await?;
        Ok(tasks.iter().map(CalendarEvent::from).collect())
    }

    pub async fn save_config(&self, update: NodeUpdate) -> Result<SaveOutcome> {
        self.platform.save_config(update).await
    }

    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&BusMessage) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.platform.subscribe(handler)
    }

    pub fn send_message(&self, message: &BusMessage) {
        self.platform.send_message(message);
    }

    pub fn on_resize(&self, width: f64, height: f64) {
        self.platform.on_resize(width, height);
    }

    pub fn on_pin_toggle(&self, is_pinned: bool) {
        self.platform.on_pin_toggle(is_pinned);
    }
}
