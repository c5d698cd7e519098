//! Port interfaces for persistence and transport
//!
//! These traits define the boundaries between the integration logic and
//! infrastructure implementations.

use std::sync::Arc;

use async_trait::async_trait;
use flowcal_domain::{FlowNode, ImportSummary, Result, ServerTask, TaskDraft, WidgetConfig};

/// Trait for the per-widget persistence cache.
///
/// Keys derive from the widget id alone (`calendar_widget_{id}`); writes
/// are last-write-wins per key with no cross-key guarantees. The cache is a
/// session-local mirror, not a source of truth.
#[async_trait]
pub trait ConfigCache: Send + Sync {
    /// Read the cached node for a widget, if any. Used on cold start to
    /// rehydrate the last saved state.
    async fn load(&self, widget_id: i64) -> Result<Option<FlowNode>>;

    /// Replace the cached node for a widget.
    async fn store(&self, widget_id: i64, node: &FlowNode) -> Result<()>;

    /// Drop the cached node for a widget.
    async fn remove(&self, widget_id: i64) -> Result<()>;
}

/// Trait for the optional upstream write to the host platform.
#[async_trait]
pub trait PlatformPush: Send + Sync {
    /// Push the full widget config to the host platform's persistence
    /// endpoint.
    async fn push_widget_config(&self, config: &WidgetConfig) -> Result<()>;
}

/// Trait for task CRUD against the calendar backend.
///
/// Create/update serialization differs deliberately: an update without an
/// end date explicitly clears any previously set deadline, a create omits
/// the deadline fields entirely.
#[async_trait]
pub trait TaskGateway: Send + Sync {
    async fn create_task(&self, draft: &TaskDraft) -> Result<ServerTask>;

    async fn update_task(&self, task_id: i64, draft: &TaskDraft) -> Result<ServerTask>;

    async fn delete_task(&self, task_id: i64) -> Result<()>;

    /// Full task listing, consumed by the rendering layer to derive
    /// calendar entries.
    async fn list_tasks(&self) -> Result<Vec<ServerTask>>;

    /// Upload an iCalendar file for bulk import.
    async fn import_calendar(&self, file_name: &str, ics: Vec<u8>) -> Result<ImportSummary>;
}

/// Builds a [`TaskGateway`] bound to a backend base URL.
///
/// The resolver extracts the URL from widget data at mount time, so gateway
/// construction has to be deferred behind a factory.
pub trait TaskGatewayFactory: Send + Sync {
    fn task_gateway(&self, api_base_url: &str) -> Result<Arc<dyn TaskGateway>>;
}

/// Builds a [`PlatformPush`] bound to a platform base URL.
pub trait PlatformPushFactory: Send + Sync {
    fn platform_push(&self, platform_api_url: &str) -> Result<Arc<dyn PlatformPush>>;
}
