//! Fixed naming conventions shared by the cache, the bus, and the resolver

/// Backend used when a widget's data carries no `apiBaseUrl`.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";

/// Node type discriminator for calendar widgets on a canvas.
pub const CALENDAR_NODE_TYPE: &str = "calendarNode";

/// Persistence cache key for a widget's serialized `FlowNode`.
///
/// The `widget_id` is the sole key: independently constructed caches for the
/// same widget read and write the same entry.
pub fn cache_key(widget_id: i64) -> String {
    format!("calendar_widget_{widget_id}")
}

/// Bus topic for a widget.
///
/// Derived deterministically so that independently constructed adapters for
/// the same widget always share one topic. This is the sole namespacing
/// discipline preventing cross-widget message leakage.
pub fn widget_topic(widget_id: i64) -> String {
    format!("calendar-{widget_id}")
}
