//! Calendar domain and presentation state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Calendar view modes supported by the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarView {
    #[default]
    Month,
    Week,
    Day,
    Agenda,
}

/// Domain + presentation state embedded in a [`FlowNode`](super::widget::FlowNode).
///
/// The schema is intentionally open-ended: host-specific extension fields
/// land in `extra` and survive merges and round-trips untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalendarWidgetData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
    /// Remote persistence endpoint. Absent means cache-only persistence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_api_url: Option<String>,
    /// While pinned the canvas may not reposition the node and position
    /// saves are rejected. Size changes stay allowed.
    pub is_pinned: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<CalendarEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_view: Option<CalendarView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_date: Option<DateTime<Utc>>,
    /// Convenience mirror of `style.width`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Convenience mirror of `style.height`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Host-specific extension fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One task-derived entry shown on the calendar grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: i64,
    pub title: String,
    pub start: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

impl From<&ServerTask> for CalendarEvent {
    fn from(task: &ServerTask) -> Self {
        Self { id: task.id, title: task.title.clone(), start: task.start_date, end: task.end_date }
    }
}

/// Task lifecycle states understood by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

/// Task priority levels understood by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

/// User input for creating or updating a task.
///
/// `start_date` is mandatory; everything else falls back to backend defaults
/// during serialization (`todo`, `medium`, empty assignee).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    pub start_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, start_date: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            status: None,
            start_date,
            end_date: None,
            priority: None,
            assignee: None,
        }
    }
}

/// Task as returned by the backend. Field names follow the backend's
/// snake_case wire format; unknown fields are preserved in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerTask {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    pub start_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub assignee: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response envelope of `GET /tasks`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskList {
    pub tasks: Vec<ServerTask>,
}

/// Response of `POST /tasks/import`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ImportSummary {
    pub imported: u64,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn extension_fields_survive_round_trip() {
        let data: CalendarWidgetData = serde_json::from_value(json!({
            "label": "Team calendar",
            "isPinned": true,
            "hostTheme": "dark",
            "hostSlot": 3
        }))
        .unwrap();
        assert!(data.is_pinned);
        assert_eq!(data.extra["hostTheme"], "dark");

        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["hostSlot"], 3);
        assert_eq!(value["label"], "Team calendar");
    }

    #[test]
    fn server_task_parses_backend_payload() {
        let task: ServerTask = serde_json::from_value(json!({
            "id": 17,
            "title": "Quarterly review",
            "status": "in_progress",
            "start_date": "2025-03-01T09:00:00Z",
            "deadline": "2025-03-02T18:00:00Z",
            "priority": "high",
            "created_by": "host"
        }))
        .unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.priority, TaskPriority::High);
        assert!(task.end_date.is_none());
        assert_eq!(task.extra["created_by"], "host");

        let event = CalendarEvent::from(&task);
        assert_eq!(event.id, 17);
        assert!(event.end.is_none());
    }
}
