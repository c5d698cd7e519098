//! Partial-update merge contract for flow nodes
//!
//! `data`, `position`, and `style` are each independently shallow-merged:
//! the update's keys win, unspecified keys retain their prior value, and a
//! sub-object absent from the update leaves its sibling untouched.
//! Top-level scalars (`id`, `type`, `dragHandle`, `sourcePosition`,
//! `targetPosition`) are replaced wholesale only when present. A field is
//! cleared only by an explicit `null`, never by omission.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::calendar::{CalendarEvent, CalendarView, CalendarWidgetData};
use super::patch::Patch;
use super::widget::{FlowNode, WidgetConfig};

/// Partial update addressing any subset of a [`FlowNode`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<PositionUpdate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<DataUpdate>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    pub drag_handle: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    pub source_position: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    pub target_position: Patch<String>,
}

/// Partial update of a node's position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

/// Partial update of [`CalendarWidgetData`].
///
/// Unknown keys land in `extra` and are merged into the data's extension
/// sidecar; no validation error is raised for them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataUpdate {
    #[serde(skip_serializing_if = "Patch::is_keep")]
    pub label: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    pub api_base_url: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    pub platform_api_url: Patch<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_pinned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<CalendarEvent>>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    pub current_view: Patch<CalendarView>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    pub current_date: Patch<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    pub width: Patch<f64>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    pub height: Patch<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeUpdate {
    /// Update that moves the node.
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            position: Some(PositionUpdate { x: Some(x), y: Some(y) }),
            ..Self::default()
        }
    }

    /// Update that pins or unpins the node.
    pub fn pinned(is_pinned: bool) -> Self {
        Self {
            data: Some(DataUpdate { is_pinned: Some(is_pinned), ..DataUpdate::default() }),
            ..Self::default()
        }
    }

    /// Update that sets one style property.
    pub fn style_entry(key: impl Into<String>, value: Value) -> Self {
        let mut style = Map::new();
        style.insert(key.into(), value);
        Self { style: Some(style), ..Self::default() }
    }

    /// Update that resizes the node, keeping the `data` mirrors in sync
    /// with `style`.
    pub fn size(width: f64, height: f64) -> Self {
        let mut style = Map::new();
        style.insert("width".to_string(), width.into());
        style.insert("height".to_string(), height.into());
        Self {
            style: Some(style),
            data: Some(DataUpdate {
                width: Patch::Set(width),
                height: Patch::Set(height),
                ..DataUpdate::default()
            }),
            ..Self::default()
        }
    }

    /// True when applying this update cannot change anything.
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.node_type.is_none()
            && self.position.is_none()
            && self.style.is_none()
            && self.data.is_none()
            && self.drag_handle.is_keep()
            && self.source_position.is_keep()
            && self.target_position.is_keep()
    }

    /// True when the update addresses the node position.
    pub fn touches_position(&self) -> bool {
        self.position.is_some()
    }

    /// True when the update addresses the pin state.
    pub fn touches_pin(&self) -> bool {
        self.data.as_ref().is_some_and(|data| data.is_pinned.is_some())
    }

    /// Merge this update into `node` in place.
    pub fn apply_to(&self, node: &mut FlowNode) {
        if let Some(id) = &self.id {
            node.id = id.clone();
        }
        if let Some(node_type) = &self.node_type {
            node.node_type = node_type.clone();
        }
        self.drag_handle.apply_to(&mut node.drag_handle);
        self.source_position.apply_to(&mut node.source_position);
        self.target_position.apply_to(&mut node.target_position);
        if let Some(position) = &self.position {
            if let Some(x) = position.x {
                node.position.x = x;
            }
            if let Some(y) = position.y {
                node.position.y = y;
            }
        }
        if let Some(style) = &self.style {
            merge_map(&mut node.style, style);
        }
        if let Some(data) = &self.data {
            data.apply_to(&mut node.data);
        }
    }
}

impl DataUpdate {
    /// Shallow-merge this update into `data`, leaving unaddressed fields
    /// untouched.
    pub fn apply_to(&self, data: &mut CalendarWidgetData) {
        self.label.apply_to(&mut data.label);
        self.api_base_url.apply_to(&mut data.api_base_url);
        self.platform_api_url.apply_to(&mut data.platform_api_url);
        if let Some(is_pinned) = self.is_pinned {
            data.is_pinned = is_pinned;
        }
        if let Some(events) = &self.events {
            data.events = events.clone();
        }
        self.current_view.apply_to(&mut data.current_view);
        self.current_date.apply_to(&mut data.current_date);
        self.width.apply_to(&mut data.width);
        self.height.apply_to(&mut data.height);
        merge_map(&mut data.extra, &self.extra);
    }
}

/// Apply `update` to `config.config`, returning the merged widget config.
pub fn apply_update(config: &WidgetConfig, update: &NodeUpdate) -> WidgetConfig {
    let mut merged = config.clone();
    update.apply_to(&mut merged.config);
    merged
}

// Shallow key merge: update keys win, `null` clears the key.
fn merge_map(target: &mut Map<String, Value>, update: &Map<String, Value>) {
    for (key, value) in update {
        if value.is_null() {
            target.remove(key);
        } else {
            target.insert(key.clone(), value.clone());
        }
    }
}
