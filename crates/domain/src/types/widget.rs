//! Widget identity and canvas node shapes

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::calendar::CalendarWidgetData;
use crate::constants::CALENDAR_NODE_TYPE;

/// Identity and ownership wrapper for one widget instance.
///
/// `widget_id` is the sole key for bus topics and the persistence cache; two
/// configs with the same id are treated as the same widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    pub widget_id: i64,
    pub user_id: i64,
    /// Free-form role string assigned by the host; not validated.
    pub role: String,
    /// Owning board. Static; never mutated by this layer.
    pub board: Board,
    pub config: FlowNode,
}

/// Board the widget is mounted on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: i64,
    pub name: String,
    pub parent_id: i64,
}

/// Canvas coordinates of a node.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// The UI/canvas-addressable shape of a widget.
///
/// `data`, `position`, and `style` are independently partially-updatable;
/// see [`NodeUpdate`](super::update::NodeUpdate) for the merge contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowNode {
    /// Canvas node id. Independent namespace from `widget_id`.
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub position: Position,
    /// Free-form visual properties (width, height, colors).
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub style: Map<String, Value>,
    #[serde(default)]
    pub data: CalendarWidgetData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drag_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_position: Option<String>,
}

impl FlowNode {
    /// New calendar node with default data at the origin.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: CALENDAR_NODE_TYPE.to_string(),
            position: Position::default(),
            style: Map::new(),
            data: CalendarWidgetData::default(),
            drag_handle: None,
            source_position: None,
            target_position: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn flow_node_round_trips_wire_names() {
        let mut node = FlowNode::new("calendar-1");
        node.position = Position { x: 100.0, y: 100.0 };
        node.style.insert("width".into(), json!(900));

        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["type"], "calendarNode");
        assert_eq!(value["style"]["width"], 900);

        let back: FlowNode = serde_json::from_value(value).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn node_tolerates_minimal_host_records() {
        let node: FlowNode = serde_json::from_value(json!({
            "id": "calendar-7",
            "type": "calendarNode"
        }))
        .unwrap();
        assert_eq!(node.position, Position::default());
        assert!(node.style.is_empty());
        assert!(!node.data.is_pinned);
    }
}
