//! Messages exchanged over the widget bus

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::widget::Position;

/// A message delivered through the event bus.
///
/// The two tagged variants are the best-effort notifications emitted by the
/// platform adapter after a successful merge; `Custom` carries arbitrary
/// host traffic unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BusMessage {
    #[serde(rename_all = "camelCase")]
    PositionUpdated { widget_id: i64, position: Position },
    #[serde(rename_all = "camelCase")]
    WidgetPinned { widget_id: i64, is_pinned: bool },
    #[serde(untagged)]
    Custom(Value),
}

impl BusMessage {
    pub fn position_updated(widget_id: i64, position: Position) -> Self {
        Self::PositionUpdated { widget_id, position }
    }

    pub fn widget_pinned(widget_id: i64, is_pinned: bool) -> Self {
        Self::WidgetPinned { widget_id, is_pinned }
    }

    pub fn custom(value: Value) -> Self {
        Self::Custom(value)
    }
}

/// One analytics event, append-only and batched outside the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub widget_id: i64,
    pub user_id: i64,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl StatEvent {
    pub fn now(event_type: impl Into<String>, widget_id: i64, user_id: i64) -> Self {
        Self {
            event_type: event_type.into(),
            widget_id,
            user_id,
            timestamp: Utc::now(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn notifications_use_screaming_tags() {
        let message = BusMessage::widget_pinned(7, true);
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value, json!({"type": "WIDGET_PINNED", "widgetId": 7, "isPinned": true}));
    }

    #[test]
    fn unknown_payloads_fall_back_to_custom() {
        let message: BusMessage =
            serde_json::from_value(json!({"type": "HOST_PING", "seq": 1})).unwrap();
        assert_eq!(message, BusMessage::custom(json!({"type": "HOST_PING", "seq": 1})));
    }
}
