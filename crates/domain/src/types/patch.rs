//! Tri-state field patches for partial updates
//!
//! A JSON partial update distinguishes three states per field: the key is
//! absent (leave the current value), the key is explicitly `null` (clear the
//! value), or the key carries a value (replace). `Option<T>` collapses the
//! first two, so update payloads use [`Patch<T>`] instead.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One field of a partial update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    /// Field absent from the update; the current value is retained.
    #[default]
    Keep,
    /// Explicit `null`; the current value is cleared.
    Clear,
    /// Replacement value.
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }

    /// Apply this patch to an optional slot.
    pub fn apply_to(&self, slot: &mut Option<T>)
    where
        T: Clone,
    {
        match self {
            Self::Keep => {}
            Self::Clear => *slot = None,
            Self::Set(value) => *slot = Some(value.clone()),
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Set(v),
            None => Self::Clear,
        }
    }
}

// `Keep` is expressed by skipping the field entirely, so serialization only
// has to distinguish `Clear` (null) from `Set` (value). Callers pair this
// with `#[serde(default, skip_serializing_if = "Patch::is_keep")]`.
impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Keep | Self::Clear => serializer.serialize_none(),
            Self::Set(value) => serializer.serialize_some(value),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Default, Deserialize)]
    struct Payload {
        #[serde(default)]
        label: Patch<String>,
    }

    #[test]
    fn absent_field_deserializes_to_keep() {
        let payload: Payload = serde_json::from_str("{}").unwrap();
        assert_eq!(payload.label, Patch::Keep);
    }

    #[test]
    fn null_field_deserializes_to_clear() {
        let payload: Payload = serde_json::from_str(r#"{"label":null}"#).unwrap();
        assert_eq!(payload.label, Patch::Clear);
    }

    #[test]
    fn value_field_deserializes_to_set() {
        let payload: Payload = serde_json::from_str(r#"{"label":"Calendar"}"#).unwrap();
        assert_eq!(payload.label, Patch::Set("Calendar".to_string()));
    }

    #[test]
    fn apply_covers_all_three_states() {
        let mut slot = Some("before".to_string());
        Patch::Keep.apply_to(&mut slot);
        assert_eq!(slot.as_deref(), Some("before"));

        Patch::Set("after".to_string()).apply_to(&mut slot);
        assert_eq!(slot.as_deref(), Some("after"));

        Patch::<String>::Clear.apply_to(&mut slot);
        assert_eq!(slot, None);
    }
}
