//! Event model: the draw event schema, its validation predicate, and parsing.
//!
//! A [`DrawEvent`] is the only unit of synchronized drawing state. The wire
//! form is a flat, versionless JSON object with camelCase keys; unknown keys
//! are ignored so newer peers can add fields without breaking older ones.
//!
//! Parsing never fails loudly. [`DrawEvent::from_value`] returns
//! [`CanvasError::MalformedEvent`] for payloads that do not deserialize or
//! that lack the fields their `kind` requires, and callers drop them.

#[cfg(test)]
#[path = "event_test.rs"]
mod event_test;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CanvasError;

/// What a draw event does to the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventKind {
    /// Begin a stroke path at `(x, y)`.
    Start,
    /// Extend the current stroke to `(x, y)` and render the segment.
    Move,
    /// Close the current stroke.
    End,
    /// Wipe the whole surface.
    Clear,
    /// Flood-fill the region under `(x, y)` with `color`.
    Fill,
}

/// Compositing mode of a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeTool {
    /// Paint with the event color (`source-over`).
    #[default]
    Pen,
    /// Remove paint (`destination-out`).
    Eraser,
}

/// A single drawing action, as published and replayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawEvent {
    pub kind: EventKind,
    /// Participant that authored the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_user_id: Option<String>,
    /// Engine session that authored and already applied the event locally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Surface-space x; required for `START`, `MOVE`, `FILL`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Surface-space y; required for `START`, `MOVE`, `FILL`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// Required for `START` and `MOVE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<StrokeTool>,
    /// Hex color; required for `FILL`, defaults to black for pen strokes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Positive stroke width; required for `START` and `MOVE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_width: Option<f64>,
}

impl DrawEvent {
    fn bare(kind: EventKind) -> Self {
        Self {
            kind,
            origin_user_id: None,
            session_id: None,
            x: None,
            y: None,
            tool: None,
            color: None,
            line_width: None,
        }
    }

    /// A stroke event (`START` or `MOVE`) at `(x, y)`.
    #[must_use]
    pub fn stroke(kind: EventKind, x: f64, y: f64, tool: StrokeTool, color: &str, line_width: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            tool: Some(tool),
            color: Some(color.to_owned()),
            line_width: Some(line_width),
            ..Self::bare(kind)
        }
    }

    #[must_use]
    pub fn end() -> Self {
        Self::bare(EventKind::End)
    }

    #[must_use]
    pub fn clear() -> Self {
        Self::bare(EventKind::Clear)
    }

    #[must_use]
    pub fn fill(x: f64, y: f64, color: &str) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            color: Some(color.to_owned()),
            ..Self::bare(EventKind::Fill)
        }
    }

    /// Attach the author identity.
    #[must_use]
    pub fn authored_by(mut self, user_id: &str, session_id: &str) -> Self {
        self.origin_user_id = Some(user_id.to_owned());
        self.session_id = Some(session_id.to_owned());
        self
    }

    /// Whether the event carries every field its kind requires.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.missing_field().is_none()
    }

    /// First required field that is absent or out of range, if any.
    fn missing_field(&self) -> Option<&'static str> {
        let finite = |v: Option<f64>| v.is_some_and(f64::is_finite);
        match self.kind {
            EventKind::Start | EventKind::Move => {
                if !finite(self.x) {
                    return Some("x");
                }
                if !finite(self.y) {
                    return Some("y");
                }
                if self.tool.is_none() {
                    return Some("tool");
                }
                if !self.line_width.is_some_and(|w| w.is_finite() && w > 0.0) {
                    return Some("lineWidth");
                }
                None
            }
            EventKind::Fill => {
                if !finite(self.x) {
                    return Some("x");
                }
                if !finite(self.y) {
                    return Some("y");
                }
                if self.color.is_none() {
                    return Some("color");
                }
                None
            }
            EventKind::End | EventKind::Clear => None,
        }
    }

    /// Build and validate an event from a transport payload.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::MalformedEvent`] if the payload does not
    /// deserialize or misses a field required by its kind.
    pub fn from_value(value: &Value) -> Result<Self, CanvasError> {
        let event: Self =
            Self::deserialize(value).map_err(|e| CanvasError::MalformedEvent(e.to_string()))?;
        if let Some(field) = event.missing_field() {
            return Err(CanvasError::MalformedEvent(format!("{:?} requires {field}", event.kind)));
        }
        Ok(event)
    }

    /// Serialize to the flat wire object.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// `(x, y)` when both coordinates are present.
    #[must_use]
    pub fn point(&self) -> Option<(f64, f64)> {
        Some((self.x?, self.y?))
    }
}

/// Parse a history dump, dropping malformed entries and keeping order.
#[must_use]
pub fn parse_events(values: &[Value]) -> Vec<DrawEvent> {
    values
        .iter()
        .filter_map(|value| match DrawEvent::from_value(value) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!(error = %e, "dropping malformed history event");
                None
            }
        })
        .collect()
}
