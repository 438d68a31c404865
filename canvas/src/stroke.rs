//! Stroke engine: turns local pointer input into draw events.
//!
//! DESIGN
//! ======
//! The engine only decides *which* events a gesture produces. The caller
//! applies each returned event to its own surface through the same applier
//! that replays remote events, then publishes it. Author and viewers therefore
//! share one rasterization path.
//!
//! Pointer positions arrive in display space. The display-to-surface scale is
//! captured on pointer-down and held for the whole stroke, so a layout resize
//! mid-stroke cannot bend the line.

#[cfg(test)]
#[path = "stroke_test.rs"]
mod stroke_test;

use crate::event::{DrawEvent, EventKind};
use crate::input::{InputState, ToolState};
use crate::viewport::{Point, Viewport};

/// Gesture tracker for the local drawer.
#[derive(Debug, Clone, Default)]
pub struct StrokeEngine {
    state: InputState,
}

impl StrokeEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a stroke is in progress.
    #[must_use]
    pub fn is_stroking(&self) -> bool {
        matches!(self.state, InputState::Stroking { .. })
    }

    /// Pointer pressed at display point `display`.
    ///
    /// Returns `START` for the pen or eraser and a single `FILL` for the fill
    /// tool. A press while a stroke is open is ignored.
    pub fn pointer_down(&mut self, display: Point, viewport: Viewport, tools: &ToolState) -> Option<DrawEvent> {
        if self.is_stroking() {
            return None;
        }
        let at = viewport.to_surface(display);
        let Some(tool) = tools.tool.stroke_tool() else {
            return Some(DrawEvent::fill(at.x, at.y, &tools.fill_color));
        };
        let color = tools.active_color().to_owned();
        let width = tools.active_width();
        let start = DrawEvent::stroke(EventKind::Start, at.x, at.y, tool, &color, width);
        self.state = InputState::Stroking { viewport, tool, color, width };
        Some(start)
    }

    /// Pointer moved; yields `MOVE` only while stroking.
    pub fn pointer_move(&mut self, display: Point) -> Option<DrawEvent> {
        let InputState::Stroking { viewport, tool, color, width } = &self.state else {
            return None;
        };
        let at = viewport.to_surface(display);
        Some(DrawEvent::stroke(EventKind::Move, at.x, at.y, *tool, color, *width))
    }

    /// Pointer released; yields `END` if a stroke was open.
    pub fn pointer_up(&mut self) -> Option<DrawEvent> {
        match std::mem::take(&mut self.state) {
            InputState::Stroking { .. } => Some(DrawEvent::end()),
            InputState::Idle => None,
        }
    }

    /// Pointer left the surface; closes the stroke like a release.
    pub fn pointer_leave(&mut self) -> Option<DrawEvent> {
        self.pointer_up()
    }

    /// Abandon the gesture without emitting anything.
    pub fn cancel(&mut self) {
        self.state = InputState::Idle;
    }
}
