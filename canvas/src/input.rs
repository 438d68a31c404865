//! Input model: tools, tool settings, mouse buttons, and the stroke gesture state.
//!
//! `Tool` and `ToolState` capture what the local participant will draw with.
//! They are never synchronized; only the events they produce are. `ToolState`
//! serializes so the host can persist it between sessions.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_ERASER_WIDTH, DEFAULT_FILL_COLOR, DEFAULT_PEN_COLOR, DEFAULT_PEN_WIDTH};
use crate::event::StrokeTool;
use crate::viewport::Viewport;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Freehand pen (default).
    #[default]
    Pen,
    /// Freehand eraser.
    Eraser,
    /// Bucket fill at the click point.
    Fill,
}

impl Tool {
    /// The compositing mode for stroke tools; `None` for fill.
    #[must_use]
    pub fn stroke_tool(self) -> Option<StrokeTool> {
        match self {
            Self::Pen => Some(StrokeTool::Pen),
            Self::Eraser => Some(StrokeTool::Eraser),
            Self::Fill => None,
        }
    }
}

/// Local tool configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolState {
    pub tool: Tool,
    pub pen_color: String,
    pub pen_width: f64,
    pub eraser_width: f64,
    pub fill_color: String,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            tool: Tool::Pen,
            pen_color: DEFAULT_PEN_COLOR.to_owned(),
            pen_width: DEFAULT_PEN_WIDTH,
            eraser_width: DEFAULT_ERASER_WIDTH,
            fill_color: DEFAULT_FILL_COLOR.to_owned(),
        }
    }
}

impl ToolState {
    /// Forced reset applied when this participant becomes the drawer.
    ///
    /// Tool, pen color and pen width return to defaults. The eraser width and
    /// fill color are preferences that survive a new tenure.
    pub fn reset_for_new_drawer(&mut self) {
        self.tool = Tool::Pen;
        self.pen_color = DEFAULT_PEN_COLOR.to_owned();
        self.pen_width = DEFAULT_PEN_WIDTH;
    }

    /// Color for strokes of the active tool.
    #[must_use]
    pub fn active_color(&self) -> &str {
        match self.tool {
            Tool::Pen | Tool::Eraser => &self.pen_color,
            Tool::Fill => &self.fill_color,
        }
    }

    /// Width for strokes of the active tool.
    #[must_use]
    pub fn active_width(&self) -> f64 {
        match self.tool {
            Tool::Eraser => self.eraser_width,
            Tool::Pen | Tool::Fill => self.pen_width,
        }
    }

    /// Set the width of the active stroke tool. Non-positive widths are ignored.
    pub fn set_active_width(&mut self, width: f64) -> bool {
        if !(width.is_finite() && width > 0.0) {
            return false;
        }
        match self.tool {
            Tool::Eraser => self.eraser_width = width,
            Tool::Pen => self.pen_width = width,
            Tool::Fill => return false,
        }
        true
    }

    /// Set the color of the active tool (pen color or fill color).
    pub fn set_active_color(&mut self, color: &str) {
        match self.tool {
            Tool::Pen | Tool::Eraser => color.clone_into(&mut self.pen_color),
            Tool::Fill => color.clone_into(&mut self.fill_color),
        }
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// Internal state for the local stroke gesture.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// A stroke is being drawn.
    Stroking {
        /// Display-to-surface scale captured at pointer-down.
        viewport: Viewport,
        /// Compositing mode fixed for the whole stroke.
        tool: StrokeTool,
        /// Color fixed for the whole stroke.
        color: String,
        /// Width fixed for the whole stroke.
        width: f64,
    },
}
