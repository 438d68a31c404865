//! Shared constants for the canvas crate.

use crate::color::Rgba;

// ── Tool defaults ───────────────────────────────────────────────

/// Pen color a new drawer starts with.
pub const DEFAULT_PEN_COLOR: &str = "#000000";

/// Pen width (surface pixels) a new drawer starts with.
pub const DEFAULT_PEN_WIDTH: f64 = 5.0;

/// Eraser width (surface pixels) a new drawer starts with.
pub const DEFAULT_ERASER_WIDTH: f64 = 20.0;

/// Fill color a new drawer starts with.
pub const DEFAULT_FILL_COLOR: &str = "#FF0000";

// ── Surface ─────────────────────────────────────────────────────

/// Bytes per pixel in the RGBA8 raster buffer.
pub const BYTES_PER_PIXEL: usize = 4;

/// Color of a freshly created or cleared surface.
pub const SURFACE_BACKGROUND: Rgba = Rgba::TRANSPARENT;

/// Smallest stroke radius; reaches the four pixel centers around an integer point.
pub const MIN_STROKE_RADIUS: f64 = 0.75;

// ── Room state ──────────────────────────────────────────────────

/// `room:state` type announcing a new drawer.
pub const STATE_DRAWER_CHANGED: &str = "DRAWER_CHANGED";

/// `room:state` type announcing the start of a game.
pub const STATE_GAME_START: &str = "GAME_START";

/// `room:state` type announcing a membership change.
pub const STATE_USER_UPDATE: &str = "USER_UPDATE";

/// `room:state` type announcing that the room is gone.
pub const STATE_ROOM_DESTROYED: &str = "ROOM_DESTROYED";
