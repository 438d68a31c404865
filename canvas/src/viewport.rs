//! Viewport: maps pointer positions from display space to surface space.
//!
//! The canvas element may be laid out at a different CSS size than its
//! intrinsic pixel size. Stroke coordinates are always published in surface
//! pixels, scaled by `intrinsic / displayed` per axis.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

/// A point in either display (CSS pixel) or surface (intrinsic pixel) space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width and height of a canvas as laid out on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Display-to-surface scale, captured once per stroke.
///
/// The canvas element keeps a fixed intrinsic pixel size while CSS stretches
/// it to fit the layout, so pointer positions must be scaled by
/// `intrinsic / displayed` before they address surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { scale_x: 1.0, scale_y: 1.0 }
    }
}

impl Viewport {
    /// Compute the scale for a surface of `intrinsic` pixels displayed at `displayed`.
    ///
    /// A collapsed (zero or negative) displayed axis keeps a 1:1 scale.
    #[must_use]
    pub fn new(intrinsic: Size, displayed: Size) -> Self {
        let axis = |intrinsic: f64, displayed: f64| {
            if displayed > 0.0 && displayed.is_finite() { intrinsic / displayed } else { 1.0 }
        };
        Self {
            scale_x: axis(intrinsic.width, displayed.width),
            scale_y: axis(intrinsic.height, displayed.height),
        }
    }

    /// Convert a display-space point to surface coordinates.
    #[must_use]
    pub fn to_surface(&self, display: Point) -> Point {
        Point {
            x: display.x * self.scale_x,
            y: display.y * self.scale_y,
        }
    }
}
