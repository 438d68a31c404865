//! The raster surface: an RGBA8 pixel buffer owned by the local client.
//!
//! The surface is never transmitted. Peers converge because they replay the
//! same events through the same deterministic rasterizer, so everything here
//! is integer-exact given the same inputs.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

use crate::color::Rgba;
use crate::consts::{BYTES_PER_PIXEL, MIN_STROKE_RADIUS, SURFACE_BACKGROUND};
use crate::viewport::Point;

/// How a stroke segment composites onto the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    /// `source-over` with the given color.
    Over(Rgba),
    /// `destination-out`: covered pixels become transparent.
    Erase,
}

/// Row-major RGBA8 pixel buffer.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    background: Rgba,
    dirty: bool,
}

impl RasterSurface {
    /// Create a surface filled with the default background.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_background(width, height, SURFACE_BACKGROUND)
    }

    /// Create a surface filled with `background`; `clear` restores it.
    #[must_use]
    pub fn with_background(width: u32, height: u32, background: Rgba) -> Self {
        let len = width as usize * height as usize;
        let pixels = background.to_bytes().repeat(len);
        Self { width, height, pixels, background, dirty: true }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The whole buffer, row-major RGBA.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable access for whole-buffer operations (flood fill). Marks the surface dirty.
    pub(crate) fn pixels_mut(&mut self) -> &mut [u8] {
        self.dirty = true;
        &mut self.pixels
    }

    fn offset(&self, x: i64, y: i64) -> Option<usize> {
        let x = u32::try_from(x).map_or(None, |x| (x < self.width).then_some(x))?;
        let y = u32::try_from(y).map_or(None, |y| (y < self.height).then_some(y))?;
        Some((y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL)
    }

    /// Color at `(x, y)`, or `None` outside the surface.
    #[must_use]
    pub fn pixel(&self, x: i64, y: i64) -> Option<Rgba> {
        let i = self.offset(x, y)?;
        Some(Rgba::new(self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]))
    }

    /// Overwrite one pixel; out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: i64, y: i64, color: Rgba) {
        if let Some(i) = self.offset(x, y) {
            self.pixels[i..i + BYTES_PER_PIXEL].copy_from_slice(&color.to_bytes());
            self.dirty = true;
        }
    }

    /// Wipe the surface back to its background.
    pub fn clear(&mut self) {
        let bg = self.background.to_bytes();
        for px in self.pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
            px.copy_from_slice(&bg);
        }
        self.dirty = true;
    }

    /// Render one stroke segment as a round-capped capsule.
    ///
    /// Every pixel whose center lies within `line_width / 2` of the segment is
    /// composited exactly once, so overlapping caps inside one segment never
    /// double-blend translucent colors.
    #[allow(clippy::cast_possible_truncation)]
    pub fn stroke_segment(&mut self, from: Point, to: Point, line_width: f64, paint: Paint) {
        let radius = (line_width / 2.0).max(MIN_STROKE_RADIUS);
        let min_x = ((from.x.min(to.x) - radius).floor() as i64).max(0);
        let min_y = ((from.y.min(to.y) - radius).floor() as i64).max(0);
        let max_x = ((from.x.max(to.x) + radius).ceil() as i64).min(i64::from(self.width) - 1);
        let max_y = ((from.y.max(to.y) + radius).ceil() as i64).min(i64::from(self.height) - 1);
        if min_x > max_x || min_y > max_y {
            return;
        }

        let radius_sq = radius * radius;
        for py in min_y..=max_y {
            for px in min_x..=max_x {
                #[allow(clippy::cast_precision_loss)]
                let center = Point::new(px as f64 + 0.5, py as f64 + 0.5);
                if distance_sq_to_segment(center, from, to) > radius_sq {
                    continue;
                }
                let Some(i) = self.offset(px, py) else {
                    continue;
                };
                let out = match paint {
                    Paint::Over(color) => {
                        let dst = Rgba::new(self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]);
                        color.over(dst)
                    }
                    Paint::Erase => Rgba::TRANSPARENT,
                };
                self.pixels[i..i + BYTES_PER_PIXEL].copy_from_slice(&out.to_bytes());
            }
        }
        self.dirty = true;
    }

    /// Whether the surface changed since the last call; resets the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

fn distance_sq_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq <= f64::EPSILON {
        0.0
    } else {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.x + t * dx, a.y + t * dy);
    (p.x - cx) * (p.x - cx) + (p.y - cy) * (p.y - cy)
}
