//! Deterministic flood fill.
//!
//! Replaces every pixel 4-connected to the seed whose RGBA exactly equals the
//! seed's original color. An explicit stack keeps memory bounded by the region
//! rather than the call depth, so large canvases cannot overflow the stack.
//! The buffer is mutated in place and the surface marked dirty once, which the
//! host turns into a single repaint.

#[cfg(test)]
#[path = "fill_test.rs"]
mod fill_test;

use crate::color::Rgba;
use crate::consts::BYTES_PER_PIXEL;
use crate::error::CanvasError;
use crate::surface::RasterSurface;

/// What a fill did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOutcome {
    /// `pixels` pixels were recolored.
    Filled { pixels: usize },
    /// The seed already had the target color; nothing changed.
    AlreadyTarget,
}

/// Flood-fill the region under `(x, y)` with `target`.
///
/// Coordinates are truncated toward zero before indexing. Comparison is exact
/// on all four channels, with no tolerance.
///
/// # Errors
///
/// Returns [`CanvasError::UnknownFillSeed`] if the truncated seed lies outside
/// the surface.
#[allow(clippy::cast_possible_truncation)]
pub fn flood_fill(surface: &mut RasterSurface, x: f64, y: f64, target: Rgba) -> Result<FillOutcome, CanvasError> {
    let (sx, sy) = (x.trunc() as i64, y.trunc() as i64);
    let Some(seed) = surface.pixel(sx, sy) else {
        return Err(CanvasError::UnknownFillSeed { x: sx, y: sy });
    };
    if seed == target {
        return Ok(FillOutcome::AlreadyTarget);
    }

    let width = i64::from(surface.width());
    let height = i64::from(surface.height());
    let pixels = surface.pixels_mut();
    let seed = seed.to_bytes();
    let target = target.to_bytes();

    let mut filled = 0;
    let mut stack = vec![(sx, sy)];
    while let Some((px, py)) = stack.pop() {
        if px < 0 || py < 0 || px >= width || py >= height {
            continue;
        }
        let Ok(i) = usize::try_from((py * width + px) * BYTES_PER_PIXEL as i64) else {
            continue;
        };
        if pixels[i..i + BYTES_PER_PIXEL] != seed {
            continue;
        }
        pixels[i..i + BYTES_PER_PIXEL].copy_from_slice(&target);
        filled += 1;

        stack.push((px + 1, py));
        stack.push((px - 1, py));
        stack.push((px, py + 1));
        stack.push((px, py - 1));
    }

    Ok(FillOutcome::Filled { pixels: filled })
}
