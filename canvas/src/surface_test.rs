use super::*;

const RED: Rgba = Rgba::new(255, 0, 0, 255);

fn covered(surface: &RasterSurface) -> usize {
    (0..i64::from(surface.height()))
        .flat_map(|y| (0..i64::from(surface.width())).map(move |x| (x, y)))
        .filter(|&(x, y)| surface.pixel(x, y).is_some_and(|c| c.a > 0))
        .count()
}

#[test]
fn new_surface_is_transparent_and_dirty() {
    let mut surface = RasterSurface::new(4, 3);
    assert_eq!(surface.pixels().len(), 4 * 3 * 4);
    assert!(surface.pixels().iter().all(|&b| b == 0));
    assert!(surface.take_dirty());
    assert!(!surface.take_dirty());
}

#[test]
fn with_background_fills_every_pixel() {
    let surface = RasterSurface::with_background(2, 2, Rgba::WHITE);
    assert_eq!(surface.pixel(1, 1), Some(Rgba::WHITE));
}

#[test]
fn pixel_access_outside_bounds_is_none() {
    let mut surface = RasterSurface::new(2, 2);
    assert_eq!(surface.pixel(-1, 0), None);
    assert_eq!(surface.pixel(2, 0), None);
    assert_eq!(surface.pixel(0, 2), None);
    surface.set_pixel(5, 5, RED);
    assert!(surface.pixels().iter().all(|&b| b == 0));
}

#[test]
fn clear_restores_background() {
    let mut surface = RasterSurface::with_background(3, 3, Rgba::WHITE);
    surface.set_pixel(1, 1, RED);
    surface.clear();
    assert_eq!(surface.pixel(1, 1), Some(Rgba::WHITE));
}

#[test]
fn horizontal_segment_covers_line_width_band() {
    let mut surface = RasterSurface::new(20, 20);
    surface.stroke_segment(Point::new(5.0, 10.0), Point::new(15.0, 10.0), 4.0, Paint::Over(RED));

    assert_eq!(surface.pixel(10, 9), Some(RED));
    assert_eq!(surface.pixel(10, 10), Some(RED));
    assert_eq!(surface.pixel(10, 7), Some(Rgba::TRANSPARENT));
    assert_eq!(surface.pixel(10, 13), Some(Rgba::TRANSPARENT));
}

#[test]
fn zero_length_segment_stamps_a_dot() {
    let mut surface = RasterSurface::new(10, 10);
    surface.stroke_segment(Point::new(5.0, 5.0), Point::new(5.0, 5.0), 1.0, Paint::Over(RED));
    assert!(covered(&surface) >= 1);
    assert!(covered(&surface) <= 4);
}

#[test]
fn segment_outside_surface_is_clipped() {
    let mut surface = RasterSurface::new(10, 10);
    surface.stroke_segment(Point::new(-50.0, -50.0), Point::new(-40.0, -40.0), 4.0, Paint::Over(RED));
    assert_eq!(covered(&surface), 0);

    surface.stroke_segment(Point::new(-5.0, 5.0), Point::new(50.0, 5.0), 2.0, Paint::Over(RED));
    assert_eq!(surface.pixel(0, 5), Some(RED));
    assert_eq!(surface.pixel(9, 5), Some(RED));
}

#[test]
fn eraser_makes_pixels_transparent() {
    let mut surface = RasterSurface::with_background(10, 10, Rgba::WHITE);
    surface.stroke_segment(Point::new(0.0, 5.0), Point::new(10.0, 5.0), 2.0, Paint::Erase);
    assert_eq!(surface.pixel(3, 5), Some(Rgba::TRANSPARENT));
    assert_eq!(surface.pixel(3, 0), Some(Rgba::WHITE));
}

#[test]
fn translucent_segment_blends_each_pixel_once() {
    let mut surface = RasterSurface::with_background(20, 20, Rgba::WHITE);
    let ink = Rgba::new(0, 0, 0, 128);
    surface.stroke_segment(Point::new(2.0, 10.0), Point::new(18.0, 10.0), 6.0, Paint::Over(ink));

    let expected = ink.over(Rgba::WHITE);
    for x in 4..16 {
        assert_eq!(surface.pixel(x, 10), Some(expected), "x = {x}");
    }
}

#[test]
fn same_segments_produce_identical_buffers() {
    let draw = || {
        let mut surface = RasterSurface::new(32, 32);
        surface.stroke_segment(Point::new(1.3, 2.7), Point::new(29.9, 17.1), 5.0, Paint::Over(RED));
        surface.stroke_segment(Point::new(29.9, 17.1), Point::new(3.0, 30.0), 3.5, Paint::Erase);
        surface
    };
    assert_eq!(draw().pixels(), draw().pixels());
}
