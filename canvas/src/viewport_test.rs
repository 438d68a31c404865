#![allow(clippy::float_cmp)]

use super::*;

#[test]
fn default_viewport_is_identity() {
    let vp = Viewport::default();
    assert_eq!(vp.to_surface(Point::new(12.0, 34.0)), Point::new(12.0, 34.0));
}

#[test]
fn shrunk_canvas_scales_up_to_intrinsic_pixels() {
    // 800x600 canvas laid out at 400x300 CSS pixels.
    let vp = Viewport::new(Size::new(800.0, 600.0), Size::new(400.0, 300.0));
    assert_eq!(vp.scale_x, 2.0);
    assert_eq!(vp.scale_y, 2.0);
    assert_eq!(vp.to_surface(Point::new(100.0, 50.0)), Point::new(200.0, 100.0));
}

#[test]
fn axes_scale_independently() {
    let vp = Viewport::new(Size::new(800.0, 600.0), Size::new(1600.0, 200.0));
    assert_eq!(vp.to_surface(Point::new(160.0, 20.0)), Point::new(80.0, 60.0));
}

#[test]
fn collapsed_display_keeps_unit_scale() {
    let vp = Viewport::new(Size::new(800.0, 600.0), Size::new(0.0, -5.0));
    assert_eq!(vp, Viewport::default());
}
