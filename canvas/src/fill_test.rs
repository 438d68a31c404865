use super::*;

const RED: Rgba = Rgba::new(255, 0, 0, 255);

fn white(width: u32, height: u32) -> RasterSurface {
    RasterSurface::with_background(width, height, Rgba::WHITE)
}

/// Draw a 1px border rectangle with corners `(x0, y0)` and `(x1, y1)` inclusive.
fn border(surface: &mut RasterSurface, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgba) {
    for x in x0..=x1 {
        surface.set_pixel(x, y0, color);
        surface.set_pixel(x, y1, color);
    }
    for y in y0..=y1 {
        surface.set_pixel(x0, y, color);
        surface.set_pixel(x1, y, color);
    }
}

#[test]
fn fills_whole_uniform_surface() {
    let mut surface = white(8, 6);
    let outcome = flood_fill(&mut surface, 0.0, 0.0, RED).unwrap();
    assert_eq!(outcome, FillOutcome::Filled { pixels: 48 });
    assert!(surface.pixels().chunks_exact(4).all(|px| px == RED.to_bytes()));
}

#[test]
fn seed_already_target_is_a_no_op() {
    let mut surface = white(4, 4);
    surface.take_dirty();
    let before = surface.pixels().to_vec();

    let outcome = flood_fill(&mut surface, 1.0, 1.0, Rgba::WHITE).unwrap();

    assert_eq!(outcome, FillOutcome::AlreadyTarget);
    assert_eq!(surface.pixels(), before.as_slice());
    assert!(!surface.take_dirty());
}

#[test]
fn refilling_a_filled_region_changes_nothing() {
    let mut surface = white(10, 10);
    border(&mut surface, 2, 2, 7, 7, Rgba::BLACK);
    flood_fill(&mut surface, 4.0, 4.0, RED).unwrap();
    let once = surface.pixels().to_vec();

    assert_eq!(flood_fill(&mut surface, 4.0, 4.0, RED).unwrap(), FillOutcome::AlreadyTarget);
    assert_eq!(surface.pixels(), once.as_slice());
}

#[test]
fn fill_never_bleeds_outside_a_one_pixel_border() {
    let mut surface = white(12, 12);
    border(&mut surface, 2, 2, 9, 9, Rgba::BLACK);

    let outcome = flood_fill(&mut surface, 5.0, 5.0, RED).unwrap();
    assert_eq!(outcome, FillOutcome::Filled { pixels: 36 });

    for y in 0..12 {
        for x in 0..12 {
            let px = surface.pixel(x, y).unwrap();
            let inside = (3..=8).contains(&x) && (3..=8).contains(&y);
            let on_border = !inside && (2..=9).contains(&x) && (2..=9).contains(&y);
            if inside {
                assert_eq!(px, RED, "({x}, {y}) inside");
            } else if on_border {
                assert_eq!(px, Rgba::BLACK, "({x}, {y}) border");
            } else {
                assert_eq!(px, Rgba::WHITE, "({x}, {y}) outside");
            }
        }
    }
}

#[test]
fn diagonal_gaps_do_not_connect() {
    // Black diagonal splits the 3x3 corner: (0,2),(1,1),(2,0).
    let mut surface = white(3, 3);
    surface.set_pixel(0, 2, Rgba::BLACK);
    surface.set_pixel(1, 1, Rgba::BLACK);
    surface.set_pixel(2, 0, Rgba::BLACK);

    let outcome = flood_fill(&mut surface, 0.0, 0.0, RED).unwrap();

    assert_eq!(outcome, FillOutcome::Filled { pixels: 3 });
    assert_eq!(surface.pixel(2, 2), Some(Rgba::WHITE));
}

#[test]
fn white_region_bounded_by_black_pixel_at_five_five() {
    // Seed (0,0) #FFFFFFFF, black pixel at (5,5), fill #FF0000FF.
    let mut surface = white(6, 6);
    surface.set_pixel(5, 5, Rgba::BLACK);

    flood_fill(&mut surface, 0.0, 0.0, Rgba::parse("#FF0000FF")).unwrap();

    assert_eq!(surface.pixel(5, 5), Some(Rgba::BLACK));
    for y in 0..6 {
        for x in 0..6 {
            if (x, y) != (5, 5) {
                assert_eq!(surface.pixel(x, y), Some(RED), "({x}, {y})");
            }
        }
    }
}

#[test]
fn fractional_seed_is_truncated() {
    let mut surface = white(4, 1);
    surface.set_pixel(2, 0, Rgba::BLACK);

    flood_fill(&mut surface, 1.99, 0.7, RED).unwrap();

    assert_eq!(surface.pixel(1, 0), Some(RED));
    assert_eq!(surface.pixel(3, 0), Some(Rgba::WHITE));
}

#[test]
fn seed_outside_surface_is_unknown() {
    let mut surface = white(4, 4);
    let err = flood_fill(&mut surface, 4.0, 0.0, RED).unwrap_err();
    assert_eq!(err, CanvasError::UnknownFillSeed { x: 4, y: 0 });
    assert!(flood_fill(&mut surface, -1.5, 0.0, RED).is_err());
}

#[test]
fn exact_match_treats_near_colors_as_walls() {
    let mut surface = white(3, 1);
    surface.set_pixel(1, 0, Rgba::new(255, 255, 255, 254));

    flood_fill(&mut surface, 0.0, 0.0, RED).unwrap();

    assert_eq!(surface.pixel(1, 0), Some(Rgba::new(255, 255, 255, 254)));
    assert_eq!(surface.pixel(2, 0), Some(Rgba::WHITE));
}

#[test]
fn large_region_fills_without_recursion() {
    let mut surface = white(512, 512);
    let outcome = flood_fill(&mut surface, 256.0, 256.0, RED).unwrap();
    assert_eq!(outcome, FillOutcome::Filled { pixels: 512 * 512 });
}
