#![allow(clippy::float_cmp)]

use super::*;
use crate::event::StrokeTool;
use crate::input::Tool;
use crate::viewport::Size;

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

/// 800x600 surface shown at 400x300 CSS pixels.
fn half_size() -> Viewport {
    Viewport::new(Size::new(800.0, 600.0), Size::new(400.0, 300.0))
}

#[test]
fn pen_gesture_emits_start_move_end() {
    let mut stroke = StrokeEngine::new();
    let tools = ToolState::default();

    let start = stroke.pointer_down(pt(10.0, 10.0), Viewport::default(), &tools).unwrap();
    let step = stroke.pointer_move(pt(20.0, 20.0)).unwrap();
    let end = stroke.pointer_up().unwrap();

    assert_eq!(start.kind, EventKind::Start);
    assert_eq!(start.tool, Some(StrokeTool::Pen));
    assert_eq!(start.color.as_deref(), Some("#000000"));
    assert_eq!(start.line_width, Some(5.0));
    assert_eq!(step.kind, EventKind::Move);
    assert_eq!(step.point(), Some((20.0, 20.0)));
    assert_eq!(end.kind, EventKind::End);
    assert!(!stroke.is_stroking());
}

#[test]
fn coordinates_are_scaled_to_surface_space() {
    let mut stroke = StrokeEngine::new();
    let start = stroke.pointer_down(pt(100.0, 50.0), half_size(), &ToolState::default()).unwrap();
    let step = stroke.pointer_move(pt(101.5, 60.0)).unwrap();

    assert_eq!(start.point(), Some((200.0, 100.0)));
    assert_eq!(step.point(), Some((203.0, 120.0)));
}

#[test]
fn scale_is_fixed_for_the_whole_stroke() {
    let mut stroke = StrokeEngine::new();
    stroke.pointer_down(pt(0.0, 0.0), half_size(), &ToolState::default());

    // The layout may change mid-stroke; moves keep the pointer-down scale.
    let step = stroke.pointer_move(pt(10.0, 10.0)).unwrap();
    assert_eq!(step.point(), Some((20.0, 20.0)));
}

#[test]
fn eraser_uses_eraser_width() {
    let mut stroke = StrokeEngine::new();
    let tools = ToolState { tool: Tool::Eraser, ..ToolState::default() };

    let start = stroke.pointer_down(pt(1.0, 1.0), Viewport::default(), &tools).unwrap();
    let step = stroke.pointer_move(pt(2.0, 2.0)).unwrap();

    assert_eq!(start.tool, Some(StrokeTool::Eraser));
    assert_eq!(start.line_width, Some(20.0));
    assert_eq!(step.tool, Some(StrokeTool::Eraser));
    assert_eq!(step.line_width, Some(20.0));
}

#[test]
fn fill_tool_emits_single_fill_and_no_stroke() {
    let mut stroke = StrokeEngine::new();
    let tools = ToolState { tool: Tool::Fill, ..ToolState::default() };

    let fill = stroke.pointer_down(pt(5.0, 6.0), half_size(), &tools).unwrap();

    assert_eq!(fill.kind, EventKind::Fill);
    assert_eq!(fill.point(), Some((10.0, 12.0)));
    assert_eq!(fill.color.as_deref(), Some("#FF0000"));
    assert!(fill.is_valid());
    assert!(!stroke.is_stroking());
    assert!(stroke.pointer_move(pt(6.0, 6.0)).is_none());
    assert!(stroke.pointer_up().is_none());
}

#[test]
fn move_without_press_is_ignored() {
    let mut stroke = StrokeEngine::new();
    assert!(stroke.pointer_move(pt(1.0, 1.0)).is_none());
    assert!(stroke.pointer_up().is_none());
}

#[test]
fn second_press_during_stroke_is_ignored() {
    let mut stroke = StrokeEngine::new();
    let tools = ToolState::default();
    stroke.pointer_down(pt(1.0, 1.0), Viewport::default(), &tools);
    assert!(stroke.pointer_down(pt(2.0, 2.0), Viewport::default(), &tools).is_none());
    assert!(stroke.is_stroking());
}

#[test]
fn leave_closes_the_stroke() {
    let mut stroke = StrokeEngine::new();
    stroke.pointer_down(pt(1.0, 1.0), Viewport::default(), &ToolState::default());
    assert_eq!(stroke.pointer_leave().map(|e| e.kind), Some(EventKind::End));
    assert!(stroke.pointer_leave().is_none());
}

#[test]
fn cancel_drops_stroke_silently() {
    let mut stroke = StrokeEngine::new();
    stroke.pointer_down(pt(1.0, 1.0), Viewport::default(), &ToolState::default());
    stroke.cancel();
    assert!(!stroke.is_stroking());
    assert!(stroke.pointer_up().is_none());
}

#[test]
fn emitted_stroke_events_are_valid() {
    let mut stroke = StrokeEngine::new();
    let tools = ToolState::default();
    let events = [
        stroke.pointer_down(pt(1.0, 1.0), Viewport::default(), &tools),
        stroke.pointer_move(pt(3.0, 4.0)),
        stroke.pointer_up(),
    ];
    assert!(events.iter().all(|e| e.as_ref().is_some_and(DrawEvent::is_valid)));
}
