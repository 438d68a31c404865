//! Event applier: replays draw events onto the raster surface.
//!
//! DESIGN
//! ======
//! One applier instance owns the "currently drawing" flag and the path cursor.
//! Local strokes and remote events go through the same [`EventApplier::apply`],
//! so the author and every viewer rasterize identical segments.
//!
//! Echo suppression lives in [`EventApplier::apply_remote`]: a live event that
//! carries this engine's own session tag was already applied optimistically by
//! the author and is skipped. Historical replay never suppresses, because a
//! rejoining participant must see its own earlier strokes again.

#[cfg(test)]
#[path = "applier_test.rs"]
mod applier_test;

use crate::color::Rgba;
use crate::event::{DrawEvent, EventKind, StrokeTool};
use crate::fill::{FillOutcome, flood_fill};
use crate::surface::{Paint, RasterSurface};
use crate::viewport::Point;

/// How an inbound event reached this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Fan-out from the room draw-broadcast topic.
    Live,
    /// Replay from the per-participant history dump.
    Historical,
}

/// Who this engine is on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Participant id shared by every tab the participant has open.
    pub user_id: String,
    /// Unique per engine instance; tags events this engine applied locally.
    pub session_id: String,
}

impl Identity {
    #[must_use]
    pub fn new(user_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), session_id: session_id.into() }
    }

    /// Whether `event` was authored and already applied by this engine.
    ///
    /// Events tagged with a session compare sessions, so another tab signed in
    /// as the same participant still receives them. Untagged events fall back
    /// to the participant id.
    #[must_use]
    pub fn applied_locally(&self, event: &DrawEvent) -> bool {
        match event.session_id.as_deref() {
            Some(session) => session == self.session_id,
            None => event.origin_user_id.as_deref() == Some(self.user_id.as_str()),
        }
    }
}

/// Result of applying one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The surface (or path state) was updated.
    Applied,
    /// A fill ran; carries what it did.
    Filled(FillOutcome),
    /// A live echo of this engine's own event was skipped.
    EchoSuppressed,
    /// The event could not be applied (bad fill seed, missing point).
    Ignored,
}

/// Path state for replaying strokes.
#[derive(Debug, Clone, Default)]
pub struct EventApplier {
    drawing: bool,
    cursor: Option<Point>,
}

impl EventApplier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a stroke is open.
    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    /// Drop any open stroke.
    pub fn reset(&mut self) {
        self.drawing = false;
        self.cursor = None;
    }

    /// Apply an inbound event, skipping live echoes of our own events.
    pub fn apply_remote(
        &mut self,
        surface: &mut RasterSurface,
        event: &DrawEvent,
        delivery: Delivery,
        identity: &Identity,
    ) -> ApplyOutcome {
        if delivery == Delivery::Live && identity.applied_locally(event) {
            tracing::trace!(kind = ?event.kind, "suppressing echo of local event");
            return ApplyOutcome::EchoSuppressed;
        }
        self.apply(surface, event)
    }

    /// Apply one event unconditionally.
    pub fn apply(&mut self, surface: &mut RasterSurface, event: &DrawEvent) -> ApplyOutcome {
        match event.kind {
            EventKind::Clear => {
                surface.clear();
                self.reset();
                ApplyOutcome::Applied
            }
            EventKind::Fill => self.apply_fill(surface, event),
            EventKind::Start => {
                let Some((x, y)) = event.point() else {
                    return ApplyOutcome::Ignored;
                };
                self.cursor = Some(Point::new(x, y));
                self.drawing = true;
                ApplyOutcome::Applied
            }
            EventKind::Move => {
                let Some((x, y)) = event.point() else {
                    return ApplyOutcome::Ignored;
                };
                let to = Point::new(x, y);
                match self.cursor.filter(|_| self.drawing) {
                    Some(from) => {
                        surface.stroke_segment(from, to, event.line_width.unwrap_or(1.0), paint_for(event));
                    }
                    None => {
                        // Orphan MOVE (its START was lost or wiped by CLEAR): open a new path here.
                        tracing::debug!(x, y, "MOVE without open stroke; treating as START");
                        self.drawing = true;
                    }
                }
                self.cursor = Some(to);
                ApplyOutcome::Applied
            }
            EventKind::End => {
                self.reset();
                ApplyOutcome::Applied
            }
        }
    }

    fn apply_fill(&mut self, surface: &mut RasterSurface, event: &DrawEvent) -> ApplyOutcome {
        let Some((x, y)) = event.point() else {
            return ApplyOutcome::Ignored;
        };
        let color = Rgba::parse(event.color.as_deref().unwrap_or_default());
        match flood_fill(surface, x, y, color) {
            Ok(outcome) => ApplyOutcome::Filled(outcome),
            Err(e) => {
                tracing::warn!(error = %e, "fill skipped");
                ApplyOutcome::Ignored
            }
        }
    }
}

fn paint_for(event: &DrawEvent) -> Paint {
    match event.tool.unwrap_or_default() {
        StrokeTool::Eraser => Paint::Erase,
        StrokeTool::Pen => Paint::Over(Rgba::parse(event.color.as_deref().unwrap_or_default())),
    }
}
