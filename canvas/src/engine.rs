//! Engine: wires the drawing core to inbound and outbound frames.
//!
//! DESIGN
//! ======
//! `EngineCore` holds every piece of per-client drawing state and is driven by
//! three kinds of input: frames from the relay, pointer events from the host,
//! and lifecycle calls (enter room, mount, unmount). Every entry point returns
//! a list of [`Action`]s; the host performs them (send a frame, repaint, show
//! a toast). Nothing here touches the DOM, so the whole protocol is testable
//! natively.
//!
//! `Engine` is the browser wrapper: it owns the `HtmlCanvasElement`, reads its
//! displayed size for coordinate scaling, and blits the raster surface.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use frames::{DRAW_CLEAR, DRAW_EVENT, DRAW_HISTORY, Frame, ROOM_JOIN, ROOM_LEAVE, ROOM_STATE, Status};
use serde_json::{Value, json};
use wasm_bindgen::{Clamped, JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

use crate::applier::{ApplyOutcome, EventApplier, Identity};
use crate::consts::{STATE_DRAWER_CHANGED, STATE_GAME_START, STATE_ROOM_DESTROYED, STATE_USER_UPDATE};
use crate::drawer::RoomSession;
use crate::error::CanvasError;
use crate::event::{DrawEvent, parse_events};
use crate::fill::FillOutcome;
use crate::history::{HistoryRequest, HistorySync, Ready};
use crate::input::{Button, Tool, ToolState};
use crate::stroke::StrokeEngine;
use crate::surface::RasterSurface;
use crate::viewport::{Point, Size, Viewport};

/// Actions returned from engine entry points for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Send this frame to the relay.
    Publish(Frame),
    /// The surface changed; repaint.
    RenderNeeded,
    /// Show the one-time "you are now drawer" notice.
    ShowDrawerNotice,
    /// Tool settings changed; update the UI and persist them.
    ToolsChanged(ToolState),
    /// The room is gone; navigate away.
    RoomClosed,
}

/// Core engine state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore {
    pub identity: Identity,
    pub tools: ToolState,
    room: Option<RoomSession>,
    surface: Option<RasterSurface>,
    /// Replays relay traffic.
    applier: EventApplier,
    /// Renders our own strokes; its path never sees remote events.
    author: EventApplier,
    stroke: StrokeEngine,
    history: HistorySync,
    connected: bool,
    leave_sent: bool,
}

impl EngineCore {
    /// Create an engine for `user_id` with a fresh session tag.
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self::with_session(user_id, uuid::Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn with_session(user_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            identity: Identity::new(user_id, session_id),
            tools: ToolState::default(),
            room: None,
            surface: None,
            applier: EventApplier::new(),
            author: EventApplier::new(),
            stroke: StrokeEngine::new(),
            history: HistorySync::new(),
            connected: true,
            leave_sent: false,
        }
    }

    // --- Lifecycle ---

    /// Transport state as reported by the host. Publishes while down are dropped.
    ///
    /// On reconnect inside a room the join is repeated, and the backlog is
    /// asked for again unless it was already delivered.
    pub fn set_connected(&mut self, connected: bool) -> Vec<Action> {
        let was_connected = std::mem::replace(&mut self.connected, connected);
        let mut actions = Vec::new();
        if connected && !was_connected && self.room.is_some() {
            tracing::info!(user_id = %self.identity.user_id, "reconnected; rejoining room");
            let join = Frame::request(ROOM_JOIN, json!({ "userId": self.identity.user_id }));
            self.publish(join, &mut actions);
            self.request_history(&mut actions);
        }
        actions
    }

    /// Join `room_id` and ask for its backlog once.
    pub fn enter_room(&mut self, room_id: &str) -> Vec<Action> {
        if self.room.as_ref().is_some_and(|room| room.room_id() == room_id) {
            return Vec::new();
        }
        let mut actions = self.leave_room();
        tracing::info!(room_id, user_id = %self.identity.user_id, "entering room");

        self.room = Some(RoomSession::new(room_id));
        self.history = HistorySync::new();
        self.leave_sent = false;
        self.stroke.cancel();
        self.reset_appliers();

        let join = Frame::request(ROOM_JOIN, json!({ "userId": self.identity.user_id }));
        self.publish(join, &mut actions);
        self.request_history(&mut actions);

        if let Some(surface) = self.surface.as_mut() {
            // Surface outlives the previous room; start blank and take the backlog.
            surface.clear();
            actions.push(Action::RenderNeeded);
            let drained = self.history.mark_ready();
            self.apply_ready(drained, &mut actions);
        }
        actions
    }

    /// Create the raster surface and replay whatever arrived before it.
    pub fn mount_surface(&mut self, width: u32, height: u32) -> Vec<Action> {
        tracing::debug!(width, height, "mounting surface");
        self.surface = Some(RasterSurface::new(width, height));
        self.reset_appliers();
        let mut actions = vec![Action::RenderNeeded];
        if self.room.is_some() {
            let drained = self.history.mark_ready();
            self.apply_ready(drained, &mut actions);
        }
        actions
    }

    /// Screen teardown: leave the room (once) and drop the surface.
    pub fn unmount(&mut self) -> Vec<Action> {
        let actions = self.leave_room();
        self.surface = None;
        actions
    }

    /// Publish `room:leave` at most once per room entry and forget the room.
    pub fn leave_room(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        let Some(room) = self.room.take() else {
            return actions;
        };
        self.stroke.cancel();
        self.reset_appliers();
        self.history = HistorySync::new();
        if !std::mem::replace(&mut self.leave_sent, true) {
            tracing::info!(room_id = room.room_id(), "leaving room");
            let leave = Frame::request(ROOM_LEAVE, json!({ "userId": self.identity.user_id }))
                .with_room_id(room.room_id());
            self.send(leave, &mut actions);
        }
        actions
    }

    // --- Inbound frames ---

    /// Route one frame received from the relay.
    pub fn handle_frame(&mut self, frame: &Frame) -> Vec<Action> {
        let mut actions = Vec::new();
        let Some(room_id) = self.room.as_ref().map(|room| room.room_id().to_owned()) else {
            tracing::debug!(syscall = %frame.syscall, "frame outside any room; ignoring");
            return actions;
        };
        if frame.room_id.as_deref().is_some_and(|id| id != room_id) {
            tracing::debug!(syscall = %frame.syscall, "frame for another room; ignoring");
            return actions;
        }
        if frame.status == Status::Error {
            tracing::warn!(syscall = %frame.syscall, message = ?frame.data_str(frames::FRAME_MESSAGE), "relay error");
            if frame.syscall == DRAW_HISTORY {
                self.history.on_history_error();
            }
            return actions;
        }

        match frame.syscall.as_str() {
            DRAW_EVENT => self.on_draw_event(&frame.data, &mut actions),
            DRAW_HISTORY if frame.status == Status::Done => self.on_history(&frame.data, &mut actions),
            ROOM_STATE => self.on_room_state(&frame.data, &mut actions),
            _ => tracing::trace!(syscall = %frame.syscall, status = ?frame.status, "unhandled frame"),
        }
        actions
    }

    fn on_draw_event(&mut self, data: &Value, actions: &mut Vec<Action>) {
        let event = match DrawEvent::from_value(data) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, "dropping live event");
                return;
            }
        };
        if let Some(ready) = self.history.on_live(event) {
            self.apply_ready(vec![ready], actions);
        }
    }

    fn on_history(&mut self, data: &Value, actions: &mut Vec<Action>) {
        let values = data.get("events").and_then(Value::as_array).map_or(&[][..], Vec::as_slice);
        let events = parse_events(values);
        tracing::debug!(count = events.len(), "history dump received");
        let released = self.history.on_history(events);
        self.apply_ready(released, actions);
    }

    fn on_room_state(&mut self, data: &Value, actions: &mut Vec<Action>) {
        match data.get("type").and_then(Value::as_str) {
            Some(STATE_DRAWER_CHANGED) => {
                let Some(new_drawer) = data.get("newDrawerId").and_then(Value::as_str) else {
                    tracing::warn!("DRAWER_CHANGED without newDrawerId");
                    return;
                };
                self.on_drawer_changed(new_drawer, actions);
            }
            Some(STATE_GAME_START) => {
                if let Some(room) = self.room.as_mut() {
                    room.begin_game();
                }
            }
            Some(STATE_ROOM_DESTROYED) => {
                actions.extend(self.unmount());
                actions.push(Action::RoomClosed);
            }
            Some(STATE_USER_UPDATE) => tracing::trace!("membership update"),
            other => tracing::debug!(kind = ?other, "unknown room state"),
        }
    }

    fn on_drawer_changed(&mut self, new_drawer: &str, actions: &mut Vec<Action>) {
        let Some(room) = self.room.as_mut() else {
            return;
        };
        let Some(change) = room.on_drawer_changed(new_drawer, &self.identity.user_id) else {
            return;
        };
        tracing::info!(new_drawer, became_drawer = change.became_drawer, "drawer changed");
        self.stroke.cancel();
        self.reset_appliers();

        if change.became_drawer {
            self.tools.reset_for_new_drawer();
            actions.push(Action::ToolsChanged(self.tools.clone()));
            self.clear_and_broadcast(actions);
        }
        if change.show_notice {
            actions.push(Action::ShowDrawerNotice);
        }
    }

    /// Apply events released by history reconciliation, in order.
    fn apply_ready(&mut self, ready: Vec<Ready>, actions: &mut Vec<Action>) {
        if ready.is_empty() {
            return;
        }
        let Some(surface) = self.surface.as_mut() else {
            tracing::warn!(error = %CanvasError::SurfaceNotReady, count = ready.len(), "events released before surface");
            return;
        };
        let mut changed = false;
        for (event, delivery) in ready {
            let outcome = self.applier.apply_remote(surface, &event, delivery, &self.identity);
            changed |= matches!(outcome, ApplyOutcome::Applied | ApplyOutcome::Filled(FillOutcome::Filled { .. }));
        }
        if changed {
            actions.push(Action::RenderNeeded);
        }
    }

    // --- Local input ---

    /// Pointer pressed at `screen_pt` on a canvas displayed at `displayed`.
    pub fn on_pointer_down(&mut self, screen_pt: Point, displayed: Size, button: Button) -> Vec<Action> {
        let mut actions = Vec::new();
        if button != Button::Primary || !self.is_drawer() {
            return actions;
        }
        let Some(surface) = self.surface.as_ref() else {
            tracing::debug!(error = %CanvasError::SurfaceNotReady, "pointer down ignored");
            return actions;
        };
        let intrinsic = Size::new(f64::from(surface.width()), f64::from(surface.height()));
        let viewport = Viewport::new(intrinsic, displayed);
        if let Some(event) = self.stroke.pointer_down(screen_pt, viewport, &self.tools) {
            self.emit(event, &mut actions);
        }
        actions
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        let mut actions = Vec::new();
        if let Some(event) = self.stroke.pointer_move(screen_pt) {
            self.emit(event, &mut actions);
        }
        actions
    }

    pub fn on_pointer_up(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        if let Some(event) = self.stroke.pointer_up() {
            self.emit(event, &mut actions);
        }
        actions
    }

    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        if let Some(event) = self.stroke.pointer_leave() {
            self.emit(event, &mut actions);
        }
        actions
    }

    /// Apply a locally authored event, then publish it tagged with our session.
    fn emit(&mut self, event: DrawEvent, actions: &mut Vec<Action>) {
        let event = event.authored_by(&self.identity.user_id, &self.identity.session_id);
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        match self.author.apply(surface, &event) {
            ApplyOutcome::Filled(FillOutcome::AlreadyTarget) | ApplyOutcome::Ignored => {
                tracing::debug!(kind = ?event.kind, "local event changed nothing; not publishing");
                return;
            }
            ApplyOutcome::Applied | ApplyOutcome::Filled(_) | ApplyOutcome::EchoSuppressed => {}
        }
        actions.push(Action::RenderNeeded);
        self.publish(Frame::request(DRAW_EVENT, event.to_value()), actions);
    }

    /// Wipe locally and ask the relay to broadcast `CLEAR` to everyone else.
    fn clear_and_broadcast(&mut self, actions: &mut Vec<Action>) {
        if let Some(surface) = self.surface.as_mut() {
            self.author.apply(surface, &DrawEvent::clear());
            actions.push(Action::RenderNeeded);
        }
        let clear = Frame::request(
            DRAW_CLEAR,
            json!({ "originUserId": self.identity.user_id, "sessionId": self.identity.session_id }),
        );
        self.publish(clear, actions);
    }

    // --- Tools ---

    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        self.tools.tool = tool;
        vec![Action::ToolsChanged(self.tools.clone())]
    }

    /// Set the color of the active tool.
    pub fn set_color(&mut self, color: &str) -> Vec<Action> {
        self.tools.set_active_color(color);
        vec![Action::ToolsChanged(self.tools.clone())]
    }

    /// Set the width of the active stroke tool.
    pub fn set_width(&mut self, width: f64) -> Vec<Action> {
        if self.tools.set_active_width(width) {
            vec![Action::ToolsChanged(self.tools.clone())]
        } else {
            Vec::new()
        }
    }

    /// Clear button: only the drawer may wipe the shared canvas.
    pub fn request_clear(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.is_drawer() {
            self.stroke.cancel();
            self.clear_and_broadcast(&mut actions);
        }
        actions
    }

    /// Tool settings as JSON for the host to persist.
    #[must_use]
    pub fn tool_state_json(&self) -> String {
        serde_json::to_string(&self.tools).unwrap_or_default()
    }

    /// Restore persisted tool settings; a corrupt value falls back to defaults.
    pub fn restore_tool_state(&mut self, json: &str) -> Vec<Action> {
        self.tools = serde_json::from_str(json).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "persisted tool state unreadable; using defaults");
            ToolState::default()
        });
        vec![Action::ToolsChanged(self.tools.clone())]
    }

    // --- Outbound ---

    /// Ask for the backlog until one has been delivered for this room entry.
    ///
    /// An outstanding request is repeated on reconnect; its reply died with
    /// the old connection.
    fn request_history(&mut self, actions: &mut Vec<Action>) {
        if self.history.request_state() == HistoryRequest::Delivered {
            return;
        }
        if self.publish(Frame::request(DRAW_HISTORY, json!({})), actions) {
            self.history.request();
        }
    }

    /// Address `frame` to the current room and send it. `false` if dropped.
    fn publish(&self, frame: Frame, actions: &mut Vec<Action>) -> bool {
        let Some(room) = self.room.as_ref() else {
            tracing::debug!(syscall = %frame.syscall, "not in a room; dropping frame");
            return false;
        };
        self.send(frame.with_room_id(room.room_id()), actions)
    }

    fn send(&self, frame: Frame, actions: &mut Vec<Action>) -> bool {
        if !self.connected {
            tracing::warn!(error = %CanvasError::TransportDisconnected, syscall = %frame.syscall, "dropping frame");
            return false;
        }
        actions.push(Action::Publish(frame.with_from(self.identity.user_id.clone())));
        true
    }

    fn reset_appliers(&mut self) {
        self.applier.reset();
        self.author.reset();
    }

    // --- Queries ---

    #[must_use]
    pub fn surface(&self) -> Option<&RasterSurface> {
        self.surface.as_ref()
    }

    /// The surface, if it changed since the last call.
    pub fn take_dirty_surface(&mut self) -> Option<&RasterSurface> {
        let surface = self.surface.as_mut()?;
        if surface.take_dirty() { Some(surface) } else { None }
    }

    #[must_use]
    pub fn room(&self) -> Option<&RoomSession> {
        self.room.as_ref()
    }

    #[must_use]
    pub fn is_drawer(&self) -> bool {
        self.room.as_ref().is_some_and(|room| room.is_drawer(&self.identity.user_id))
    }

    /// Whether a stroke is open, locally or from a replayed event.
    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.stroke.is_stroking() || self.applier.is_drawing()
    }

    #[must_use]
    pub fn history(&self) -> &HistorySync {
        &self.history
    }
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement, user_id: impl Into<String>) -> Self {
        Self { canvas, core: EngineCore::new(user_id) }
    }

    /// Size the surface to the element's intrinsic pixel size.
    pub fn mount(&mut self) -> Vec<Action> {
        self.core.mount_surface(self.canvas.width(), self.canvas.height())
    }

    pub fn unmount(&mut self) -> Vec<Action> {
        self.core.unmount()
    }

    /// CSS size the element is laid out at.
    fn displayed_size(&self) -> Size {
        Size::new(f64::from(self.canvas.client_width()), f64::from(self.canvas.client_height()))
    }

    // --- Delegated inputs ---

    pub fn enter_room(&mut self, room_id: &str) -> Vec<Action> {
        self.core.enter_room(room_id)
    }

    pub fn handle_frame(&mut self, frame: &Frame) -> Vec<Action> {
        self.core.handle_frame(frame)
    }

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button) -> Vec<Action> {
        let displayed = self.displayed_size();
        self.core.on_pointer_down(screen_pt, displayed, button)
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        self.core.on_pointer_move(screen_pt)
    }

    pub fn on_pointer_up(&mut self) -> Vec<Action> {
        self.core.on_pointer_up()
    }

    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        self.core.on_pointer_leave()
    }

    // --- Render ---

    /// Copy the surface into the canvas if it changed.
    ///
    /// # Errors
    ///
    /// Returns the browser error if the 2D context or image data cannot be created.
    pub fn render(&mut self) -> Result<(), JsValue> {
        let Some(surface) = self.core.take_dirty_surface() else {
            return Ok(());
        };
        let ctx = self
            .canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("missing 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        let image = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(surface.pixels()),
            surface.width(),
            surface.height(),
        )?;
        ctx.put_image_data(&image, 0.0, 0.0)
    }
}
