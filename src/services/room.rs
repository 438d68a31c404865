//! Room service: membership, draw fan-out, history, and state relay.
//!
//! DESIGN
//! ======
//! Rooms live only in memory. Every broadcast and every history reply is
//! enqueued on the target client's outbound channel while the room lock is
//! held, so a client observes one total order of room traffic: a history
//! reply lands after every broadcast that was already queued for it, and
//! before any broadcast that follows.
//!
//! Draw events are validated with the same event model the clients replay,
//! so a malformed payload is rejected here and never reaches history.
//!
//! ERROR HANDLING
//! ==============
//! Broadcasts are best-effort. A client whose channel is full or closed
//! misses that frame; it repairs itself with a history request on rejoin.

use canvas::consts::{STATE_DRAWER_CHANGED, STATE_GAME_START, STATE_ROOM_DESTROYED};
use canvas::error::CanvasError;
use canvas::event::DrawEvent;
use frames::{DRAW_EVENT, Frame, ROOM_STATE};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::state::{AppState, ConnectedClient, RoomState};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    #[error("must join a room first")]
    NotInRoom,
    #[error("{0}")]
    MalformedEvent(#[from] CanvasError),
    #[error("only the current drawer may draw")]
    NotDrawer,
    #[error("history reply could not be queued")]
    HistoryUnavailable,
}

impl frames::ErrorCode for RoomError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotInRoom => "E_NOT_IN_ROOM",
            Self::MalformedEvent(_) => "E_MALFORMED_EVENT",
            Self::NotDrawer => "E_NOT_DRAWER",
            Self::HistoryUnavailable => "E_HISTORY_UNAVAILABLE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::HistoryUnavailable)
    }
}

// =============================================================================
// JOIN / PART
// =============================================================================

/// Register a client in a room, creating the room on first join.
pub async fn join(state: &AppState, room_id: &str, client_id: Uuid, user_id: &str, tx: mpsc::Sender<Frame>) {
    let mut rooms = state.rooms.write().await;
    let room = rooms.entry(room_id.to_owned()).or_insert_with(RoomState::new);
    room.clients.insert(client_id, ConnectedClient { user_id: user_id.to_owned(), tx });
    info!(%room_id, %client_id, %user_id, clients = room.clients.len(), "client joined room");
}

/// Remove a client. The last one out evicts the room and its drawing.
pub async fn part(state: &AppState, room_id: &str, client_id: Uuid) {
    let mut rooms = state.rooms.write().await;
    let Some(room) = rooms.get_mut(room_id) else {
        return;
    };
    room.clients.remove(&client_id);
    info!(%room_id, %client_id, remaining = room.clients.len(), "client left room");

    if room.clients.is_empty() {
        rooms.remove(room_id);
        info!(%room_id, "evicted room from memory");
    }
}

// =============================================================================
// DRAW
// =============================================================================

/// Validate, stamp, record, and fan out one draw event.
///
/// # Errors
///
/// `NotInRoom` if the client has not joined `room_id`, `MalformedEvent` if
/// the payload fails validation, `NotDrawer` if another participant holds
/// the drawer role.
pub async fn publish_draw(state: &AppState, room_id: &str, client_id: Uuid, data: &Value) -> Result<(), RoomError> {
    let mut event = DrawEvent::from_value(data)?;

    let mut rooms = state.rooms.write().await;
    let room = rooms.get_mut(room_id).ok_or(RoomError::NotInRoom)?;
    let user_id = authorized_drawer(room, client_id)?;

    event.origin_user_id = Some(user_id.clone());
    let value = event.to_value();
    room.record(value.clone(), state.config.history_limit);

    let frame = Frame::request(DRAW_EVENT, value)
        .with_room_id(room_id)
        .with_from(user_id)
        .with_ts(now_ms());
    let exclude = (!state.config.echo_to_sender).then_some(client_id);
    broadcast(room, &frame, exclude);
    Ok(())
}

/// Wipe the round's history and broadcast `CLEAR` to the room.
///
/// The outgoing event carries the requester's `sessionId` so the requester
/// recognises it as already applied.
///
/// # Errors
///
/// `NotInRoom` or `NotDrawer`, as for [`publish_draw`].
pub async fn clear(state: &AppState, room_id: &str, client_id: Uuid, data: &Value) -> Result<(), RoomError> {
    let mut rooms = state.rooms.write().await;
    let room = rooms.get_mut(room_id).ok_or(RoomError::NotInRoom)?;
    let user_id = authorized_drawer(room, client_id)?;

    let dropped = room.history.len();
    room.history.clear();
    debug!(%room_id, dropped, "history cleared");

    let mut event = DrawEvent::clear();
    event.origin_user_id = Some(user_id.clone());
    event.session_id = data.get("sessionId").and_then(Value::as_str).map(str::to_owned);

    let frame = Frame::request(DRAW_EVENT, event.to_value())
        .with_room_id(room_id)
        .with_from(user_id)
        .with_ts(now_ms());
    let exclude = (!state.config.echo_to_sender).then_some(client_id);
    broadcast(room, &frame, exclude);
    Ok(())
}

/// Queue the full history to the requester as the `done` reply to `req`.
///
/// # Errors
///
/// `NotInRoom` if the client has not joined `room_id`, `HistoryUnavailable`
/// if the requester's channel is full or closed.
pub async fn history(state: &AppState, room_id: &str, client_id: Uuid, req: &Frame) -> Result<(), RoomError> {
    let rooms = state.rooms.read().await;
    let room = rooms.get(room_id).ok_or(RoomError::NotInRoom)?;
    let client = room.clients.get(&client_id).ok_or(RoomError::NotInRoom)?;

    let events: Vec<Value> = room.history.iter().cloned().collect();
    let count = events.len();
    let reply = req.done_with(json!({ "events": events })).with_room_id(room_id).with_ts(now_ms());
    if let Err(e) = client.tx.try_send(reply) {
        warn!(%room_id, %client_id, error = %e, "history reply dropped");
        return Err(RoomError::HistoryUnavailable);
    }
    debug!(%room_id, %client_id, count, "history queued");
    Ok(())
}

// =============================================================================
// ROOM STATE
// =============================================================================

/// Relay a game-state notification to every member, sender included.
///
/// `DRAWER_CHANGED` records the new drawer for the draw guard and
/// `GAME_START` forgets it. `ROOM_DESTROYED` evicts the room after the
/// broadcast.
///
/// # Errors
///
/// `NotInRoom` if the client has not joined `room_id`.
pub async fn relay_state(state: &AppState, room_id: &str, client_id: Uuid, data: &Value) -> Result<(), RoomError> {
    let mut rooms = state.rooms.write().await;
    let room = rooms.get_mut(room_id).ok_or(RoomError::NotInRoom)?;
    let from = room.clients.get(&client_id).ok_or(RoomError::NotInRoom)?.user_id.clone();

    let kind = data.get("type").and_then(Value::as_str).unwrap_or_default();
    if kind == STATE_DRAWER_CHANGED {
        room.drawer = data.get("newDrawerId").and_then(Value::as_str).map(str::to_owned);
        info!(%room_id, drawer = ?room.drawer, "drawer changed");
    } else if kind == STATE_GAME_START {
        room.drawer = None;
    }

    let frame = Frame::request(ROOM_STATE, data.clone())
        .with_room_id(room_id)
        .with_from(from)
        .with_ts(now_ms());
    broadcast(room, &frame, None);

    if kind == STATE_ROOM_DESTROYED {
        rooms.remove(room_id);
        info!(%room_id, "room destroyed");
    }
    Ok(())
}

// =============================================================================
// BROADCAST
// =============================================================================

/// Send a frame to every client in a locked room, optionally excluding one.
fn broadcast(room: &RoomState, frame: &Frame, exclude: Option<Uuid>) {
    for (client_id, client) in &room.clients {
        if exclude == Some(*client_id) {
            continue;
        }
        // Best-effort: if a client's channel is full, skip it.
        if let Err(e) = client.tx.try_send(frame.clone()) {
            debug!(%client_id, error = %e, syscall = %frame.syscall, "broadcast skipped");
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Joined participant id, if it may draw right now.
fn authorized_drawer(room: &RoomState, client_id: Uuid) -> Result<String, RoomError> {
    let client = room.clients.get(&client_id).ok_or(RoomError::NotInRoom)?;
    if room.drawer.as_ref().is_some_and(|drawer| *drawer != client.user_id) {
        return Err(RoomError::NotDrawer);
    }
    Ok(client.user_id.clone())
}

/// Milliseconds since the Unix epoch.
#[must_use]
pub fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
}

#[cfg(test)]
#[path = "room_test.rs"]
mod tests;
