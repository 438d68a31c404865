//! WebSocket handler: bidirectional frame relay for drawing rooms.
//!
//! DESIGN
//! ======
//! On upgrade, generates a client ID and enters a `select!` loop:
//! - Incoming client frames → decode + dispatch by syscall
//! - Frames queued by room peers → forward to client
//!
//! Handler functions validate, mutate room state, and return an `Outcome`.
//! Anything addressed to other participants (draw fan-out, state relay,
//! history replies) goes through the room service, which enqueues it on the
//! per-client channel so every client sees room traffic in one order.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → pick JSON or binary encoding from `?encoding=`
//! 2. `room:join` → register in a room
//! 3. `draw:*` / `room:state` → dispatch → handler returns Outcome
//! 4. Close → part the room (the last participant out evicts it)

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use canvas::consts::STATE_ROOM_DESTROYED;
use frames::{DRAW_CLEAR, DRAW_EVENT, DRAW_HISTORY, Frame, ROOM_JOIN, ROOM_LEAVE, ROOM_STATE, Status};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::services::room::{self, RoomError, now_ms};
use crate::state::AppState;

// =============================================================================
// OUTCOME
// =============================================================================

/// Result returned by handler functions. The dispatch layer turns it into
/// the frames sent back to the requester.
#[derive(Debug)]
enum Outcome {
    /// Send empty done to sender only.
    Done,
    /// Send done+data to sender only.
    Reply(Value),
    /// Nothing for the sender; any traffic was queued by the room service.
    Silent,
}

// =============================================================================
// CONNECTION STATE
// =============================================================================

/// Wire format negotiated at upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Json,
    Binary,
}

#[derive(Debug, Default, Deserialize)]
pub struct WsParams {
    #[serde(default)]
    encoding: Option<String>,
}

impl WsParams {
    fn encoding(&self) -> Encoding {
        match self.encoding.as_deref() {
            Some("binary") => Encoding::Binary,
            _ => Encoding::Json,
        }
    }
}

/// What the relay knows about one connection.
#[derive(Debug)]
struct Session {
    client_id: Uuid,
    user_id: String,
    room_id: Option<String>,
}

impl Session {
    fn new(client_id: Uuid) -> Self {
        Self { client_id, user_id: client_id.to_string(), room_id: None }
    }
}

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, Query(params): Query<WsParams>, ws: WebSocketUpgrade) -> Response {
    let encoding = params.encoding();
    ws.on_upgrade(move |socket| run_ws(socket, state, encoding))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState, encoding: Encoding) {
    let mut session = Session::new(Uuid::new_v4());

    // Per-connection channel for frames queued by room peers.
    let (client_tx, mut client_rx) = mpsc::channel::<Frame>(state.config.client_channel_capacity);

    info!(client_id = %session.client_id, ?encoding, "ws: client connected");

    'conn: loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                let replies = match msg {
                    Message::Text(text) => process_inbound_text(&state, &mut session, &client_tx, text.as_str()).await,
                    Message::Binary(bytes) => process_inbound_bytes(&state, &mut session, &client_tx, &bytes).await,
                    Message::Close(_) => break,
                    _ => continue,
                };
                for frame in &replies {
                    if send_frame(&mut socket, encoding, frame).await.is_err() {
                        break 'conn;
                    }
                }
            }
            Some(frame) = client_rx.recv() => {
                if send_frame(&mut socket, encoding, &frame).await.is_err() {
                    break;
                }
            }
        }
    }

    if let Some(room_id) = session.room_id.take() {
        room::part(&state, &room_id, session.client_id).await;
    }
    info!(client_id = %session.client_id, "ws: client disconnected");
}

// =============================================================================
// FRAME DISPATCH
// =============================================================================

/// Decode and process one inbound JSON frame; returns frames for the sender.
async fn process_inbound_text(
    state: &AppState,
    session: &mut Session,
    client_tx: &mpsc::Sender<Frame>,
    text: &str,
) -> Vec<Frame> {
    match frames::decode_frame_json(text) {
        Ok(req) => process_frame(state, session, client_tx, req).await,
        Err(e) => vec![gateway_error(session, &e)],
    }
}

/// Decode and process one inbound binary frame; returns frames for the sender.
async fn process_inbound_bytes(
    state: &AppState,
    session: &mut Session,
    client_tx: &mpsc::Sender<Frame>,
    bytes: &[u8],
) -> Vec<Frame> {
    match frames::decode_frame(bytes) {
        Ok(req) => process_frame(state, session, client_tx, req).await,
        Err(e) => vec![gateway_error(session, &e)],
    }
}

fn gateway_error(session: &Session, err: &frames::CodecError) -> Frame {
    warn!(client_id = %session.client_id, error = %err, "ws: invalid inbound frame");
    Frame::request("gateway:error", json!({})).with_data(frames::FRAME_MESSAGE, format!("invalid frame: {err}"))
}

async fn process_frame(
    state: &AppState,
    session: &mut Session,
    client_tx: &mpsc::Sender<Frame>,
    mut req: Frame,
) -> Vec<Frame> {
    // The relay is the clock and the identity source; client claims are not trusted.
    req.ts = now_ms();
    req.from = Some(session.user_id.clone());

    if req.status != Status::Request {
        debug!(client_id = %session.client_id, syscall = %req.syscall, status = ?req.status, "ws: ignoring non-request");
        return vec![];
    }
    if req.syscall != DRAW_EVENT {
        info!(client_id = %session.client_id, id = %req.id, syscall = %req.syscall, "ws: recv frame");
    }

    let result = match req.syscall.as_str() {
        ROOM_JOIN => handle_join(state, session, client_tx, &req).await,
        ROOM_LEAVE => Ok(handle_leave(state, session).await),
        DRAW_EVENT | DRAW_CLEAR | DRAW_HISTORY | ROOM_STATE => handle_room(state, session, &req).await,
        other => Err(req.error(format!("unknown syscall: {other}"))),
    };

    match result {
        Ok(Outcome::Done) => vec![req.done()],
        Ok(Outcome::Reply(data)) => vec![req.done_with(data)],
        Ok(Outcome::Silent) => vec![],
        Err(err_frame) => vec![err_frame],
    }
}

// =============================================================================
// ROOM HANDLERS
// =============================================================================

async fn handle_join(
    state: &AppState,
    session: &mut Session,
    client_tx: &mpsc::Sender<Frame>,
    req: &Frame,
) -> Result<Outcome, Frame> {
    let Some(room_id) = req.room_id.clone().or_else(|| req.data_str("roomId").map(str::to_owned)) else {
        return Err(req.error("roomId required"));
    };

    if let Some(old_room) = session.room_id.take() {
        room::part(state, &old_room, session.client_id).await;
    }
    if let Some(user_id) = req.data_str("userId").filter(|u| !u.is_empty()) {
        session.user_id = user_id.to_owned();
    }

    room::join(state, &room_id, session.client_id, &session.user_id, client_tx.clone()).await;
    let reply = json!({ "roomId": room_id, "clientId": session.client_id, "userId": session.user_id });
    session.room_id = Some(room_id);
    Ok(Outcome::Reply(reply))
}

async fn handle_leave(state: &AppState, session: &mut Session) -> Outcome {
    if let Some(room_id) = session.room_id.take() {
        room::part(state, &room_id, session.client_id).await;
    }
    Outcome::Done
}

async fn handle_room(state: &AppState, session: &mut Session, req: &Frame) -> Result<Outcome, Frame> {
    let Some(room_id) = session.room_id.clone() else {
        return Err(req.error_from(&RoomError::NotInRoom));
    };
    let client_id = session.client_id;

    let result = match req.syscall.as_str() {
        DRAW_EVENT => room::publish_draw(state, &room_id, client_id, &req.data).await.map(|()| Outcome::Silent),
        DRAW_CLEAR => room::clear(state, &room_id, client_id, &req.data).await.map(|()| Outcome::Done),
        DRAW_HISTORY => room::history(state, &room_id, client_id, req).await.map(|()| Outcome::Silent),
        _ => {
            let outcome = room::relay_state(state, &room_id, client_id, &req.data).await.map(|()| Outcome::Silent);
            if req.data_str("type") == Some(STATE_ROOM_DESTROYED) {
                session.room_id = None;
            }
            outcome
        }
    };
    result.map_err(|e| {
        debug!(%client_id, %room_id, syscall = %req.syscall, error = %e, "ws: request rejected");
        req.error_from(&e)
    })
}

// =============================================================================
// HELPERS
// =============================================================================

async fn send_frame(socket: &mut WebSocket, encoding: Encoding, frame: &Frame) -> Result<(), ()> {
    let msg = match encoding {
        Encoding::Binary => Message::Binary(frames::encode_frame(frame).into()),
        Encoding::Json => match frames::encode_frame_json(frame) {
            Ok(json) => Message::Text(json.into()),
            Err(e) => {
                warn!(error = %e, "ws: failed to serialize frame");
                return Err(());
            }
        },
    };
    if frame.status == Status::Error {
        let code = frame.data_str(frames::FRAME_CODE).unwrap_or("-");
        let message = frame.data_str(frames::FRAME_MESSAGE).unwrap_or("-");
        warn!(id = %frame.id, syscall = %frame.syscall, code, message, "ws: send frame status=Error");
    }
    socket.send(msg).await.map_err(|_| ())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
