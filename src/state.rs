//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the relay config and a map of live rooms. Each room keeps its
//! connected clients, the current round's draw history, and the last
//! announced drawer. Nothing is persisted: an empty room is evicted.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use frames::Frame;
use serde_json::Value;
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use crate::config::RelayConfig;

// =============================================================================
// ROOM STATE
// =============================================================================

/// One live connection in a room.
#[derive(Debug, Clone)]
pub struct ConnectedClient {
    /// Participant id announced in `room:join`.
    pub user_id: String,
    /// Sender for outgoing frames.
    pub tx: mpsc::Sender<Frame>,
}

/// Per-room live state.
#[derive(Debug, Default)]
pub struct RoomState {
    /// Connected clients: `client_id` -> participant and sender.
    pub clients: HashMap<Uuid, ConnectedClient>,
    /// Valid draw events of the current round, oldest first.
    pub history: VecDeque<Value>,
    /// Participant currently allowed to draw, once announced.
    pub drawer: Option<String>,
}

impl RoomState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, dropping the oldest beyond `limit`.
    pub fn record(&mut self, event: Value, limit: usize) {
        self.history.push_back(event);
        while self.history.len() > limit {
            self.history.pop_front();
        }
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub rooms: Arc<RwLock<HashMap<String, RoomState>>>,
}

impl AppState {
    #[must_use]
    pub fn new(config: RelayConfig) -> Self {
        Self { config: Arc::new(config), rooms: Arc::new(RwLock::new(HashMap::new())) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
