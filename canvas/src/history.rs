//! History reconciliation: brings a late joiner to parity without double-applying.
//!
//! DESIGN
//! ======
//! Two independent axes:
//!
//! - **Surface phase**: `NotReady` until the raster surface exists, then `Live`.
//!   Draining the pending buffer is the one-way step between them and runs
//!   exactly once inside [`HistorySync::mark_ready`].
//! - **History request**: `NotRequested` → `Requested` → `Delivered`. The
//!   backlog is asked for once per room entry, and only counts as requested
//!   once the request frame was actually handed to the transport. An error
//!   reply counts as an empty delivery so live traffic is never held back
//!   for a dump that will not come.
//!
//! While a requested dump is still outstanding, live events are discarded.
//! The relay queues the dump behind every broadcast it already sent on this
//! connection, so anything dropped here is contained in the dump. Once the
//! dump has arrived, live events queue behind it until the surface is ready,
//! then flow straight through.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use crate::applier::Delivery;
use crate::event::DrawEvent;

/// Whether the raster surface can take events yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfacePhase {
    NotReady,
    Live,
}

/// Progress of the one-shot backlog request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryRequest {
    NotRequested,
    Requested,
    Delivered,
}

/// An event released for application, with how it arrived.
pub type Ready = (DrawEvent, Delivery);

/// Pending-buffer bookkeeping for one room entry.
#[derive(Debug, Clone)]
pub struct HistorySync {
    phase: SurfacePhase,
    request: HistoryRequest,
    pending: Vec<Ready>,
}

impl Default for HistorySync {
    fn default() -> Self {
        Self { phase: SurfacePhase::NotReady, request: HistoryRequest::NotRequested, pending: Vec::new() }
    }
}

impl HistorySync {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn phase(&self) -> SurfacePhase {
        self.phase
    }

    #[must_use]
    pub fn request_state(&self) -> HistoryRequest {
        self.request
    }

    /// Events held until the surface is ready.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Record that the backlog request was sent. `true` only the first time.
    pub fn request(&mut self) -> bool {
        if self.request != HistoryRequest::NotRequested {
            return false;
        }
        self.request = HistoryRequest::Requested;
        true
    }

    /// A history dump arrived.
    ///
    /// Before the surface is ready the events are buffered and nothing is
    /// returned; afterwards they are released for immediate replay. Only the
    /// answer to our own request counts: an unsolicited or duplicate dump
    /// would double-draw every stroke.
    pub fn on_history(&mut self, events: Vec<DrawEvent>) -> Vec<Ready> {
        if self.request != HistoryRequest::Requested {
            tracing::warn!(count = events.len(), state = ?self.request, "ignoring unexpected history dump");
            return Vec::new();
        }
        self.request = HistoryRequest::Delivered;
        let replay = events.into_iter().map(|event| (event, Delivery::Historical));
        match self.phase {
            SurfacePhase::NotReady => {
                // Live events buffered before the request are contained in the dump.
                let superseded = self.pending.len();
                if superseded > 0 {
                    tracing::debug!(superseded, "history dump replaces buffered live events");
                }
                self.pending = replay.collect();
                Vec::new()
            }
            SurfacePhase::Live => replay.collect(),
        }
    }

    /// The relay refused or lost the backlog request.
    ///
    /// Treated as an empty delivery: the canvas stays incomplete until later
    /// events repair it, but live events flow again.
    pub fn on_history_error(&mut self) {
        if self.request != HistoryRequest::Requested {
            return;
        }
        tracing::warn!("history request failed; continuing with live events only");
        self.request = HistoryRequest::Delivered;
    }

    /// A live broadcast arrived.
    pub fn on_live(&mut self, event: DrawEvent) -> Option<Ready> {
        if self.request == HistoryRequest::Requested {
            tracing::debug!(kind = ?event.kind, "dropping live event; history dump pending");
            return None;
        }
        match self.phase {
            SurfacePhase::NotReady => {
                self.pending.push((event, Delivery::Live));
                None
            }
            SurfacePhase::Live => Some((event, Delivery::Live)),
        }
    }

    /// The surface now exists: drain the buffer, in received order, exactly once.
    pub fn mark_ready(&mut self) -> Vec<Ready> {
        if self.phase == SurfacePhase::Live {
            return Vec::new();
        }
        self.phase = SurfacePhase::Live;
        let drained = std::mem::take(&mut self.pending);
        if !drained.is_empty() {
            tracing::debug!(count = drained.len(), "replaying buffered events");
        }
        drained
    }
}
