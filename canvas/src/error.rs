//! Failure taxonomy for the drawing core.
//!
//! None of these is fatal. Each degrades to a visibly incomplete canvas that a
//! later `CLEAR` or a fresh history replay repairs.

/// Errors surfaced by event parsing, filling, and publishing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CanvasError {
    /// Payload failed event validation; dropped, processing continues.
    #[error("malformed draw event: {0}")]
    MalformedEvent(String),
    /// An event needed the raster surface before it was mounted.
    #[error("raster surface not ready")]
    SurfaceNotReady,
    /// The fill seed could not be read from the surface.
    #[error("fill seed ({x}, {y}) is outside the surface")]
    UnknownFillSeed { x: i64, y: i64 },
    /// A publish was attempted while the transport is down; the frame is dropped.
    #[error("transport disconnected")]
    TransportDisconnected,
}
