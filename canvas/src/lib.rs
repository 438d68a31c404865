//! Drawing core for the multiplayer sketch game.
//!
//! This crate is compiled to WebAssembly and runs in the browser. Every
//! drawing action is a discrete [`event::DrawEvent`]; each client replays the
//! same events through the same deterministic rasterizer, so all participants
//! converge on an identical [`surface::RasterSurface`]. The host JavaScript
//! layer only wires DOM events and the socket to the engine and carries out
//! the resulting [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`event`] | Draw event schema, validation, parsing |
//! | [`surface`] | RGBA raster buffer and stroke rasterization |
//! | [`fill`] | Stack-based flood fill |
//! | [`applier`] | Replays events onto the surface, with echo suppression |
//! | [`stroke`] | Pointer gestures to `START`/`MOVE`/`END`/`FILL` |
//! | [`history`] | Late-join backlog buffering and one-shot replay |
//! | [`drawer`] | Per-room drawer tenure and the drawer notice |
//! | [`input`] | Tools, tool settings, and gesture state |
//! | [`viewport`] | Display-to-surface coordinate scaling |
//! | [`color`] | Hex color parsing and compositing |
//! | [`consts`] | Tool defaults and room-state names |
//! | [`error`] | Failure taxonomy |

pub mod applier;
pub mod color;
pub mod consts;
pub mod drawer;
pub mod engine;
pub mod error;
pub mod event;
pub mod fill;
pub mod history;
pub mod input;
pub mod stroke;
pub mod surface;
pub mod viewport;
