//! Room relay for collaborative drawing.
//!
//! ARCHITECTURE
//! ============
//! Clients speak the `frames` protocol over a websocket. The relay keeps an
//! in-memory room per drawing session, validates draw events with the shared
//! `canvas` event model, records the current round's history, and fans events
//! out to every other participant.

pub mod config;
pub mod routes;
pub mod services;
pub mod state;
