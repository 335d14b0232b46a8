//! Live-session server library for a multiplayer quiz game.
//!
//! Clients connect over WebSocket, join games under a nickname and answer
//! timed questions while the server drives each game through its phases.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
