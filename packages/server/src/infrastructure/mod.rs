//! Infrastructure layer: wire formats, in-memory stores and WebSocket delivery.

pub mod connection;
pub mod dto;
pub mod message_pusher;
pub mod repository;
