//! Data Transfer Objects (DTOs) for the quiz server.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket event DTOs (`eventType` envelope)
//! - `http`: HTTP API response DTOs
//! - `conversion`: Domain Entity → DTO conversion

pub mod conversion;
pub mod http;
pub mod websocket;
