mod event;
mod http;
mod websocket;

pub use http::{debug_state, get_games, health_check};
pub use websocket::websocket_handler;
