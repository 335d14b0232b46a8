//! メッセージ送信（通知）の実装
//!
//! ## 実装
//!
//! - `websocket`: WebSocket 接続へのトピック配信（Broadcast Engine）

pub mod websocket;

pub use websocket::WebSocketMessagePusher;
