//! メッセージ送信（通知）の実装
//!
//! `MessagePusher` trait の具体的な実装を提供します。
//!
//! - `websocket`: WebSocket の `UnboundedSender` を使った実装

pub mod websocket;

pub use websocket::WebSocketMessagePusher;
