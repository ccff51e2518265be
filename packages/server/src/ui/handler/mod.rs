//! Connection handlers: the WebSocket hub event loop and the HTTP API.

pub mod http;
pub mod websocket;
