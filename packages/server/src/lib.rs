//! hiroba chat relay server.
//!
//! Clients open a persistent WebSocket connection, claim a display name,
//! join or create named rooms, and exchange messages scoped to their
//! current room. The crate is layered the usual way: `domain` holds the
//! registries' contracts and value objects, `usecase` the event
//! handlers, `infrastructure` the in-memory registries, the WebSocket
//! pusher and the wire DTOs, and `ui` the Axum surface.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
