//! WebSocket event DTOs.
//!
//! Every frame on the wire is a JSON object with a kebab-case `type`
//! discriminator. Inbound frames parse into [`ClientEvent`]; outbound
//! notifications are one struct per event carrying the shared
//! [`MessageType`] tag.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Wire shape of a relayed chat message. All three fields are mandatory
/// (no defaulting) and must round-trip exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDto {
    pub owner: String,
    pub content: String,
    pub sent_at: i64,
}

/// Inbound events a client invokes on the hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientEvent {
    SetName { name: String },
    CreateRoom,
    JoinRoom { code: String },
    LeaveRoom { code: String },
    GetRooms,
    GetRoomsWithUsers { code: String },
    SendMessage { code: String, message: MessageDto },
}

/// Discriminator of outbound server notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageType {
    NameSet,
    NameExistsError,
    UserChange,
    MoveToRoom,
    RoomDoesNotExist,
    NotInRoom,
    ReceiveMessage,
    RoomList,
    RoomUsers,
}

/// The caller's display name was claimed successfully.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameSetMessage {
    pub r#type: MessageType,
    pub name: String,
}

/// The requested display name is already held (caller only).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameExistsErrorMessage {
    pub r#type: MessageType,
    pub name: String,
}

/// A presence change, e.g. `connected: alice`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserChangeMessage {
    pub r#type: MessageType,
    pub content: String,
}

/// The caller is now a member of the room with `code`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveToRoomMessage {
    pub r#type: MessageType,
    pub code: String,
}

/// No live room has the requested code (caller only).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomDoesNotExistMessage {
    pub r#type: MessageType,
    pub code: String,
}

/// The caller is not a member of the room it tried to send to
/// (caller only).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotInRoomMessage {
    pub r#type: MessageType,
    pub code: String,
}

/// A chat message relayed to the members of one room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiveMessageMessage {
    pub r#type: MessageType,
    pub code: String,
    pub message: MessageDto,
}

/// The canonical rooms projection: every live room's code mapped to its
/// sorted member display names. Used for every "rooms" notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomListMessage {
    pub r#type: MessageType,
    pub rooms: BTreeMap<String, Vec<String>>,
}

/// Member display names of one room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomUsersMessage {
    pub r#type: MessageType,
    pub code: String,
    pub users: Vec<String>,
}
