//! Value objects for the chat relay domain.

use uuid::Uuid;

use super::error::DomainError;

/// Maximum length of a display name in characters.
pub const USERNAME_MAX_CHARS: usize = 32;

/// Maximum length of a chat message body in characters.
pub const MESSAGE_MAX_CHARS: usize = 2000;

/// Length of a generated room code (hex characters).
pub const ROOM_CODE_LEN: usize = 6;

/// Code of the permanent lobby room. Never deleted, even when empty.
pub const GENERAL_ROOM: &str = "General";

/// Opaque identifier of one live connection, issued by the server at
/// upgrade time and valid until disconnect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new(value: String) -> Result<Self, DomainError> {
        if value.is_empty() {
            return Err(DomainError::EmptyConnectionId);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ConnectionId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Issues fresh connection identifiers (UUID v4).
pub struct ConnectionIdFactory;

impl ConnectionIdFactory {
    pub fn generate() -> ConnectionId {
        ConnectionId(Uuid::new_v4().to_string())
    }
}

/// A claimed display name. Held by at most one live connection at a time;
/// uniqueness is enforced by the identity registry, not here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Username(String);

impl Username {
    pub fn new(value: String) -> Result<Self, DomainError> {
        let chars = value.chars().count();
        if value.trim().is_empty() || chars > USERNAME_MAX_CHARS {
            return Err(DomainError::InvalidUsername(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Username {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::fmt::Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Short opaque token naming a live room, globally unique among live
/// rooms. Generated codes are `ROOM_CODE_LEN` hex characters; the
/// permanent lobby uses the literal `"General"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomCode(String);

impl RoomCode {
    pub fn new(value: String) -> Result<Self, DomainError> {
        if value.is_empty() {
            return Err(DomainError::EmptyRoomCode);
        }
        Ok(Self(value))
    }

    /// The permanent lobby room code.
    pub fn general() -> Self {
        Self(GENERAL_ROOM.to_string())
    }

    pub fn is_general(&self) -> bool {
        self.0 == GENERAL_ROOM
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::fmt::Display for RoomCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generates candidate room codes by truncating a cryptographically
/// random UUID v4. Collisions are possible at this length; the room
/// registry detects them and asks for a fresh candidate instead of
/// overwriting a live room.
pub struct RoomCodeFactory;

impl RoomCodeFactory {
    pub fn generate() -> RoomCode {
        let wide = Uuid::new_v4().simple().to_string();
        RoomCode(wide[..ROOM_CODE_LEN].to_string())
    }
}

/// Unix timestamp in JST (milliseconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Body of a chat message. Validated for length only; the content is
/// stored exactly as received so payloads round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    pub fn new(value: String) -> Result<Self, DomainError> {
        let chars = value.chars().count();
        if chars == 0 || chars > MESSAGE_MAX_CHARS {
            return Err(DomainError::InvalidMessageContent(chars));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageContent {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
