//! Domain entities: rooms, their members, and chat messages.

use super::value_object::{ConnectionId, MessageContent, RoomCode, Timestamp, Username};

/// One connection's membership in a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub connection_id: ConnectionId,
    pub username: Username,
    pub joined_at: Timestamp,
}

impl Member {
    pub fn new(connection_id: ConnectionId, username: Username, joined_at: Timestamp) -> Self {
        Self {
            connection_id,
            username,
            joined_at,
        }
    }
}

/// A named broadcast scope. Created dynamically, destroyed when the last
/// member leaves, with the lobby room as the one permanent exception
/// (enforced by the room registry, not here).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub code: RoomCode,
    pub members: Vec<Member>,
    pub created_at: Timestamp,
}

impl Room {
    pub fn new(code: RoomCode, created_at: Timestamp) -> Self {
        Self {
            code,
            members: Vec::new(),
            created_at,
        }
    }

    /// Add a member. The caller (room registry) guarantees the connection
    /// is not already a member of any room.
    pub fn add_member(&mut self, member: Member) {
        debug_assert!(
            !self.contains(&member.connection_id),
            "connection is already a member of this room"
        );
        self.members.push(member);
    }

    /// Remove a member by connection, returning it if present.
    pub fn remove_member(&mut self, connection_id: &ConnectionId) -> Option<Member> {
        let index = self
            .members
            .iter()
            .position(|m| &m.connection_id == connection_id)?;
        Some(self.members.remove(index))
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.members
            .iter()
            .any(|m| &m.connection_id == connection_id)
    }

    /// Member display names, sorted for consistent ordering.
    pub fn member_usernames(&self) -> Vec<Username> {
        let mut usernames: Vec<Username> =
            self.members.iter().map(|m| m.username.clone()).collect();
        usernames.sort();
        usernames
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// A relayed chat message. All three fields come from the sender and
/// round-trip through the relay unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub owner: Username,
    pub content: MessageContent,
    pub sent_at: Timestamp,
}

impl ChatMessage {
    pub fn new(owner: Username, content: MessageContent, sent_at: Timestamp) -> Self {
        Self {
            owner,
            content,
            sent_at,
        }
    }
}
