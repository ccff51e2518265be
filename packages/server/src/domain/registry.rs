//! Registry trait 定義
//!
//! 接続・ルーム状態を所有する 2 つのレジストリのインターフェース。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! どちらのレジストリも read-then-write の操作（claim-if-free,
//! join-if-exists, leave-then-maybe-delete, generate-unique-code）を
//! 1 つのクリティカルセクションとして実行しなければならない。

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::entity::{Member, Room};
use super::error::{IdentityError, RoomError};
use super::value_object::{ConnectionId, RoomCode, Username};

/// Bidirectional `connection ↔ username` mapping. A username is held by
/// at most one live connection; a connection holds at most one username.
#[async_trait]
pub trait IdentityRegistry: Send + Sync {
    /// Atomically claim `username` for `connection_id`. Fails with
    /// `NameTaken` if any live connection holds the name, and with
    /// `AlreadyNamed` if this connection already claimed one (renames
    /// are not supported). No mutation on failure.
    async fn try_claim(
        &self,
        connection_id: ConnectionId,
        username: Username,
    ) -> Result<(), IdentityError>;

    /// Resolve the username held by a connection, if any.
    async fn lookup(&self, connection_id: &ConnectionId) -> Option<Username>;

    /// Remove and return the claimed username. Idempotent: returns
    /// `None` when the connection holds no name.
    async fn release(&self, connection_id: &ConnectionId) -> Option<Username>;
}

/// Result of leaving a room (explicitly, implicitly on a room switch, or
/// via disconnect).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveOutcome {
    /// Whether the connection actually was a member.
    pub left: bool,
    /// Members at the time of leave, captured BEFORE removal so a
    /// departure notice can still reach everyone who was present,
    /// including the leaver.
    pub members_at_leave: Vec<Member>,
    /// Whether the room hit zero members and was deleted.
    pub room_deleted: bool,
}

impl LeaveOutcome {
    /// Outcome for a connection that was not a member (idempotent leave).
    pub fn not_a_member() -> Self {
        Self {
            left: false,
            members_at_leave: Vec::new(),
            room_deleted: false,
        }
    }
}

/// Result of creating a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOutcome {
    /// The freshly generated room code.
    pub code: RoomCode,
    /// The room the owner implicitly left, if it was in one.
    pub left_room: Option<(RoomCode, LeaveOutcome)>,
}

/// Result of joining a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    /// Member display names after the join, sorted.
    pub members: Vec<Username>,
    /// The room the connection implicitly left, if it was in one.
    pub left_room: Option<(RoomCode, LeaveOutcome)>,
}

/// Owns the set of live rooms and the per-connection room association.
///
/// A connection is a member of at most one room at a time: `create_room`
/// and `join_room` leave the prior room (if any) within the same
/// critical section, so the association can never point at two rooms,
/// and a failed join leaves the caller exactly where it was.
#[async_trait]
pub trait RoomRegistry: Send + Sync {
    /// Create a room with a freshly generated, globally unique code and
    /// `owner` as the sole member. A code collision is detected and
    /// retried, never silently accepted.
    async fn create_room(&self, owner: Member) -> CreateOutcome;

    /// Add the connection as a member of the room with `code`, leaving
    /// its prior room first. Fails with `RoomNotFound` (and mutates
    /// nothing) when no live room has that code.
    async fn join_room(&self, member: Member, code: &RoomCode) -> Result<JoinOutcome, RoomError>;

    /// Remove the connection from the room with `code`. Deletes the room
    /// when its member count reaches zero, unless it is the lobby.
    /// Idempotent when the connection was not a member.
    async fn leave_room(&self, connection_id: &ConnectionId, code: &RoomCode) -> LeaveOutcome;

    /// Leave whatever room the connection is currently in, if any. Used
    /// by the disconnect path.
    async fn leave_current(
        &self,
        connection_id: &ConnectionId,
    ) -> Option<(RoomCode, LeaveOutcome)>;

    /// The room the connection is currently associated with, if any.
    async fn current_room(&self, connection_id: &ConnectionId) -> Option<RoomCode>;

    /// Whether the connection is a member of the room with `code`.
    /// Fails with `RoomNotFound` when the room does not exist.
    async fn is_member(
        &self,
        connection_id: &ConnectionId,
        code: &RoomCode,
    ) -> Result<bool, RoomError>;

    /// Codes of all live rooms, sorted.
    async fn list_room_codes(&self) -> Vec<RoomCode>;

    /// The canonical "rooms" projection: every live room's code mapped to
    /// its sorted member display names.
    async fn rooms_with_members(&self) -> BTreeMap<RoomCode, Vec<Username>>;

    /// Snapshot of the room with `code`, or `RoomNotFound`.
    async fn room(&self, code: &RoomCode) -> Result<Room, RoomError>;
}
