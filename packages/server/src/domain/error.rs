//! Error taxonomy for the chat relay domain.
//!
//! Every variant here is local, recoverable and user-visible: it is
//! reported to the requesting connection only and never terminates the
//! connection or touches other connections' state.

use thiserror::Error;

use super::value_object::{MESSAGE_MAX_CHARS, USERNAME_MAX_CHARS};

/// Validation failures when constructing value objects.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("connection id must not be empty")]
    EmptyConnectionId,
    #[error("username must be 1..={USERNAME_MAX_CHARS} non-blank characters, got '{0}'")]
    InvalidUsername(String),
    #[error("room code must not be empty")]
    EmptyRoomCode,
    #[error("message content must be 1..={MESSAGE_MAX_CHARS} characters, got {0}")]
    InvalidMessageContent(usize),
}

/// Claim conflicts in the identity registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("username '{0}' is already taken")]
    NameTaken(String),
    #[error("connection already holds the name '{0}'")]
    AlreadyNamed(String),
}

/// Membership errors in the room registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoomError {
    #[error("no live room with code '{0}'")]
    RoomNotFound(String),
    #[error("connection is not a member of room '{0}'")]
    NotInRoom(String),
}

/// Unicast delivery failures at the pusher seam. Group and broadcast
/// sends are best-effort and never surface an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MessagePushError {
    #[error("connection '{0}' is not registered")]
    ClientNotFound(String),
    #[error("failed to push message: {0}")]
    PushFailed(String),
}
