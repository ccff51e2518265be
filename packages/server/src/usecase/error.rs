//! UseCase 層のエラー型
//!
//! どのエラーも要求元の接続だけに通知される回復可能な条件であり、
//! 接続自体や他の接続の状態には影響しない。

use thiserror::Error;

use crate::domain::IdentityError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SetNameError {
    #[error("username '{0}' is already taken")]
    NameTaken(String),
    #[error("connection already holds the name '{0}'")]
    AlreadyNamed(String),
}

impl From<IdentityError> for SetNameError {
    fn from(error: IdentityError) -> Self {
        match error {
            IdentityError::NameTaken(name) => Self::NameTaken(name),
            IdentityError::AlreadyNamed(name) => Self::AlreadyNamed(name),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CreateRoomError {
    #[error("connection has no display name yet")]
    NoName,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JoinRoomError {
    #[error("connection has no display name yet")]
    NoName,
    #[error("no live room with code '{0}'")]
    RoomNotFound(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LeaveRoomError {
    #[error("connection has no display name yet")]
    NoName,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SendMessageError {
    #[error("no live room with code '{0}'")]
    RoomNotFound(String),
    #[error("sender is not a member of room '{0}'")]
    NotInRoom(String),
}
