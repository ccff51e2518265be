//! Conversion logic between DTOs and domain entities.

use hiroba_shared::time::timestamp_to_jst_rfc3339;

use crate::domain::{
    ChatMessage, DomainError, MessageContent, Room, Timestamp, Username,
};
use crate::infrastructure::dto::http::{RoomDetailDto, RoomMemberDto, RoomSummaryDto};
use crate::infrastructure::dto::websocket::MessageDto;

// ========================================
// DTO → Domain Entity
// ========================================

impl TryFrom<MessageDto> for ChatMessage {
    type Error = DomainError;

    fn try_from(dto: MessageDto) -> Result<Self, Self::Error> {
        Ok(Self {
            owner: Username::new(dto.owner)?,
            content: MessageContent::new(dto.content)?,
            sent_at: Timestamp::new(dto.sent_at),
        })
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<ChatMessage> for MessageDto {
    fn from(model: ChatMessage) -> Self {
        Self {
            owner: model.owner.into_string(),
            content: model.content.into_string(),
            sent_at: model.sent_at.value(),
        }
    }
}

impl From<&Room> for RoomSummaryDto {
    fn from(room: &Room) -> Self {
        Self {
            code: room.code.as_str().to_string(),
            users: room
                .member_usernames()
                .into_iter()
                .map(Username::into_string)
                .collect(),
            created_at: timestamp_to_jst_rfc3339(room.created_at.value()),
        }
    }
}

impl From<&Room> for RoomDetailDto {
    fn from(room: &Room) -> Self {
        Self {
            code: room.code.as_str().to_string(),
            members: room
                .members
                .iter()
                .map(|m| RoomMemberDto {
                    name: m.username.as_str().to_string(),
                    joined_at: timestamp_to_jst_rfc3339(m.joined_at.value()),
                })
                .collect(),
            created_at: timestamp_to_jst_rfc3339(room.created_at.value()),
        }
    }
}
