//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

/// One room in the `GET /api/rooms` listing. The `users` field is the
/// same canonical shape as the WebSocket room list: sorted display names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub code: String,
    pub users: Vec<String>,
    pub created_at: String,
}

/// One member in a room detail response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomMemberDto {
    pub name: String,
    pub joined_at: String,
}

/// Response of `GET /api/rooms/{code}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomDetailDto {
    pub code: String,
    pub members: Vec<RoomMemberDto>,
    pub created_at: String,
}
