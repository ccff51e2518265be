//! UseCase: 単一ルームのメンバー名一覧取得

use std::sync::Arc;

use crate::domain::{Room, RoomCode, RoomError, RoomRegistry, Username};

/// ルームメンバー名一覧取得のユースケース
pub struct GetRoomUsersUseCase {
    rooms: Arc<dyn RoomRegistry>,
}

impl GetRoomUsersUseCase {
    pub fn new(rooms: Arc<dyn RoomRegistry>) -> Self {
        Self { rooms }
    }

    /// 指定ルームのメンバー名一覧（ソート済み）を取得
    pub async fn execute(&self, code: &RoomCode) -> Result<Vec<Username>, RoomError> {
        self.rooms.room(code).await.map(|room: Room| room.member_usernames())
    }
}
