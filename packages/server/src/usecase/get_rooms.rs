//! UseCase: ルーム一覧取得
//!
//! すべての「ルーム一覧」応答はコード→ソート済みメンバー名の
//! 正規形を使う（通知・HTTP API で共通）。

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::{Room, RoomCode, RoomError, RoomRegistry, Username};

/// ルーム一覧取得のユースケース
pub struct GetRoomsUseCase {
    rooms: Arc<dyn RoomRegistry>,
}

impl GetRoomsUseCase {
    pub fn new(rooms: Arc<dyn RoomRegistry>) -> Self {
        Self { rooms }
    }

    /// 正規形のルーム一覧（コード→ソート済みメンバー名）を取得
    pub async fn execute(&self) -> BTreeMap<RoomCode, Vec<Username>> {
        self.rooms.rooms_with_members().await
    }

    /// HTTP API 向けの Room スナップショット一覧を取得
    pub async fn room_snapshots(&self) -> Vec<Room> {
        let codes = self.rooms.list_room_codes().await;
        let mut snapshots = Vec::with_capacity(codes.len());
        for code in codes {
            if let Ok(room) = self.rooms.room(&code).await {
                snapshots.push(room);
            }
        }
        snapshots
    }

    /// 単一ルームのスナップショットを取得
    pub async fn room_detail(&self, code: &RoomCode) -> Result<Room, RoomError> {
        self.rooms.room(code).await
    }
}
