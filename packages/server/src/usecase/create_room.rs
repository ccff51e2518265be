//! UseCase: ルーム作成
//!
//! 表示名を持つ接続がルームを新設し、作成者が唯一のメンバーになる。
//! 既にどこかのルームに居た場合は、同一クリティカルセクション内で
//! 暗黙に退室する（同時に 2 ルームへは所属しない）。

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::domain::{
    ConnectionId, IdentityRegistry, LeaveOutcome, Member, MessagePusher, RoomCode, RoomRegistry,
    Timestamp, Username,
};

use super::error::CreateRoomError;

/// ルーム作成の結果
#[derive(Debug, Clone)]
pub struct CreatedRoom {
    /// 新設ルームのコード
    pub code: RoomCode,
    /// 作成者の表示名
    pub username: Username,
    /// 暗黙に退室した元のルーム（あれば）
    pub left_room: Option<(RoomCode, LeaveOutcome)>,
}

/// ルーム作成のユースケース
pub struct CreateRoomUseCase {
    identity: Arc<dyn IdentityRegistry>,
    rooms: Arc<dyn RoomRegistry>,
    pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl CreateRoomUseCase {
    pub fn new(
        identity: Arc<dyn IdentityRegistry>,
        rooms: Arc<dyn RoomRegistry>,
        pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            identity,
            rooms,
            pusher,
            clock,
        }
    }

    /// ルーム作成を実行
    ///
    /// # Returns
    ///
    /// * `Ok(CreatedRoom)` - 作成成功
    /// * `Err(CreateRoomError::NoName)` - 接続がまだ表示名を持たない
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<CreatedRoom, CreateRoomError> {
        let username = self
            .identity
            .lookup(connection_id)
            .await
            .ok_or(CreateRoomError::NoName)?;

        let owner = Member::new(
            connection_id.clone(),
            username.clone(),
            Timestamp::new(self.clock.now_jst_millis()),
        );
        let outcome = self.rooms.create_room(owner).await;

        if let Some((left_code, _)) = &outcome.left_room {
            self.pusher.remove_from_group(connection_id, left_code).await;
        }
        self.pusher.add_to_group(connection_id, &outcome.code).await;

        Ok(CreatedRoom {
            code: outcome.code,
            username,
            left_room: outcome.left_room,
        })
    }
}
