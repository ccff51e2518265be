//! UseCase: ルーム参加
//!
//! 存在するルームに参加する。元のルームからの退室はレジストリの
//! 同一クリティカルセクション内で行われ、参加失敗時は所属が一切
//! 変化しない。

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::domain::{
    ConnectionId, IdentityRegistry, LeaveOutcome, Member, MessagePusher, RoomCode, RoomError,
    RoomRegistry, Timestamp, Username,
};

use super::error::JoinRoomError;

/// ルーム参加の結果
#[derive(Debug, Clone)]
pub struct JoinedRoom {
    /// 参加したルームのコード
    pub code: RoomCode,
    /// 参加者の表示名
    pub username: Username,
    /// 参加後のメンバー名一覧（ソート済み）
    pub members: Vec<Username>,
    /// 暗黙に退室した元のルーム（あれば）
    pub left_room: Option<(RoomCode, LeaveOutcome)>,
}

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    identity: Arc<dyn IdentityRegistry>,
    rooms: Arc<dyn RoomRegistry>,
    pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl JoinRoomUseCase {
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

    /// ルーム参加を実行
    ///
    /// # Returns
    ///
    /// * `Ok(JoinedRoom)` - 参加成功
    /// * `Err(JoinRoomError::RoomNotFound)` - 指定コードのルームが存在しない
    /// * `Err(JoinRoomError::NoName)` - 接続がまだ表示名を持たない
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        code: RoomCode,
    ) -> Result<JoinedRoom, JoinRoomError> {
        let username = self
            .identity
            .lookup(connection_id)
            .await
            .ok_or(JoinRoomError::NoName)?;

        let member = Member::new(
            connection_id.clone(),
            username.clone(),
            Timestamp::new(self.clock.now_jst_millis()),
        );
        let outcome = self.rooms.join_room(member, &code).await.map_err(|e| {
            match e {
                RoomError::RoomNotFound(c) | RoomError::NotInRoom(c) => {
                    JoinRoomError::RoomNotFound(c)
                }
            }
        })?;

        if let Some((left_code, _)) = &outcome.left_room {
            self.pusher.remove_from_group(connection_id, left_code).await;
        }
        self.pusher.add_to_group(connection_id, &code).await;

        Ok(JoinedRoom {
            code,
            username,
            members: outcome.members,
            left_room: outcome.left_room,
        })
    }
}
