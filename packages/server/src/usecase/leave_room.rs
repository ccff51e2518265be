//! UseCase: ルーム退室
//!
//! 退室通知はレジストリが捕捉した退室時点のメンバースナップショットに
//! 宛てて送るため、退室者自身も最後の通知を受け取れる。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, IdentityRegistry, LeaveOutcome, MessagePusher, RoomCode, RoomRegistry, Username,
};

use super::error::LeaveRoomError;

/// ルーム退室の結果
#[derive(Debug, Clone)]
pub struct LeftRoom {
    /// 退室者の表示名
    pub username: Username,
    /// レジストリの退室結果（スナップショットと削除フラグ）
    pub outcome: LeaveOutcome,
}

/// ルーム退室のユースケース
pub struct LeaveRoomUseCase {
    identity: Arc<dyn IdentityRegistry>,
    rooms: Arc<dyn RoomRegistry>,
    pusher: Arc<dyn MessagePusher>,
}

impl LeaveRoomUseCase {
    pub fn new(
        identity: Arc<dyn IdentityRegistry>,
        rooms: Arc<dyn RoomRegistry>,
        pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            identity,
            rooms,
            pusher,
        }
    }

    /// ルーム退室を実行
    ///
    /// 非メンバーの退室は冪等（`outcome.left == false` で成功扱い）。
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        code: &RoomCode,
    ) -> Result<LeftRoom, LeaveRoomError> {
        let username = self
            .identity
            .lookup(connection_id)
            .await
            .ok_or(LeaveRoomError::NoName)?;

        let outcome = self.rooms.leave_room(connection_id, code).await;
        if outcome.left {
            self.pusher.remove_from_group(connection_id, code).await;
        }

        Ok(LeftRoom { username, outcome })
    }
}
