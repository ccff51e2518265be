//! UseCase: 切断処理
//!
//! クリーンアップは参照キー（接続→名前、接続→ルーム）を消すため、
//! 切断通知に必要な情報はすべてクリーンアップ前に捕捉する。
//! 2 回目の呼び出しは空の結果を返すだけで何もしない（冪等性）。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, IdentityRegistry, LeaveOutcome, MessagePusher, RoomCode, RoomRegistry, Username,
};

/// 切断処理の結果。通知の宛先決定に必要なスナップショットを運ぶ。
#[derive(Debug, Clone)]
pub struct DisconnectOutcome {
    /// 切断した接続が持っていた表示名（未設定なら None）
    pub username: Option<Username>,
    /// 切断時に退室したルーム（所属していなければ None）
    pub left_room: Option<(RoomCode, LeaveOutcome)>,
}

/// 切断処理のユースケース
pub struct DisconnectUseCase {
    identity: Arc<dyn IdentityRegistry>,
    rooms: Arc<dyn RoomRegistry>,
    pusher: Arc<dyn MessagePusher>,
}

impl DisconnectUseCase {
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

    /// 切断処理を実行
    pub async fn execute(&self, connection_id: &ConnectionId) -> DisconnectOutcome {
        // 先にスナップショットを取る。release/leave の後ではもう
        // 「誰が・どこから」切断したのか引けない。
        let username = self.identity.lookup(connection_id).await;
        let left_room = self.rooms.leave_current(connection_id).await;

        if let Some((code, _)) = &left_room {
            self.pusher.remove_from_group(connection_id, code).await;
        }
        self.identity.release(connection_id).await;
        self.pusher.unregister_client(connection_id).await;

        DisconnectOutcome {
            username,
            left_room,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Member, Timestamp};
    use crate::infrastructure::message_pusher::WebSocketMessagePusher;
    use crate::infrastructure::registry::{InMemoryIdentityRegistry, InMemoryRoomRegistry};

    fn connection(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    fn username(name: &str) -> Username {
        Username::new(name.to_string()).unwrap()
    }

    fn member(conn: &str, name: &str) -> Member {
        Member::new(connection(conn), username(name), Timestamp::new(1000))
    }

    async fn fixture() -> (
        Arc<InMemoryIdentityRegistry>,
        Arc<InMemoryRoomRegistry>,
        DisconnectUseCase,
    ) {
        let identity = Arc::new(InMemoryIdentityRegistry::new());
        let rooms = Arc::new(InMemoryRoomRegistry::new(Timestamp::new(0)));
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = DisconnectUseCase::new(identity.clone(), rooms.clone(), pusher);
        (identity, rooms, usecase)
    }

    #[tokio::test]
    async fn test_disconnect_captures_snapshot_before_cleanup() {
        // テスト項目: 切断結果に切断前の名前とルームが含まれ、レジストリは
        //             クリーンアップされる
        // given (前提条件):
        let (identity, rooms, usecase) = fixture().await;
        identity
            .try_claim(connection("conn-1"), username("alice"))
            .await
            .unwrap();
        rooms
            .join_room(member("conn-1", "alice"), &RoomCode::general())
            .await
            .unwrap();

        // when (操作):
        let outcome = usecase.execute(&connection("conn-1")).await;

        // then (期待する結果):
        assert_eq!(outcome.username, Some(username("alice")));
        let (code, leave) = outcome.left_room.unwrap();
        assert_eq!(code, RoomCode::general());
        assert!(leave.left);
        assert_eq!(identity.lookup(&connection("conn-1")).await, None);
        assert_eq!(rooms.current_room(&connection("conn-1")).await, None);
    }

    #[tokio::test]
    async fn test_disconnect_frees_username_for_reuse() {
        // テスト項目: 切断後に表示名が再利用可能になる
        // given (前提条件):
        let (identity, _rooms, usecase) = fixture().await;
        identity
            .try_claim(connection("conn-1"), username("alice"))
            .await
            .unwrap();

        // when (操作):
        usecase.execute(&connection("conn-1")).await;

        // then (期待する結果):
        let reclaim = identity
            .try_claim(connection("conn-2"), username("alice"))
            .await;
        assert!(reclaim.is_ok());
    }

    #[tokio::test]
    async fn test_disconnect_deletes_emptied_room() {
        // テスト項目: 切断による退室でも空ルーム削除が働く
        // given (前提条件):
        let (identity, rooms, usecase) = fixture().await;
        identity
            .try_claim(connection("conn-1"), username("alice"))
            .await
            .unwrap();
        let created = rooms.create_room(member("conn-1", "alice")).await;

        // when (操作):
        let outcome = usecase.execute(&connection("conn-1")).await;

        // then (期待する結果):
        let (_, leave) = outcome.left_room.unwrap();
        assert!(leave.room_deleted);
        assert!(rooms.room(&created.code).await.is_err());
    }

    #[tokio::test]
    async fn test_disconnect_twice_has_no_further_effect() {
        // テスト項目: 同一接続への切断処理の二重実行が無害（冪等性）
        // given (前提条件):
        let (identity, rooms, usecase) = fixture().await;
        identity
            .try_claim(connection("conn-1"), username("alice"))
            .await
            .unwrap();
        rooms
            .join_room(member("conn-1", "alice"), &RoomCode::general())
            .await
            .unwrap();
        usecase.execute(&connection("conn-1")).await;

        // when (操作):
        let second = usecase.execute(&connection("conn-1")).await;

        // then (期待する結果):
        assert_eq!(second.username, None);
        assert!(second.left_room.is_none());
    }

    #[tokio::test]
    async fn test_disconnect_without_identity_is_silent() {
        // テスト項目: 名前もルームも持たない接続の切断が空の結果を返す
        // given (前提条件):
        let (_identity, _rooms, usecase) = fixture().await;

        // when (操作):
        let outcome = usecase.execute(&connection("conn-x")).await;

        // then (期待する結果):
        assert_eq!(outcome.username, None);
        assert!(outcome.left_room.is_none());
    }
}
