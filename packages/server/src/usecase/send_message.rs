//! UseCase: メッセージ送信
//!
//! 送信者が対象ルームのメンバーであることを検証してから、その
//! ルームのグループにのみ中継する。レジストリは送信で一切変化
//! しない（配送はベストエフォート）。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, RoomCode, RoomError, RoomRegistry};

use super::error::SendMessageError;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    rooms: Arc<dyn RoomRegistry>,
    pusher: Arc<dyn MessagePusher>,
}

impl SendMessageUseCase {
    pub fn new(rooms: Arc<dyn RoomRegistry>, pusher: Arc<dyn MessagePusher>) -> Self {
        Self { rooms, pusher }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `sender` - 送信者の接続 ID
    /// * `code` - 宛先ルームのコード
    /// * `json_message` - 中継する JSON ペイロード（DTO 層で生成済み）
    ///
    /// # Returns
    ///
    /// * `Ok(())` - グループへの中継を発行した
    /// * `Err(SendMessageError)` - ルームが存在しない、または送信者が
    ///   メンバーでない
    pub async fn execute(
        &self,
        sender: &ConnectionId,
        code: &RoomCode,
        json_message: String,
    ) -> Result<(), SendMessageError> {
        match self.rooms.is_member(sender, code).await {
            Ok(true) => {}
            Ok(false) => {
                return Err(SendMessageError::NotInRoom(code.as_str().to_string()));
            }
            Err(RoomError::RoomNotFound(c)) => {
                return Err(SendMessageError::RoomNotFound(c));
            }
            Err(RoomError::NotInRoom(c)) => {
                return Err(SendMessageError::NotInRoom(c));
            }
        }

        self.pusher.push_to_group(code, &json_message).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Member, Timestamp, Username};
    use crate::infrastructure::message_pusher::WebSocketMessagePusher;
    use crate::infrastructure::registry::InMemoryRoomRegistry;
    use tokio::sync::mpsc;

    fn connection(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    fn member(conn: &str, name: &str) -> Member {
        Member::new(
            connection(conn),
            Username::new(name.to_string()).unwrap(),
            Timestamp::new(1000),
        )
    }

    async fn join(
        rooms: &InMemoryRoomRegistry,
        pusher: &WebSocketMessagePusher,
        conn: &str,
        name: &str,
        code: &RoomCode,
    ) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        pusher.register_client(connection(conn), tx).await;
        rooms.join_room(member(conn, name), code).await.unwrap();
        pusher.add_to_group(&connection(conn), code).await;
        rx
    }

    #[tokio::test]
    async fn test_send_message_reaches_room_members_only() {
        // テスト項目: メッセージが宛先ルームのメンバーだけに届く
        // given (前提条件):
        let rooms = Arc::new(InMemoryRoomRegistry::new(Timestamp::new(0)));
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = SendMessageUseCase::new(rooms.clone(), pusher.clone());

        let general = RoomCode::general();
        let mut alice_rx = join(&rooms, &pusher, "conn-1", "alice", &general).await;
        let mut bob_rx = join(&rooms, &pusher, "conn-2", "bob", &general).await;

        // charlie は別ルームに所属
        let (tx, mut charlie_rx) = mpsc::unbounded_channel();
        pusher.register_client(connection("conn-3"), tx).await;
        let created = rooms.create_room(member("conn-3", "charlie")).await;
        pusher.add_to_group(&connection("conn-3"), &created.code).await;

        // when (操作): alice が General に送信
        let result = usecase
            .execute(
                &connection("conn-1"),
                &general,
                r#"{"type":"receive-message"}"#.to_string(),
            )
            .await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert!(alice_rx.try_recv().is_ok());
        assert!(bob_rx.try_recv().is_ok());
        assert!(charlie_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_send_message_to_unknown_room_fails() {
        // テスト項目: 存在しないルームへの送信が RoomNotFound で失敗する
        // given (前提条件):
        let rooms = Arc::new(InMemoryRoomRegistry::new(Timestamp::new(0)));
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = SendMessageUseCase::new(rooms, pusher);

        // when (操作):
        let missing = RoomCode::new("zzzzzz".to_string()).unwrap();
        let result = usecase
            .execute(&connection("conn-1"), &missing, "{}".to_string())
            .await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(SendMessageError::RoomNotFound("zzzzzz".to_string()))
        );
    }

    #[tokio::test]
    async fn test_send_message_from_non_member_is_rejected() {
        // テスト項目: 非メンバーからの送信が NotInRoom で拒否され、
        //             メンバーには何も届かない
        // given (前提条件):
        let rooms = Arc::new(InMemoryRoomRegistry::new(Timestamp::new(0)));
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = SendMessageUseCase::new(rooms.clone(), pusher.clone());

        let general = RoomCode::general();
        let mut alice_rx = join(&rooms, &pusher, "conn-1", "alice", &general).await;

        // when (操作): ルーム外の conn-2 が General へ送信
        let result = usecase
            .execute(&connection("conn-2"), &general, "{}".to_string())
            .await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(SendMessageError::NotInRoom("General".to_string()))
        );
        assert!(alice_rx.try_recv().is_err());
    }
}
