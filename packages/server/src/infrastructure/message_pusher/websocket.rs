//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの `UnboundedSender` と、ルームコード→接続集合の
//!   グループ表を管理
//! - 単一接続・グループ・全接続へのメッセージ送信
//!
//! WebSocket の生成は UI 層（`ui::handler::websocket`）で行われます。
//! グループ・全体送信はベストエフォートであり、一部の送信失敗は
//! 警告ログに留めます（レジストリ状態は送達結果に影響されない）。

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, MessagePushError, MessagePusher, PusherChannel, RoomCode};

#[derive(Default)]
struct PusherState {
    /// 接続中のクライアントの WebSocket sender
    clients: HashMap<ConnectionId, PusherChannel>,
    /// ルームコード→所属接続の対応（レジストリのミラー）
    groups: HashMap<RoomCode, HashSet<ConnectionId>>,
}

impl PusherState {
    fn send_to(&self, connection_id: &ConnectionId, content: &str) -> bool {
        match self.clients.get(connection_id) {
            Some(sender) => sender.send(content.to_string()).is_ok(),
            None => false,
        }
    }
}

/// WebSocket を使った MessagePusher 実装
pub struct WebSocketMessagePusher {
    state: Mutex<PusherState>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(PusherState::default()),
        }
    }
}

impl Default for WebSocketMessagePusher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut state = self.state.lock().await;
        tracing::debug!("Connection '{}' registered to pusher", connection_id.as_str());
        state.clients.insert(connection_id, sender);
    }

    async fn unregister_client(&self, connection_id: &ConnectionId) {
        let mut state = self.state.lock().await;
        state.clients.remove(connection_id);
        // a gone connection must not linger in any group
        state.groups.retain(|_, members| {
            members.remove(connection_id);
            !members.is_empty()
        });
        tracing::debug!(
            "Connection '{}' unregistered from pusher",
            connection_id.as_str()
        );
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let state = self.state.lock().await;

        if let Some(sender) = state.clients.get(connection_id) {
            sender
                .send(content.to_string())
                .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
            tracing::debug!("Pushed message to connection '{}'", connection_id.as_str());
            Ok(())
        } else {
            Err(MessagePushError::ClientNotFound(
                connection_id.as_str().to_string(),
            ))
        }
    }

    async fn push_to_group(&self, code: &RoomCode, content: &str) {
        let state = self.state.lock().await;

        let Some(members) = state.groups.get(code) else {
            tracing::debug!("No connections in group '{}', nothing to push", code);
            return;
        };

        for connection_id in members {
            if !state.send_to(connection_id, content) {
                tracing::warn!(
                    "Failed to push group message to connection '{}', skipping",
                    connection_id.as_str()
                );
            }
        }
    }

    async fn push_to_all(&self, content: &str) {
        let state = self.state.lock().await;

        for (connection_id, sender) in &state.clients {
            if sender.send(content.to_string()).is_err() {
                tracing::warn!(
                    "Failed to push message to connection '{}', skipping",
                    connection_id.as_str()
                );
            }
        }
    }

    async fn broadcast(&self, targets: Vec<ConnectionId>, content: &str) {
        let state = self.state.lock().await;

        for connection_id in &targets {
            if !state.send_to(connection_id, content) {
                tracing::warn!(
                    "Connection '{}' unreachable during broadcast, skipping",
                    connection_id.as_str()
                );
            }
        }
    }

    async fn add_to_group(&self, connection_id: &ConnectionId, code: &RoomCode) {
        let mut state = self.state.lock().await;
        state
            .groups
            .entry(code.clone())
            .or_default()
            .insert(connection_id.clone());
    }

    async fn remove_from_group(&self, connection_id: &ConnectionId, code: &RoomCode) {
        let mut state = self.state.lock().await;
        if let Some(members) = state.groups.get_mut(code) {
            members.remove(connection_id);
            if members.is_empty() {
                state.groups.remove(code);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn connection(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    fn code(value: &str) -> RoomCode {
        RoomCode::new(value.to_string()).unwrap()
    }

    async fn register(
        pusher: &WebSocketMessagePusher,
        id: &str,
    ) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        pusher.register_client(connection(id), tx).await;
        rx
    }

    #[tokio::test]
    async fn test_push_to_success() {
        // テスト項目: 特定の接続にメッセージを送信できる
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let mut rx = register(&pusher, "conn-1").await;

        // when (操作):
        let result = pusher.push_to(&connection("conn-1"), "Hello").await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(rx.recv().await, Some("Hello".to_string()));
    }

    #[tokio::test]
    async fn test_push_to_client_not_found() {
        // テスト項目: 未登録の接続への送信はエラーを返す
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();

        // when (操作):
        let result = pusher.push_to(&connection("nonexistent"), "Hello").await;

        // then (期待する結果):
        assert!(matches!(
            result,
            Err(MessagePushError::ClientNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_push_to_group_reaches_members_only() {
        // テスト項目: グループ送信がグループ所属の接続のみに届く
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let mut alice_rx = register(&pusher, "conn-alice").await;
        let mut bob_rx = register(&pusher, "conn-bob").await;
        let mut outsider_rx = register(&pusher, "conn-outsider").await;

        let room = code("ab12cd");
        pusher.add_to_group(&connection("conn-alice"), &room).await;
        pusher.add_to_group(&connection("conn-bob"), &room).await;

        // when (操作):
        pusher.push_to_group(&room, "room message").await;

        // then (期待する結果):
        assert_eq!(alice_rx.recv().await, Some("room message".to_string()));
        assert_eq!(bob_rx.recv().await, Some("room message".to_string()));
        assert!(outsider_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_push_to_all_reaches_every_client() {
        // テスト項目: 全体送信が登録済みの全接続に届く
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let mut alice_rx = register(&pusher, "conn-alice").await;
        let mut bob_rx = register(&pusher, "conn-bob").await;

        // when (操作):
        pusher.push_to_all("everyone").await;

        // then (期待する結果):
        assert_eq!(alice_rx.recv().await, Some("everyone".to_string()));
        assert_eq!(bob_rx.recv().await, Some("everyone".to_string()));
    }

    #[tokio::test]
    async fn test_broadcast_tolerates_unknown_targets() {
        // テスト項目: ブロードキャスト対象に未登録接続が混ざっても他の
        //             送信は成功する
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let mut alice_rx = register(&pusher, "conn-alice").await;

        // when (操作):
        pusher
            .broadcast(
                vec![connection("conn-alice"), connection("conn-gone")],
                "snapshot notice",
            )
            .await;

        // then (期待する結果):
        assert_eq!(alice_rx.recv().await, Some("snapshot notice".to_string()));
    }

    #[tokio::test]
    async fn test_remove_from_group_stops_delivery() {
        // テスト項目: グループから外れた接続にはグループ送信が届かない
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let mut alice_rx = register(&pusher, "conn-alice").await;
        let room = code("ab12cd");
        pusher.add_to_group(&connection("conn-alice"), &room).await;
        pusher.remove_from_group(&connection("conn-alice"), &room).await;

        // when (操作):
        pusher.push_to_group(&room, "room message").await;

        // then (期待する結果):
        assert!(alice_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unregister_client_sweeps_groups() {
        // テスト項目: 登録解除された接続がグループ表からも消える
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let _alice_rx = register(&pusher, "conn-alice").await;
        let mut bob_rx = register(&pusher, "conn-bob").await;
        let room = code("ab12cd");
        pusher.add_to_group(&connection("conn-alice"), &room).await;
        pusher.add_to_group(&connection("conn-bob"), &room).await;

        // when (操作):
        pusher.unregister_client(&connection("conn-alice")).await;
        pusher.push_to_group(&room, "after unregister").await;

        // then (期待する結果):
        assert_eq!(bob_rx.recv().await, Some("after unregister".to_string()));
    }
}
