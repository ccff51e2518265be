//! InMemory Room Registry 実装
//!
//! 全ルームと接続→ルームの対応表を 1 つの Mutex で保持します。
//! コード生成・暗黙の退室・空ルーム削除はすべて同一クリティカル
//! セクション内で行われます。
//!
//! 常設ロビー `"General"` は構築時に生成され、空になっても削除
//! されません。

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, CreateOutcome, JoinOutcome, LeaveOutcome, Member, Room, RoomCode,
    RoomCodeFactory, RoomError, RoomRegistry, Timestamp, Username,
};

#[derive(Debug)]
struct RoomTable {
    rooms: BTreeMap<RoomCode, Room>,
    memberships: HashMap<ConnectionId, RoomCode>,
}

impl RoomTable {
    fn new(lobby_created_at: Timestamp) -> Self {
        let mut rooms = BTreeMap::new();
        let lobby = RoomCode::general();
        rooms.insert(lobby.clone(), Room::new(lobby, lobby_created_at));
        Self {
            rooms,
            memberships: HashMap::new(),
        }
    }

    /// Remove the connection from the room with `code`, deleting the
    /// room when it empties (lobby excepted). Pre-removal member
    /// snapshot goes into the outcome.
    fn leave(&mut self, connection_id: &ConnectionId, code: &RoomCode) -> LeaveOutcome {
        let Some(room) = self.rooms.get_mut(code) else {
            return LeaveOutcome::not_a_member();
        };
        if !room.contains(connection_id) {
            return LeaveOutcome::not_a_member();
        }

        let members_at_leave = room.members.clone();
        room.remove_member(connection_id);
        let removed = self.memberships.remove(connection_id);
        debug_assert!(
            removed.as_ref() == Some(code),
            "membership map out of sync with room members"
        );

        let room_deleted = room.is_empty() && !code.is_general();
        if room_deleted {
            self.rooms.remove(code);
        }

        LeaveOutcome {
            left: true,
            members_at_leave,
            room_deleted,
        }
    }

    fn leave_current(&mut self, connection_id: &ConnectionId) -> Option<(RoomCode, LeaveOutcome)> {
        let code = self.memberships.get(connection_id).cloned()?;
        let outcome = self.leave(connection_id, &code);
        Some((code, outcome))
    }

    fn insert_member(&mut self, member: Member, code: &RoomCode) {
        debug_assert!(
            !self.memberships.contains_key(&member.connection_id),
            "connection still associated with a room"
        );
        self.memberships
            .insert(member.connection_id.clone(), code.clone());
        if let Some(room) = self.rooms.get_mut(code) {
            room.add_member(member);
        }
    }
}

/// インメモリ Room Registry 実装
pub struct InMemoryRoomRegistry {
    table: Mutex<RoomTable>,
}

impl InMemoryRoomRegistry {
    /// Create the registry with the permanent lobby already present.
    pub fn new(lobby_created_at: Timestamp) -> Self {
        Self {
            table: Mutex::new(RoomTable::new(lobby_created_at)),
        }
    }
}

#[async_trait]
impl RoomRegistry for InMemoryRoomRegistry {
    async fn create_room(&self, owner: Member) -> CreateOutcome {
        let mut table = self.table.lock().await;

        let left_room = table.leave_current(&owner.connection_id);

        let code = loop {
            let candidate = RoomCodeFactory::generate();
            if !table.rooms.contains_key(&candidate) {
                break candidate;
            }
            tracing::debug!("Room code collision on '{}', regenerating", candidate);
        };

        let created_at = owner.joined_at;
        table
            .rooms
            .insert(code.clone(), Room::new(code.clone(), created_at));
        table.insert_member(owner, &code);

        CreateOutcome { code, left_room }
    }

    async fn join_room(&self, member: Member, code: &RoomCode) -> Result<JoinOutcome, RoomError> {
        let mut table = self.table.lock().await;

        if !table.rooms.contains_key(code) {
            return Err(RoomError::RoomNotFound(code.as_str().to_string()));
        }

        let left_room = table.leave_current(&member.connection_id);
        table.insert_member(member, code);

        let members = table
            .rooms
            .get(code)
            .map(Room::member_usernames)
            .unwrap_or_default();
        Ok(JoinOutcome { members, left_room })
    }

    async fn leave_room(&self, connection_id: &ConnectionId, code: &RoomCode) -> LeaveOutcome {
        let mut table = self.table.lock().await;
        table.leave(connection_id, code)
    }

    async fn leave_current(
        &self,
        connection_id: &ConnectionId,
    ) -> Option<(RoomCode, LeaveOutcome)> {
        let mut table = self.table.lock().await;
        table.leave_current(connection_id)
    }

    async fn current_room(&self, connection_id: &ConnectionId) -> Option<RoomCode> {
        let table = self.table.lock().await;
        table.memberships.get(connection_id).cloned()
    }

    async fn is_member(
        &self,
        connection_id: &ConnectionId,
        code: &RoomCode,
    ) -> Result<bool, RoomError> {
        let table = self.table.lock().await;
        table
            .rooms
            .get(code)
            .map(|room| room.contains(connection_id))
            .ok_or_else(|| RoomError::RoomNotFound(code.as_str().to_string()))
    }

    async fn list_room_codes(&self) -> Vec<RoomCode> {
        let table = self.table.lock().await;
        table.rooms.keys().cloned().collect()
    }

    async fn rooms_with_members(&self) -> BTreeMap<RoomCode, Vec<Username>> {
        let table = self.table.lock().await;
        table
            .rooms
            .iter()
            .map(|(code, room)| (code.clone(), room.member_usernames()))
            .collect()
    }

    async fn room(&self, code: &RoomCode) -> Result<Room, RoomError> {
        let table = self.table.lock().await;
        table
            .rooms
            .get(code)
            .cloned()
            .ok_or_else(|| RoomError::RoomNotFound(code.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(connection_id: &str, username: &str) -> Member {
        Member::new(
            ConnectionId::new(connection_id.to_string()).unwrap(),
            Username::new(username.to_string()).unwrap(),
            Timestamp::new(1000),
        )
    }

    fn connection(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    fn registry() -> InMemoryRoomRegistry {
        InMemoryRoomRegistry::new(Timestamp::new(0))
    }

    #[tokio::test]
    async fn test_lobby_exists_from_construction() {
        // テスト項目: 構築直後から General ルームが存在する
        // given (前提条件):
        let registry = registry();

        // when (操作):
        let codes = registry.list_room_codes().await;

        // then (期待する結果):
        assert_eq!(codes, vec![RoomCode::general()]);
    }

    #[tokio::test]
    async fn test_create_room_generates_unique_codes() {
        // テスト項目: 作成されるルームのコードが互いに異なる
        // given (前提条件):
        let registry = registry();

        // when (操作):
        let first = registry.create_room(member("conn-1", "alice")).await;
        let second = registry.create_room(member("conn-2", "bob")).await;

        // then (期待する結果):
        assert_ne!(first.code, second.code);
        assert_eq!(registry.list_room_codes().await.len(), 3); // General + 2
    }

    #[tokio::test]
    async fn test_create_room_owner_is_sole_member() {
        // テスト項目: 作成者が唯一のメンバーとして登録される
        // given (前提条件):
        let registry = registry();

        // when (操作):
        let outcome = registry.create_room(member("conn-1", "alice")).await;

        // then (期待する結果):
        let room = registry.room(&outcome.code).await.unwrap();
        assert_eq!(room.member_count(), 1);
        assert_eq!(room.members[0].username.as_str(), "alice");
        assert_eq!(
            registry.current_room(&connection("conn-1")).await,
            Some(outcome.code)
        );
    }

    #[tokio::test]
    async fn test_join_room_not_found() {
        // テスト項目: 存在しないコードへの join が RoomNotFound で失敗し、
        //             既存の所属が変化しない
        // given (前提条件):
        let registry = registry();
        registry
            .join_room(member("conn-1", "alice"), &RoomCode::general())
            .await
            .unwrap();

        // when (操作):
        let missing = RoomCode::new("zzzzzz".to_string()).unwrap();
        let result = registry.join_room(member("conn-1", "alice"), &missing).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(RoomError::RoomNotFound("zzzzzz".to_string()))
        );
        assert_eq!(
            registry.current_room(&connection("conn-1")).await,
            Some(RoomCode::general())
        );
    }

    #[tokio::test]
    async fn test_join_switches_room_atomically() {
        // テスト項目: join が前のルームからの退室を伴い、同時に 2 ルームに
        //             所属しない
        // given (前提条件):
        let registry = registry();
        let created = registry.create_room(member("conn-1", "alice")).await;
        registry
            .join_room(member("conn-2", "bob"), &created.code)
            .await
            .unwrap();

        // when (操作): bob が General へ移動
        let outcome = registry
            .join_room(member("conn-2", "bob"), &RoomCode::general())
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(
            outcome.left_room.as_ref().map(|(code, _)| code),
            Some(&created.code)
        );
        assert_eq!(
            registry.current_room(&connection("conn-2")).await,
            Some(RoomCode::general())
        );
        let room = registry.room(&created.code).await.unwrap();
        assert!(!room.contains(&connection("conn-2")));
        assert_eq!(room.member_count(), 1);
    }

    #[tokio::test]
    async fn test_leave_room_deletes_empty_room() {
        // テスト項目: 最後のメンバーの退室でルームが削除される
        // given (前提条件):
        let registry = registry();
        let created = registry.create_room(member("conn-1", "alice")).await;

        // when (操作):
        let outcome = registry
            .leave_room(&connection("conn-1"), &created.code)
            .await;

        // then (期待する結果):
        assert!(outcome.left);
        assert!(outcome.room_deleted);
        assert_eq!(outcome.members_at_leave.len(), 1);
        assert_eq!(
            registry.room(&created.code).await,
            Err(RoomError::RoomNotFound(created.code.as_str().to_string()))
        );
        // 削除済みコードへの再 join は RoomNotFound
        let rejoin = registry.join_room(member("conn-2", "bob"), &created.code).await;
        assert!(rejoin.is_err());
    }

    #[tokio::test]
    async fn test_general_room_is_never_deleted() {
        // テスト項目: General ルームは空になっても削除されない
        // given (前提条件):
        let registry = registry();
        registry
            .join_room(member("conn-1", "alice"), &RoomCode::general())
            .await
            .unwrap();

        // when (操作):
        let outcome = registry
            .leave_room(&connection("conn-1"), &RoomCode::general())
            .await;

        // then (期待する結果):
        assert!(outcome.left);
        assert!(!outcome.room_deleted);
        let room = registry.room(&RoomCode::general()).await.unwrap();
        assert!(room.is_empty());
    }

    #[tokio::test]
    async fn test_leave_room_is_idempotent() {
        // テスト項目: 非メンバーの退室が何も変更しない（冪等性）
        // given (前提条件):
        let registry = registry();
        registry
            .join_room(member("conn-1", "alice"), &RoomCode::general())
            .await
            .unwrap();

        // when (操作):
        let outcome = registry
            .leave_room(&connection("conn-2"), &RoomCode::general())
            .await;

        // then (期待する結果):
        assert_eq!(outcome, LeaveOutcome::not_a_member());
        let room = registry.room(&RoomCode::general()).await.unwrap();
        assert_eq!(room.member_count(), 1);
    }

    #[tokio::test]
    async fn test_leave_captures_members_before_removal() {
        // テスト項目: 退室時のスナップショットに退室者自身が含まれる
        // given (前提条件):
        let registry = registry();
        let created = registry.create_room(member("conn-1", "alice")).await;
        registry
            .join_room(member("conn-2", "bob"), &created.code)
            .await
            .unwrap();

        // when (操作):
        let outcome = registry
            .leave_room(&connection("conn-2"), &created.code)
            .await;

        // then (期待する結果):
        let names: Vec<&str> = outcome
            .members_at_leave
            .iter()
            .map(|m| m.username.as_str())
            .collect();
        assert!(names.contains(&"alice"));
        assert!(names.contains(&"bob"));
    }

    #[tokio::test]
    async fn test_member_count_matches_live_associations() {
        // テスト項目: 任意の join/leave 列の後、メンバー数と接続→ルーム
        //             対応の件数が一致する（保存則）
        // given (前提条件):
        let registry = registry();
        let created = registry.create_room(member("conn-1", "alice")).await;
        registry
            .join_room(member("conn-2", "bob"), &created.code)
            .await
            .unwrap();
        registry
            .join_room(member("conn-3", "charlie"), &RoomCode::general())
            .await
            .unwrap();
        registry.leave_room(&connection("conn-2"), &created.code).await;

        // when (操作):
        let rooms = registry.rooms_with_members().await;

        // then (期待する結果):
        let total_members: usize = rooms.values().map(Vec::len).sum();
        let mut associated = 0;
        for (code, _) in &rooms {
            for conn in ["conn-1", "conn-2", "conn-3"] {
                if registry.current_room(&connection(conn)).await.as_ref() == Some(code) {
                    associated += 1;
                }
            }
        }
        assert_eq!(total_members, associated);
        assert_eq!(total_members, 2); // alice + charlie
    }

    #[tokio::test]
    async fn test_rooms_with_members_shape() {
        // テスト項目: rooms_with_members がコード→ソート済み名前一覧を返す
        // given (前提条件):
        let registry = registry();
        registry
            .join_room(member("conn-1", "charlie"), &RoomCode::general())
            .await
            .unwrap();
        registry
            .join_room(member("conn-2", "alice"), &RoomCode::general())
            .await
            .unwrap();

        // when (操作):
        let rooms = registry.rooms_with_members().await;

        // then (期待する結果):
        let general = rooms.get(&RoomCode::general()).unwrap();
        let names: Vec<&str> = general.iter().map(|u| u.as_str()).collect();
        assert_eq!(names, vec!["alice", "charlie"]);
    }
}
